use plzero::arena::Arena;
use plzero::parser::RecoveryMode;
use plzero::CompilerContext;
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

// Bytes currently allocated by this thread. Only one test lives in this
// binary so nothing else allocates on the test thread meanwhile.
thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

struct Tracking;

unsafe impl GlobalAlloc for Tracking {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = LIVE.try_with(|live| live.set(live.get() + layout.size() as isize));

        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        let _ = LIVE.try_with(|live| live.set(live.get() - layout.size() as isize));

        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: Tracking = Tracking;

fn live() -> isize {
    LIVE.with(|live| live.get())
}

#[test]
fn destroying_releases_every_block() {
    let before = live();
    let mut arena = Arena::new(256);

    for i in 0..200 {
        arena.strdup(&format!("symbol_{}", i)).unwrap();
    }

    arena.alloc(4096).unwrap();

    assert!(arena.block_count() > 1);
    assert!(live() > before);

    arena.destroy();

    assert_eq!(live(), before);

    let mut ctx = CompilerContext::new(RecoveryMode::FailFast).unwrap();

    ctx.compile_source("var x; procedure p; x := x + 1; while (x < 9) do call p.")
        .unwrap();

    assert!(live() > before);

    drop(ctx);

    assert_eq!(live(), before);
}
