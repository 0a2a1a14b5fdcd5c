use crate::arena::{Arena, ArenaStr};
use crate::error::{CompileError, CompileResult, Pos};
use serde::Serialize;
use std::fmt::Write;

pub type SymbolId = usize;
pub type ScopeId = usize;

pub const GLOBAL_SCOPE_ID: ScopeId = 0;
pub const GLOBAL_SCOPE_NAME: &str = "global";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolKind {
    Const,
    Var,
    Procedure,
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Const => "CONST",
            SymbolKind::Var => "VAR",
            SymbolKind::Procedure => "PROCEDURE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: ArenaStr,
    pub kind: SymbolKind,
    pub level: usize,
    pub value: Option<i64>,
    pub scope: ScopeId,
    // the symbol declared before this one in the same scope
    next: Option<SymbolId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub id: ScopeId,
    pub name: ArenaStr,
    pub parent: Option<ScopeId>,
    pub level: usize,
    head: Option<SymbolId>,
}

/// Scopes form a tree rooted at the global scope, with one of them being the
/// current scope. Leaving a scope only moves the cursor back to its parent,
/// the scope and its symbols stay around for later inspection.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    current: ScopeId,
}

impl SymbolTable {
    pub fn new(arena: &mut Arena) -> CompileResult<Self> {
        let name = arena.strdup(GLOBAL_SCOPE_NAME)?;

        Ok(Self {
            scopes: vec![Scope {
                id: GLOBAL_SCOPE_ID,
                name,
                parent: None,
                level: 0,
                head: None,
            }],
            symbols: vec![],
            current: GLOBAL_SCOPE_ID,
        })
    }

    pub fn enter_scope(&mut self, name: ArenaStr) -> CompileResult<ScopeId> {
        self.scopes
            .try_reserve(1)
            .map_err(|_| CompileError::memory("failed to allocate a scope"))?;

        let id = self.scopes.len();
        let level = self.scopes[self.current].level + 1;

        self.scopes.push(Scope {
            id,
            name,
            parent: Some(self.current),
            level,
            head: None,
        });
        self.current = id;

        Ok(id)
    }

    /// No-op in the global scope.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    pub fn add(
        &mut self,
        arena: &Arena,
        name: ArenaStr,
        kind: SymbolKind,
        level: usize,
        value: Option<i64>,
    ) -> CompileResult<SymbolId> {
        let text = arena.get_str(name);

        if self.lookup_local(arena, text).is_some() {
            return Err(CompileError::semantic(
                format!("'{}' already defined in current scope", text),
                None,
            ));
        }

        self.symbols
            .try_reserve(1)
            .map_err(|_| CompileError::memory("failed to allocate a symbol"))?;

        let id = self.symbols.len();
        let scope = &mut self.scopes[self.current];

        self.symbols.push(Symbol {
            id,
            name,
            kind,
            level,
            value,
            scope: scope.id,
            next: scope.head,
        });
        scope.head = Some(id);

        Ok(id)
    }

    /// Innermost declaration of `name` visible from the current scope.
    pub fn lookup(&self, arena: &Arena, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self.current);

        while let Some(id) = scope {
            if let Some(symbol) = self.find_in_scope(arena, id, name) {
                return Some(symbol);
            }

            scope = self.scopes[id].parent;
        }

        None
    }

    pub fn lookup_local(&self, arena: &Arena, name: &str) -> Option<&Symbol> {
        self.find_in_scope(arena, self.current, name)
    }

    /// Like `lookup`, failing with an undefined symbol error.
    pub fn resolve(&self, arena: &Arena, name: &str, pos: Option<Pos>) -> CompileResult<&Symbol> {
        self.lookup(arena, name)
            .ok_or_else(|| CompileError::undefined_symbol(name, pos))
    }

    pub fn current_scope(&self) -> &Scope {
        &self.scopes[self.current]
    }

    pub fn current_level(&self) -> usize {
        self.scopes[self.current].level
    }

    pub fn global_scope(&self) -> &Scope {
        &self.scopes[GLOBAL_SCOPE_ID]
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id)
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Symbols of one scope, most recently declared first.
    pub fn scope_symbols(&self, scope: ScopeId) -> ScopeSymbols<'_> {
        ScopeSymbols {
            table: self,
            next: self.scopes.get(scope).and_then(|s| s.head),
        }
    }

    pub fn child_scopes(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> + '_ {
        self.scopes.iter().filter(move |s| s.parent == Some(scope))
    }

    fn find_in_scope(&self, arena: &Arena, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scope_symbols(scope)
            .find(|symbol| arena.get_str(symbol.name) == name)
    }
}

pub struct ScopeSymbols<'a> {
    table: &'a SymbolTable,
    next: Option<SymbolId>,
}

impl<'a> Iterator for ScopeSymbols<'a> {
    type Item = &'a Symbol;

    fn next(&mut self) -> Option<Self::Item> {
        let symbol = self.table.symbols.get(self.next?)?;

        self.next = symbol.next;

        Some(symbol)
    }
}

/// One section per scope in pre-order, symbols listed in declaration order.
pub fn symbol_table_to_string(table: &SymbolTable, arena: &Arena) -> String {
    let mut result = String::new();

    push_scope(table, arena, GLOBAL_SCOPE_ID, &mut result);

    result
}

fn push_scope(table: &SymbolTable, arena: &Arena, scope: ScopeId, result: &mut String) {
    let Some(s) = table.scope(scope) else {
        return;
    };

    let indent = "  ".repeat(s.level);
    let parent = s
        .parent
        .and_then(|p| table.scope(p))
        .map(|p| arena.get_str(p.name))
        .unwrap_or("-");

    let _ = writeln!(
        result,
        "{}scope {} (level {}, parent {})",
        indent,
        arena.get_str(s.name),
        s.level,
        parent
    );

    let mut symbols: Vec<&Symbol> = table.scope_symbols(scope).collect();
    symbols.reverse();

    for symbol in symbols {
        let _ = write!(
            result,
            "{}  {:>3} {:<12} {:<10} {}",
            indent,
            symbol.id,
            arena.get_str(symbol.name),
            symbol.kind.name(),
            symbol.level
        );

        if let Some(value) = symbol.value {
            let _ = write!(result, " = {}", value);
        }

        result.push('\n');
    }

    let children: Vec<ScopeId> = table.child_scopes(scope).map(|c| c.id).collect();

    for child in children {
        push_scope(table, arena, child, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Fixture {
        arena: Arena,
        table: SymbolTable,
    }

    impl Fixture {
        fn new() -> Self {
            let mut arena = Arena::new(0);
            let table = SymbolTable::new(&mut arena).unwrap();

            Self { arena, table }
        }

        fn add(&mut self, name: &str, kind: SymbolKind) -> CompileResult<SymbolId> {
            let name = self.arena.strdup(name).unwrap();
            let level = self.table.current_level();

            self.table.add(&self.arena, name, kind, level, None)
        }

        fn enter(&mut self, name: &str) {
            let name = self.arena.strdup(name).unwrap();

            self.table.enter_scope(name).unwrap();
        }

        fn lookup(&self, name: &str) -> Option<SymbolId> {
            self.table.lookup(&self.arena, name).map(|s| s.id)
        }

        fn lookup_local(&self, name: &str) -> Option<SymbolId> {
            self.table.lookup_local(&self.arena, name).map(|s| s.id)
        }
    }

    #[test]
    fn starts_in_the_global_scope() {
        let f = Fixture::new();

        assert_eq!(f.table.current_scope().id, GLOBAL_SCOPE_ID);
        assert_eq!(f.arena.get_str(f.table.global_scope().name), "global");
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let mut f = Fixture::new();

        f.add("x", SymbolKind::Var).unwrap();
        let err = f.add("x", SymbolKind::Var).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Semantic);
        assert!(err.message.contains("already defined in current scope"));
    }

    #[test]
    fn shadowing_in_child_scope() {
        let mut f = Fixture::new();
        let outer = f.add("x", SymbolKind::Var).unwrap();

        f.enter("p");
        let inner = f.add("x", SymbolKind::Var).unwrap();

        assert_ne!(outer, inner);
        assert_eq!(f.lookup("x"), Some(inner));

        f.table.exit_scope();

        assert_eq!(f.lookup("x"), Some(outer));
    }

    #[test]
    fn lookup_walks_to_the_global_scope() {
        let mut f = Fixture::new();
        let g = f.add("g", SymbolKind::Var).unwrap();

        f.enter("p");
        f.enter("q");

        assert_eq!(f.lookup("g"), Some(g));
        assert_eq!(f.lookup_local("g"), None);
        assert_eq!(f.lookup("missing"), None);
    }

    #[test]
    fn ids_are_unique_across_scopes() {
        let mut f = Fixture::new();
        let a = f.add("a", SymbolKind::Var).unwrap();

        f.enter("p");
        let b = f.add("b", SymbolKind::Const).unwrap();
        f.table.exit_scope();
        let c = f.add("c", SymbolKind::Procedure).unwrap();

        assert_eq!(vec![a, b, c], vec![0, 1, 2]);
    }

    #[test]
    fn global_scope_is_never_exited() {
        let mut f = Fixture::new();

        f.table.exit_scope();
        f.table.exit_scope();

        assert_eq!(f.table.current_scope().id, GLOBAL_SCOPE_ID);
    }

    #[test]
    fn exited_scopes_stay_reachable() {
        let mut f = Fixture::new();

        f.enter("p");
        f.add("local", SymbolKind::Var).unwrap();
        f.table.exit_scope();

        let p = f.table.child_scopes(GLOBAL_SCOPE_ID).next().unwrap();
        let names: Vec<&str> = f
            .table
            .scope_symbols(p.id)
            .map(|s| f.arena.get_str(s.name))
            .collect();

        assert_eq!(f.arena.get_str(p.name), "p");
        assert_eq!(names, vec!["local"]);
    }

    #[test]
    fn scope_symbols_are_most_recent_first() {
        let mut f = Fixture::new();

        for name in ["a", "b", "c"] {
            f.add(name, SymbolKind::Var).unwrap();
        }

        let names: Vec<&str> = f
            .table
            .scope_symbols(GLOBAL_SCOPE_ID)
            .map(|s| f.arena.get_str(s.name))
            .collect();

        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn resolve_reports_undefined_symbols() {
        let f = Fixture::new();
        let err = f.table.resolve(&f.arena, "nope", None).unwrap_err();

        assert_eq!(err.kind, ErrorKind::UndefinedSymbol);
    }
}
