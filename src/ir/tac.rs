use crate::arena::ArenaStr;
use crate::error::{CompileError, CompileResult};

pub type InstrId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum OpCode {
    Label,
    Assign,
    BinaryOp,
    UnaryOp,
    Load,
    Goto,
    IfFalse,
    Call,
    Return,
}

impl OpCode {
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Label => "LABEL",
            OpCode::Assign => "ASSIGN",
            OpCode::BinaryOp => "BINARY_OP",
            OpCode::UnaryOp => "UNARY_OP",
            OpCode::Load => "LOAD",
            OpCode::Goto => "GOTO",
            OpCode::IfFalse => "IF_FALSE",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
        }
    }
}

// Operand layout per opcode:
//
// LABEL     result = label
// ASSIGN    result = arg1
// BINARY_OP result = arg1 op arg2
// UNARY_OP  result = op arg1
// LOAD      result = literal arg1
// GOTO      result (target label)
// IF_FALSE  arg1 (condition), result (target label)
// CALL      arg1 (procedure)
// RETURN    -
#[derive(Clone, Debug, PartialEq)]
pub struct Tac {
    pub opcode: OpCode,
    pub op: Option<ArenaStr>,
    pub arg1: Option<ArenaStr>,
    pub arg2: Option<ArenaStr>,
    pub result: Option<ArenaStr>,
    next: Option<InstrId>,
}

impl Tac {
    pub fn new(opcode: OpCode) -> Self {
        Self {
            opcode,
            op: None,
            arg1: None,
            arg2: None,
            result: None,
            next: None,
        }
    }

    pub fn label(label: ArenaStr) -> Self {
        Self::new(OpCode::Label).with_result(label)
    }

    pub fn assign(dest: ArenaStr, src: ArenaStr) -> Self {
        Self::new(OpCode::Assign).with_result(dest).with_args(Some(src), None)
    }

    pub fn binary(dest: ArenaStr, op: ArenaStr, lhs: ArenaStr, rhs: ArenaStr) -> Self {
        Self {
            op: Some(op),
            ..Self::new(OpCode::BinaryOp)
        }
        .with_result(dest)
        .with_args(Some(lhs), Some(rhs))
    }

    pub fn unary(dest: ArenaStr, op: ArenaStr, src: ArenaStr) -> Self {
        Self {
            op: Some(op),
            ..Self::new(OpCode::UnaryOp)
        }
        .with_result(dest)
        .with_args(Some(src), None)
    }

    pub fn load(dest: ArenaStr, literal: ArenaStr) -> Self {
        Self::new(OpCode::Load).with_result(dest).with_args(Some(literal), None)
    }

    pub fn goto(label: ArenaStr) -> Self {
        Self::new(OpCode::Goto).with_result(label)
    }

    pub fn if_false(cond: ArenaStr, label: ArenaStr) -> Self {
        Self::new(OpCode::IfFalse).with_result(label).with_args(Some(cond), None)
    }

    pub fn call(procedure: ArenaStr) -> Self {
        Self::new(OpCode::Call).with_args(Some(procedure), None)
    }

    pub fn ret() -> Self {
        Self::new(OpCode::Return)
    }

    pub fn next(&self) -> Option<InstrId> {
        self.next
    }

    fn with_result(mut self, result: ArenaStr) -> Self {
        self.result = Some(result);
        self
    }

    fn with_args(mut self, arg1: Option<ArenaStr>, arg2: Option<ArenaStr>) -> Self {
        self.arg1 = arg1;
        self.arg2 = arg2;
        self
    }
}

/// Append-only list of instructions, linked through `next` in emission
/// order.
#[derive(Debug, Default)]
pub struct TacList {
    instrs: Vec<Tac>,
    head: Option<InstrId>,
    tail: Option<InstrId>,
}

impl TacList {
    pub fn new() -> Self {
        Self {
            instrs: vec![],
            head: None,
            tail: None,
        }
    }

    pub fn push(&mut self, mut tac: Tac) -> CompileResult<InstrId> {
        self.instrs
            .try_reserve(1)
            .map_err(|_| CompileError::memory("failed to allocate a TAC instruction"))?;

        let id = self.instrs.len();

        tac.next = None;
        self.instrs.push(tac);

        match self.tail {
            Some(tail) => self.instrs[tail].next = Some(id),
            None => self.head = Some(id),
        }

        self.tail = Some(id);

        Ok(id)
    }

    pub fn head(&self) -> Option<InstrId> {
        self.head
    }

    pub fn tail(&self) -> Option<InstrId> {
        self.tail
    }

    pub fn get(&self, id: InstrId) -> Option<&Tac> {
        self.instrs.get(id)
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn iter(&self) -> TacIter<'_> {
        TacIter {
            list: self,
            next: self.head,
        }
    }
}

pub struct TacIter<'a> {
    list: &'a TacList,
    next: Option<InstrId>,
}

impl<'a> Iterator for TacIter<'a> {
    type Item = &'a Tac;

    fn next(&mut self) -> Option<Self::Item> {
        let tac = self.list.get(self.next?)?;

        self.next = tac.next;

        Some(tac)
    }
}
