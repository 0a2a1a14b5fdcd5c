use super::tac::{OpCode, Tac, TacList};
use crate::arena::{Arena, ArenaStr};

struct TacPrinter<'a> {
    list: &'a TacList,
    arena: &'a Arena,
    result: String,
}

/// One instruction per line, labels flush left and everything else
/// indented by two spaces.
pub fn tac_to_string(list: &TacList, arena: &Arena) -> String {
    let printer = TacPrinter {
        list,
        arena,
        result: String::new(),
    };

    printer.stringify()
}

impl<'a> TacPrinter<'a> {
    fn stringify(mut self) -> String {
        for tac in self.list.iter() {
            self.push_instr(tac);
            self.result.push('\n');
        }

        self.result
    }

    fn push_instr(&mut self, tac: &Tac) {
        if tac.opcode != OpCode::Label {
            self.result.push_str("  ");
        }

        match tac.opcode {
            OpCode::Label => {
                self.push_operand(tac.result);
                self.result.push(':');
            }
            OpCode::Assign => {
                self.push_operand(tac.result);
                self.result.push_str(" = ");
                self.push_operand(tac.arg1);
            }
            OpCode::BinaryOp => {
                self.push_operand(tac.result);
                self.result.push_str(" = ");
                self.push_operand(tac.arg1);
                self.result.push(' ');
                self.push_operand(tac.op);
                self.result.push(' ');
                self.push_operand(tac.arg2);
            }
            OpCode::UnaryOp => {
                self.push_operand(tac.result);
                self.result.push_str(" = ");
                self.push_operand(tac.op);

                // word operators like odd need a separator
                if self.is_word(tac.op) {
                    self.result.push(' ');
                }

                self.push_operand(tac.arg1);
            }
            OpCode::Load => {
                self.push_operand(tac.result);
                self.result.push_str(" = load ");
                self.push_operand(tac.arg1);
            }
            OpCode::Goto => {
                self.result.push_str("goto ");
                self.push_operand(tac.result);
            }
            OpCode::IfFalse => {
                self.result.push_str("ifFalse ");
                self.push_operand(tac.arg1);
                self.result.push_str(" goto ");
                self.push_operand(tac.result);
            }
            OpCode::Call => {
                self.result.push_str("call ");
                self.push_operand(tac.arg1);
            }
            OpCode::Return => self.result.push_str("return"),
        }
    }

    fn push_operand(&mut self, operand: Option<ArenaStr>) {
        match operand {
            Some(operand) => self.result.push_str(self.arena.get_str(operand)),
            None => self.result.push('_'),
        }
    }

    fn is_word(&self, operand: Option<ArenaStr>) -> bool {
        operand
            .map(|op| self.arena.get_str(op).chars().all(char::is_alphabetic))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prints_every_opcode() {
        let mut arena = Arena::new(0);
        let mut s = |text: &str| arena.strdup(text).unwrap();
        let (l0, t0, t1, x, p) = (s("L0"), s("t0"), s("t1"), s("x"), s("p"));
        let (seven, odd, plus) = (s("7"), s("odd"), s("+"));

        let mut list = TacList::new();

        for tac in [
            Tac::label(l0),
            Tac::load(t0, seven),
            Tac::binary(t1, plus, t0, x),
            Tac::unary(t1, odd, x),
            Tac::if_false(t1, l0),
            Tac::assign(x, t1),
            Tac::call(p),
            Tac::goto(l0),
            Tac::new(OpCode::Assign),
            Tac::ret(),
        ] {
            list.push(tac).unwrap();
        }

        let expected = "\
L0:
  t0 = load 7
  t1 = t0 + x
  t1 = odd x
  ifFalse t1 goto L0
  x = t1
  call p
  goto L0
  _ = _
  return
";

        assert_eq!(tac_to_string(&list, &arena), expected);
    }
}
