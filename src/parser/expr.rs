use super::ast::{NodeId, NodeKind};
use super::token::{Token, TokenKind};
use super::Parser;
use crate::error::{CompileError, CompileResult};
use crate::symbol_table::SymbolKind;

// Expression ->
//  || [ + | - ] Term { ( + | - ) Term }
//
// Term ->
//  || Factor { ( * | / ) Factor }
//
// Factor ->
//  || Ident
//  || Number
//  || ( Expression )
impl<'c> Parser<'c> {
    pub(super) fn expression(&mut self) -> CompileResult<NodeId> {
        self.nested(Self::signed_sum)
    }

    fn signed_sum(&mut self) -> CompileResult<NodeId> {
        let sign = *self.tokens.peek();

        let mut lhs = match sign.kind {
            TokenKind::Plus => {
                self.tokens.next();
                self.term()?
            }
            TokenKind::Minus => {
                self.tokens.next();
                let operand = self.term()?;
                let node = self.ast.create_node_at(NodeKind::UnaryOp, sign.value, sign.pos())?;

                self.ast.add_child(node, operand)?;
                node
            }
            _ => self.term()?,
        };

        loop {
            let op = *self.tokens.peek();

            match op.kind {
                TokenKind::Plus | TokenKind::Minus => {
                    self.tokens.next();
                    let rhs = self.term()?;
                    lhs = self.binop(&op, lhs, rhs)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> CompileResult<NodeId> {
        let mut lhs = self.factor()?;

        loop {
            let op = *self.tokens.peek();

            match op.kind {
                TokenKind::Times | TokenKind::Slash => {
                    self.tokens.next();
                    let rhs = self.factor()?;
                    lhs = self.binop(&op, lhs, rhs)?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn factor(&mut self) -> CompileResult<NodeId> {
        let tok = *self.tokens.peek();

        match tok.kind {
            TokenKind::Ident => {
                self.tokens.next();
                let name = self.lexeme(&tok);

                let symbol = match self.lookup(name) {
                    Some((_, SymbolKind::Procedure)) => {
                        return Err(CompileError::semantic(
                            format!("procedure '{}' can not be used as a value", name),
                            Some(tok.pos()),
                        ))
                    }
                    Some((symbol, _)) => symbol,
                    None => {
                        return Err(CompileError::semantic(
                            format!("undefined identifier '{}'", name),
                            Some(tok.pos()),
                        ))
                    }
                };

                let node = self.ast.create_node_at(NodeKind::Identifier, tok.value, tok.pos())?;

                self.ast.set_symbol(node, symbol)?;

                Ok(node)
            }
            TokenKind::Number => {
                self.tokens.next();
                self.number_value(&tok)?;

                self.ast.create_node_at(NodeKind::Number, tok.value, tok.pos())
            }
            TokenKind::LeftParen => {
                self.tokens.next();
                let inner = self.expression()?;

                self.expect(TokenKind::RightParen)?;

                Ok(inner)
            }
            _ => Err(self.unexpected(&tok, "an identifier, number or '('")),
        }
    }

    fn binop(&mut self, op: &Token, lhs: NodeId, rhs: NodeId) -> CompileResult<NodeId> {
        let node = self.ast.create_node_at(NodeKind::BinaryOp, op.value, op.pos())?;

        self.ast.add_child(node, lhs)?;
        self.ast.add_child(node, rhs)?;

        Ok(node)
    }
}
