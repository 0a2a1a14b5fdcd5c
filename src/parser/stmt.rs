use super::ast::{NodeId, NodeKind};
use super::token::TokenKind;
use super::Parser;
use crate::error::{CompileError, CompileResult};
use crate::symbol_table::SymbolKind;

// Statement ->
//  || Ident := Expression
//  || call Ident
//  || begin Statement { ; Statement } [ ; ] end
//  || if Condition then Statement
//  || while Condition do Statement
//
// Condition ->
//  || odd Expression
//  || ( Expression RelOp Expression )
//
// The parentheses around a relational condition are mandatory.
impl<'c> Parser<'c> {
    pub(super) fn statement(&mut self) -> CompileResult<NodeId> {
        self.nested(|parser| match parser.tokens.peek().kind {
            TokenKind::Ident => parser.assignment(),
            TokenKind::Call => parser.call(),
            TokenKind::Begin => parser.compound(),
            TokenKind::If => parser.if_stmt(),
            TokenKind::While => parser.while_stmt(),
            _ => {
                let tok = *parser.tokens.peek();

                Err(parser.unexpected(&tok, "a statement"))
            }
        })
    }

    fn assignment(&mut self) -> CompileResult<NodeId> {
        let ident = self.expect(TokenKind::Ident)?;
        let name = self.lexeme(&ident);

        let (symbol, kind) = self.lookup(name).ok_or_else(|| {
            CompileError::semantic(format!("undefined identifier '{}'", name), Some(ident.pos()))
        })?;

        if kind != SymbolKind::Var {
            return Err(CompileError::semantic(
                format!(
                    "can not assign to {} '{}'",
                    kind.name().to_lowercase(),
                    name
                ),
                Some(ident.pos()),
            ));
        }

        self.expect(TokenKind::Becomes)?;

        let src = self.expression()?;
        let node = self.ast.create_node_at(NodeKind::Assignment, ident.value, ident.pos())?;

        self.ast.set_symbol(node, symbol)?;
        self.ast.add_child(node, src)?;

        Ok(node)
    }

    fn call(&mut self) -> CompileResult<NodeId> {
        self.expect(TokenKind::Call)?;

        let ident = self.expect(TokenKind::Ident)?;
        let name = self.lexeme(&ident);

        let symbol = match self.lookup(name) {
            Some((symbol, SymbolKind::Procedure)) => symbol,
            Some(_) => {
                return Err(CompileError::semantic(
                    format!("'{}' is not a procedure", name),
                    Some(ident.pos()),
                ))
            }
            None => {
                return Err(CompileError::semantic(
                    format!("undefined procedure '{}'", name),
                    Some(ident.pos()),
                ))
            }
        };

        let node = self.ast.create_node_at(NodeKind::Call, ident.value, ident.pos())?;

        self.ast.set_symbol(node, symbol)?;

        Ok(node)
    }

    // begin ... end is kept as an unnamed BLOCK node
    fn compound(&mut self) -> CompileResult<NodeId> {
        let begin = self.expect(TokenKind::Begin)?;
        let node = self.ast.create_node_at(NodeKind::Block, None, begin.pos())?;

        if let Some(stmt) = self.recoverable_statement()? {
            self.ast.add_child(node, stmt)?;
        }

        while self.tokens.match_token(TokenKind::SemiColon) {
            if self.tokens.peek().kind == TokenKind::End {
                break;
            }

            if let Some(stmt) = self.recoverable_statement()? {
                self.ast.add_child(node, stmt)?;
            }
        }

        self.expect(TokenKind::End)?;

        Ok(node)
    }

    fn if_stmt(&mut self) -> CompileResult<NodeId> {
        let tok = self.expect(TokenKind::If)?;
        let cond = self.condition()?;

        self.expect(TokenKind::Then)?;

        let body = self.statement()?;
        let node = self.ast.create_node_at(NodeKind::If, None, tok.pos())?;

        self.ast.add_child(node, cond)?;
        self.ast.add_child(node, body)?;

        Ok(node)
    }

    fn while_stmt(&mut self) -> CompileResult<NodeId> {
        let tok = self.expect(TokenKind::While)?;
        let cond = self.condition()?;

        self.expect(TokenKind::Do)?;

        let body = self.statement()?;
        let node = self.ast.create_node_at(NodeKind::While, None, tok.pos())?;

        self.ast.add_child(node, cond)?;
        self.ast.add_child(node, body)?;

        Ok(node)
    }

    pub(super) fn condition(&mut self) -> CompileResult<NodeId> {
        let tok = *self.tokens.peek();

        if self.tokens.match_token(TokenKind::Odd) {
            let operand = self.expression()?;
            let node = self.ast.create_node_at(NodeKind::Condition, tok.value, tok.pos())?;

            self.ast.add_child(node, operand)?;

            return Ok(node);
        }

        if tok.kind != TokenKind::LeftParen {
            return Err(self.unexpected(&tok, "'odd' or '(' to start a condition"));
        }

        self.tokens.next();

        let lhs = self.expression()?;
        let op = *self.tokens.peek();

        if !op.kind.is_relop() {
            return Err(self.unexpected(&op, "a relational operator"));
        }

        self.tokens.next();

        let rhs = self.expression()?;

        self.expect(TokenKind::RightParen)?;

        let node = self.ast.create_node_at(NodeKind::Condition, op.value, op.pos())?;

        self.ast.add_child(node, lhs)?;
        self.ast.add_child(node, rhs)?;

        Ok(node)
    }
}
