use super::token::TokenKind;
use super::token_stream::TokenStream;
use crate::arena::Arena;
use crate::error::{CompileError, CompileResult, Pos};
use core::iter::Peekable;
use core::str::Chars;

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    input: &'a str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lexes the whole input into `stream`. The stream does not get an
    /// explicit EOF token, running off its end already yields one.
    pub fn tokenize(&mut self, arena: &mut Arena, stream: &mut TokenStream) -> CompileResult<()> {
        loop {
            self.skip_ignored_input()?;

            let start = self.pos;
            let start_pos = Pos::new(self.line, self.col);

            let kind = match self.chars.peek() {
                None => return Ok(()),
                Some(c) if c.is_ascii_alphabetic() || *c == '_' => self.lex_word(start),
                Some(c) if c.is_ascii_digit() => self.lex_num(),
                Some(_) => self.lex_symbolic(start_pos)?,
            };

            let text = &self.input[start..self.pos];

            stream.add(arena, kind, Some(text), start_pos.line, start_pos.col)?;
        }
    }

    fn lex_word(&mut self, start: usize) -> TokenKind {
        while let Some(c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || *c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::keyword(&self.input[start..self.pos]).unwrap_or(TokenKind::Ident)
    }

    fn lex_num(&mut self) -> TokenKind {
        while let Some(c) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::Number
    }

    fn lex_symbolic(&mut self, start_pos: Pos) -> CompileResult<TokenKind> {
        let c = self.advance().unwrap_or('\0');

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '=' => TokenKind::Eq,
            '#' => TokenKind::Hash,
            ',' => TokenKind::Comma,
            ';' => TokenKind::SemiColon,
            '.' => TokenKind::Period,
            '<' => self.lex_with_eq(TokenKind::Lt, TokenKind::Leq),
            '>' => self.lex_with_eq(TokenKind::Gt, TokenKind::Geq),
            ':' => {
                if self.chars.peek() == Some(&'=') {
                    self.advance();
                    TokenKind::Becomes
                } else {
                    return Err(CompileError::syntax("expected '=' after ':'", start_pos));
                }
            }
            other => {
                return Err(CompileError::syntax(
                    format!("unexpected character '{}'", other),
                    start_pos,
                ))
            }
        };

        Ok(kind)
    }

    fn lex_with_eq(&mut self, single: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.chars.peek() == Some(&'=') {
            self.advance();
            with_eq
        } else {
            single
        }
    }

    fn skip_ignored_input(&mut self) -> CompileResult<()> {
        loop {
            if !self.lex_whitespace() && !self.lex_comment()? {
                return Ok(());
            }
        }
    }

    fn lex_whitespace(&mut self) -> bool {
        match self.chars.peek() {
            Some(c) if c.is_whitespace() => {
                self.advance();
                true
            }
            _ => false,
        }
    }

    // { ... } comments, not nested
    fn lex_comment(&mut self) -> CompileResult<bool> {
        if self.chars.peek() != Some(&'{') {
            return Ok(false);
        }

        let start_pos = Pos::new(self.line, self.col);

        self.advance();

        loop {
            match self.advance() {
                Some('}') => return Ok(true),
                Some(_) => {}
                None => return Err(CompileError::syntax("unclosed comment", start_pos)),
            }
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;

        self.pos += c.len_utf8();

        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }

        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn lex(input: &str) -> (Arena, TokenStream) {
        let mut arena = Arena::new(0);
        let mut stream = TokenStream::new();

        Lexer::new(input).tokenize(&mut arena, &mut stream).unwrap();

        (arena, stream)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        let (_, stream) = lex(input);

        stream.tokens().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lex_assignment() {
        assert_eq!(
            kinds("x := 1 + 2 * 3."),
            vec![
                TokenKind::Ident,
                TokenKind::Becomes,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Times,
                TokenKind::Number,
                TokenKind::Period,
            ]
        );
    }

    #[test]
    fn lex_keywords_and_idents() {
        assert_eq!(
            kinds("procedure odd_one; begin call odd_one end"),
            vec![
                TokenKind::Procedure,
                TokenKind::Ident,
                TokenKind::SemiColon,
                TokenKind::Begin,
                TokenKind::Call,
                TokenKind::Ident,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn lex_relational_operators() {
        assert_eq!(
            kinds("< <= > >= = #"),
            vec![
                TokenKind::Lt,
                TokenKind::Leq,
                TokenKind::Gt,
                TokenKind::Geq,
                TokenKind::Eq,
                TokenKind::Hash,
            ]
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let (arena, stream) = lex("var x;\n  x := 10.");
        let tokens = stream.tokens();
        let ten = tokens[5];

        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[3].line, tokens[3].col), (2, 3));
        assert_eq!(arena.get_str(ten.value.unwrap()), "10");
        assert_eq!((ten.line, ten.col), (2, 8));
    }

    #[test]
    fn skips_comments() {
        assert_eq!(
            kinds("{ a comment } x { another\n one } ."),
            vec![TokenKind::Ident, TokenKind::Period]
        );
    }

    #[test]
    fn unclosed_comment() {
        let mut arena = Arena::new(0);
        let mut stream = TokenStream::new();
        let err = Lexer::new("x { never closed")
            .tokenize(&mut arena, &mut stream)
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.pos, Some(Pos::new(1, 3)));
    }

    #[test]
    fn unexpected_character() {
        let mut arena = Arena::new(0);
        let mut stream = TokenStream::new();
        let err = Lexer::new("x := 1 $ 2")
            .tokenize(&mut arena, &mut stream)
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.pos, Some(Pos::new(1, 8)));
    }

    #[test]
    fn lone_colon_is_an_error() {
        let mut arena = Arena::new(0);
        let mut stream = TokenStream::new();

        assert!(Lexer::new("x : 1").tokenize(&mut arena, &mut stream).is_err());
    }
}
