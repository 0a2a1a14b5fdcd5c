use super::token::{Token, TokenKind};
use crate::arena::Arena;
use crate::error::{CompileError, CompileResult};

pub const DEFAULT_CAPACITY: usize = 256;

static EOF_TOKEN: Token = Token {
    kind: TokenKind::Eof,
    value: None,
    line: 0,
    col: 0,
};

/// Tokens produced by a lexer, consumed front to back by the parser.
///
/// Reading at or past the end never fails, it yields an EOF token instead so
/// every call site can simply test the token kind.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStream {
    pub fn new() -> Self {
        Self {
            tokens: Vec::with_capacity(DEFAULT_CAPACITY),
            pos: 0,
        }
    }

    pub fn add(
        &mut self,
        arena: &mut Arena,
        kind: TokenKind,
        value: Option<&str>,
        line: u32,
        col: u32,
    ) -> CompileResult<()> {
        if self.tokens.len() == self.tokens.capacity() {
            let additional = self.tokens.capacity().max(DEFAULT_CAPACITY);

            self.tokens
                .try_reserve_exact(additional)
                .map_err(|_| CompileError::memory("failed to grow the token stream"))?;
        }

        let value = match value {
            Some(text) => Some(arena.strdup(text)?),
            None => None,
        };

        self.tokens.push(Token {
            kind,
            value,
            line,
            col,
        });

        Ok(())
    }

    pub fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&EOF_TOKEN)
    }

    pub fn next(&mut self) -> &Token {
        if self.pos < self.tokens.len() {
            self.pos += 1;
            &self.tokens[self.pos - 1]
        } else {
            &EOF_TOKEN
        }
    }

    pub fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.next();
            true
        } else {
            false
        }
    }

    pub fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tokens.capacity()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_of(arena: &mut Arena, kinds: &[TokenKind]) -> TokenStream {
        let mut stream = TokenStream::new();

        for (i, kind) in kinds.iter().enumerate() {
            stream.add(arena, *kind, None, 1, i as u32 + 1).unwrap();
        }

        stream
    }

    #[test]
    fn starts_empty_with_default_capacity() {
        let stream = TokenStream::new();

        assert!(stream.is_empty());
        assert!(stream.capacity() >= DEFAULT_CAPACITY);
        assert!(stream.is_eof());
    }

    #[test]
    fn values_are_copied_into_the_arena() {
        let mut arena = Arena::new(0);
        let mut stream = TokenStream::new();
        let lexeme = String::from("count");

        stream.add(&mut arena, TokenKind::Ident, Some(&lexeme), 2, 5).unwrap();
        drop(lexeme);

        let token = stream.peek();

        assert_eq!(arena.get_str(token.value.unwrap()), "count");
        assert_eq!((token.line, token.col), (2, 5));
    }

    #[test]
    fn grows_past_the_initial_capacity() {
        let mut arena = Arena::new(0);
        let mut stream = TokenStream::new();

        for i in 0..1000 {
            stream.add(&mut arena, TokenKind::Number, Some("1"), 1, i).unwrap();
        }

        assert_eq!(stream.len(), 1000);
        assert!(stream.capacity() >= 1000);
    }

    #[test]
    fn next_past_the_end_keeps_returning_eof() {
        let mut arena = Arena::new(0);
        let mut stream = stream_of(&mut arena, &[TokenKind::Ident, TokenKind::Period]);

        assert_eq!(stream.next().kind, TokenKind::Ident);
        assert_eq!(stream.next().kind, TokenKind::Period);

        for _ in 0..5 {
            assert_eq!(*stream.next(), EOF_TOKEN);
            assert!(stream.is_eof());
        }

        assert_eq!(stream.pos(), stream.len());
    }

    #[test]
    fn match_only_advances_on_the_expected_kind() {
        let mut arena = Arena::new(0);
        let mut stream = stream_of(&mut arena, &[TokenKind::Begin, TokenKind::End]);

        assert!(!stream.match_token(TokenKind::End));
        assert_eq!(stream.pos(), 0);
        assert!(stream.match_token(TokenKind::Begin));
        assert!(stream.match_token(TokenKind::End));
        assert!(!stream.match_token(TokenKind::End));
        assert!(stream.is_eof());
    }
}
