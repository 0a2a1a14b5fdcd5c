use crate::arena::ArenaStr;
use crate::error::Pos;
use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Ident,
    Number,

    // keywords
    Const,
    Var,
    Procedure,
    Call,
    Begin,
    End,
    If,
    Then,
    While,
    Do,
    Odd,

    Plus,
    Minus,
    Times,
    Slash,
    Eq,
    Hash,
    Lt,
    Leq,
    Gt,
    Geq,
    LeftParen,
    RightParen,
    Comma,
    SemiColon,
    Period,
    Becomes,

    Eof,
}

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "const" => Some(TokenKind::Const),
            "var" => Some(TokenKind::Var),
            "procedure" => Some(TokenKind::Procedure),
            "call" => Some(TokenKind::Call),
            "begin" => Some(TokenKind::Begin),
            "end" => Some(TokenKind::End),
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "while" => Some(TokenKind::While),
            "do" => Some(TokenKind::Do),
            "odd" => Some(TokenKind::Odd),
            _ => None,
        }
    }

    pub fn is_relop(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::Hash
                | TokenKind::Lt
                | TokenKind::Leq
                | TokenKind::Gt
                | TokenKind::Geq
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Ident => "IDENT",
            TokenKind::Number => "NUMBER",
            TokenKind::Const => "CONST",
            TokenKind::Var => "VAR",
            TokenKind::Procedure => "PROCEDURE",
            TokenKind::Call => "CALL",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::While => "WHILE",
            TokenKind::Do => "DO",
            TokenKind::Odd => "ODD",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Slash => "SLASH",
            TokenKind::Eq => "EQ",
            TokenKind::Hash => "HASH",
            TokenKind::Lt => "LT",
            TokenKind::Leq => "LEQ",
            TokenKind::Gt => "GT",
            TokenKind::Geq => "GEQ",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::Comma => "COMMA",
            TokenKind::SemiColon => "SEMICOLON",
            TokenKind::Period => "PERIOD",
            TokenKind::Becomes => "BECOMES",
            TokenKind::Eof => "EOF",
        }
    }

    /// How the token is written in source, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::Const => "'const'",
            TokenKind::Var => "'var'",
            TokenKind::Procedure => "'procedure'",
            TokenKind::Call => "'call'",
            TokenKind::Begin => "'begin'",
            TokenKind::End => "'end'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Odd => "'odd'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Times => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::Hash => "'#'",
            TokenKind::Lt => "'<'",
            TokenKind::Leq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Geq => "'>='",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::SemiColon => "';'",
            TokenKind::Period => "'.'",
            TokenKind::Becomes => "':='",
            TokenKind::Eof => "end of file",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<ArenaStr>,
    pub line: u32,
    pub col: u32,
}

impl Token {
    pub fn pos(&self) -> Pos {
        Pos::new(self.line, self.col)
    }
}
