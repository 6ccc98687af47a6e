//! Tokens produced by the [`Scanner`](crate::Scanner).

use std::fmt;

/// A source location, with a byte offset relative to the start of the
/// scanner's underlying reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: u32,
    /// Column number, starting at 1.
    pub column: u32,
    /// Byte offset, starting at 0.
    pub offset: u64,
}

impl Position {
    pub(crate) const fn start() -> Position {
        Position {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Default for Position {
    fn default() -> Position {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Why the scanner classified a token as illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IllegalCause {
    /// A character with no meaning in PGN.
    Stray,
    /// A digit-initiated token that matches none of `1/2-1/2`, `1-0`, `0-1`.
    MalformedResult,
    /// A quoted string or brace comment still open at end of input.
    Unterminated,
}

/// The kind of a token, carrying the literal text where one exists.
///
/// The literal of a quoted string excludes the quotes and has escapes
/// resolved; the literal of a comment excludes the braces and is trimmed of
/// spaces; the literal of a move number excludes the trailing dot run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of the input.
    Eof,
    /// A run of spaces, tabs and newlines. Filtered from the public token
    /// stream; used internally to skip.
    Whitespace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// A bare run of `.` characters.
    Dot,
    /// A double-quoted string like `"Kasparov, Garry"`.
    Quote(String),
    /// A word, including the move suffix characters `= + # -`.
    Ident(String),
    /// A number followed by a dot run, like `12.` or `12...`.
    MoveNumber(String),
    /// A number not followed by a dot run.
    Number(String),
    /// A numeric annotation glyph like `?!` or `±`.
    Nag(String),
    /// The text between `{` and `}`, trimmed of spaces.
    Comment(String),
    /// A game result: `*`, `1-0`, `0-1` or `1/2-1/2`.
    Result(String),
    /// Anything the scanner cannot classify.
    Illegal {
        literal: String,
        cause: IllegalCause,
    },
}

impl TokenKind {
    /// The literal text of the token, or `""` for tokens without one.
    pub fn literal(&self) -> &str {
        match self {
            TokenKind::Quote(s)
            | TokenKind::Ident(s)
            | TokenKind::MoveNumber(s)
            | TokenKind::Number(s)
            | TokenKind::Nag(s)
            | TokenKind::Comment(s)
            | TokenKind::Result(s) => s,
            TokenKind::Illegal { literal, .. } => literal,
            _ => "",
        }
    }
}

/// An atom of a PGN file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Location of the first character of the token.
    pub position: Position,
    /// Number of characters consumed, including characters that do not end
    /// up in the literal (quotes, braces, dot runs, escape backslashes).
    pub length: usize,
}

impl Token {
    /// The literal text of the token, or `""` for tokens without one.
    pub fn literal(&self) -> &str {
        self.kind.literal()
    }
}
