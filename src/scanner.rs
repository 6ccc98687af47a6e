//! Lexical scanner turning raw bytes into [`Token`]s.

use std::io::{self, Read};

use crate::{
    buffer::Buffer,
    token::{IllegalCause, Position, Token, TokenKind},
};

/// A streaming PGN scanner.
///
/// The scanner owns its cursor and cannot be shared; concurrent callers each
/// construct their own scanner over an independent view of the input. For
/// most applications the [`Parser`](crate::Parser) is the better entry
/// point.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    buffer: Buffer,
    pos: Position,
}

impl<R: Read> Scanner<R> {
    /// Binds a scanner to a byte-oriented input source, with position
    /// tracking reset to line 1.
    pub fn new(reader: R) -> Scanner<R> {
        Scanner {
            reader,
            buffer: Buffer::new(),
            pos: Position::start(),
        }
    }

    /// The position of the next unconsumed character.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Returns the next non-whitespace character without consuming it.
    /// Whitespace in front of it is consumed. `None` means end of input.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        loop {
            match self.peek_char()? {
                Some(ch) if is_whitespace(ch) => {
                    self.next_char()?;
                }
                other => return Ok(other),
            }
        }
    }

    /// Returns and consumes the next token, filtering whitespace from the
    /// stream.
    pub fn next_token(&mut self) -> io::Result<Token> {
        loop {
            let tok = self.scan_token()?;
            if tok.kind != TokenKind::Whitespace {
                return Ok(tok);
            }
        }
    }

    fn scan_token(&mut self) -> io::Result<Token> {
        let start = self.pos;

        let Some(ch) = self.peek_char()? else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position: start,
                length: 0,
            });
        };

        if is_whitespace(ch) {
            return self.scan_whitespace(start);
        } else if is_letter(ch) {
            return self.scan_ident(start);
        } else if ch == '"' {
            return self.scan_quoted(start);
        } else if ch.is_ascii_digit() {
            return self.scan_number(start);
        } else if ch == '{' {
            return self.scan_comment(start);
        }

        self.next_char()?;

        let kind = match ch {
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '.' => return self.scan_dot_run(start),
            '*' => TokenKind::Result("*".to_owned()),
            _ if is_nag(ch) => return self.scan_nag(start, ch),
            _ => TokenKind::Illegal {
                literal: ch.to_string(),
                cause: IllegalCause::Stray,
            },
        };

        Ok(Token {
            kind,
            position: start,
            length: 1,
        })
    }

    fn scan_whitespace(&mut self, start: Position) -> io::Result<Token> {
        let mut length = 0;
        while let Some(ch) = self.peek_char()? {
            if !is_whitespace(ch) {
                break;
            }
            self.next_char()?;
            length += 1;
        }

        Ok(Token {
            kind: TokenKind::Whitespace,
            position: start,
            length,
        })
    }

    fn scan_ident(&mut self, start: Position) -> io::Result<Token> {
        let mut literal = String::new();
        while let Some(ch) = self.peek_char()? {
            if !is_ident_char(ch) {
                break;
            }
            self.next_char()?;
            literal.push(ch);
        }

        Ok(Token {
            length: literal.chars().count(),
            kind: TokenKind::Ident(literal),
            position: start,
        })
    }

    /// Scans a double-quoted literal. A backslash escapes the following
    /// character verbatim; the quotes are excluded from the literal.
    fn scan_quoted(&mut self, start: Position) -> io::Result<Token> {
        self.next_char()?;
        let mut literal = String::new();
        let mut length = 0;

        loop {
            match self.peek_char()? {
                None => {
                    return Ok(Token {
                        kind: TokenKind::Illegal {
                            literal,
                            cause: IllegalCause::Unterminated,
                        },
                        position: start,
                        length,
                    });
                }
                Some('"') => {
                    self.next_char()?;
                    break;
                }
                Some('\\') => {
                    self.next_char()?;
                    length += 1;
                    if let Some(escaped) = self.next_char()? {
                        literal.push(escaped);
                        length += 1;
                    }
                }
                Some(ch) => {
                    self.next_char()?;
                    literal.push(ch);
                    length += 1;
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Quote(literal),
            position: start,
            length,
        })
    }

    /// Scans a `{ ... }` comment. The literal is the enclosed text trimmed
    /// of leading and trailing spaces.
    fn scan_comment(&mut self, start: Position) -> io::Result<Token> {
        self.next_char()?;
        let mut literal = String::new();
        let mut length = 0;

        loop {
            match self.peek_char()? {
                None => {
                    return Ok(Token {
                        kind: TokenKind::Illegal {
                            literal,
                            cause: IllegalCause::Unterminated,
                        },
                        position: start,
                        length,
                    });
                }
                Some('}') => {
                    self.next_char()?;
                    break;
                }
                Some(ch) => {
                    self.next_char()?;
                    literal.push(ch);
                    length += 1;
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Comment(literal.trim_matches(' ').to_owned()),
            position: start,
            length,
        })
    }

    /// Scans a digit-initiated token: a draw result `1/2-1/2`, a decisive
    /// result like `1-0`, a move number like `27...`, or a plain number.
    /// All three result forms share the leading digit and are disambiguated
    /// by look-ahead on the second character; on a mismatch the consumed
    /// prefix is returned as an illegal token, without backtracking.
    fn scan_number(&mut self, start: Position) -> io::Result<Token> {
        let mut literal = String::new();
        let mut length = 0;

        let Some(first) = self.next_char()? else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position: start,
                length: 0,
            });
        };
        literal.push(first);
        length += 1;

        match self.peek_char()? {
            Some('/') => {
                for expected in ['/', '2', '-', '1', '/', '2'] {
                    let Some(ch) = self.next_char()? else {
                        return Ok(Token {
                            kind: TokenKind::Illegal {
                                literal,
                                cause: IllegalCause::MalformedResult,
                            },
                            position: start,
                            length,
                        });
                    };
                    literal.push(ch);
                    length += 1;
                    if ch != expected {
                        return Ok(Token {
                            kind: TokenKind::Illegal {
                                literal,
                                cause: IllegalCause::MalformedResult,
                            },
                            position: start,
                            length,
                        });
                    }
                }

                Ok(Token {
                    kind: TokenKind::Result(literal),
                    position: start,
                    length,
                })
            }
            Some('-') => {
                self.next_char()?;
                literal.push('-');
                length += 1;

                match self.next_char()? {
                    Some(ch @ ('0' | '1')) => {
                        literal.push(ch);
                        length += 1;
                        Ok(Token {
                            kind: TokenKind::Result(literal),
                            position: start,
                            length,
                        })
                    }
                    Some(ch) => {
                        literal.push(ch);
                        length += 1;
                        Ok(Token {
                            kind: TokenKind::Illegal {
                                literal,
                                cause: IllegalCause::MalformedResult,
                            },
                            position: start,
                            length,
                        })
                    }
                    None => Ok(Token {
                        kind: TokenKind::Illegal {
                            literal,
                            cause: IllegalCause::MalformedResult,
                        },
                        position: start,
                        length,
                    }),
                }
            }
            _ => loop {
                match self.peek_char()? {
                    Some('.') => {
                        // The dot run counts towards the length but stays
                        // out of the literal.
                        while self.peek_char()? == Some('.') {
                            self.next_char()?;
                            length += 1;
                        }
                        return Ok(Token {
                            kind: TokenKind::MoveNumber(literal),
                            position: start,
                            length,
                        });
                    }
                    Some(ch) if ch.is_ascii_digit() => {
                        self.next_char()?;
                        literal.push(ch);
                        length += 1;
                    }
                    _ => {
                        return Ok(Token {
                            kind: TokenKind::Number(literal),
                            position: start,
                            length,
                        });
                    }
                }
            },
        }
    }

    fn scan_nag(&mut self, start: Position, first: char) -> io::Result<Token> {
        let mut literal = String::new();
        literal.push(first);
        let mut length = 1;

        while let Some(ch) = self.peek_char()? {
            if !is_nag(ch) {
                break;
            }
            self.next_char()?;
            literal.push(ch);
            length += 1;
        }

        Ok(Token {
            kind: TokenKind::Nag(literal),
            position: start,
            length,
        })
    }

    fn scan_dot_run(&mut self, start: Position) -> io::Result<Token> {
        let mut length = 1;
        while self.peek_char()? == Some('.') {
            self.next_char()?;
            length += 1;
        }

        Ok(Token {
            kind: TokenKind::Dot,
            position: start,
            length,
        })
    }

    pub(crate) fn peek_char(&mut self) -> io::Result<Option<char>> {
        let bytes = self.buffer.ensure(4, &mut self.reader)?;
        Ok(decode_char(bytes).map(|(ch, _)| ch))
    }

    pub(crate) fn next_char(&mut self) -> io::Result<Option<char>> {
        let bytes = self.buffer.ensure(4, &mut self.reader)?;
        let Some((ch, len)) = decode_char(bytes) else {
            return Ok(None);
        };

        self.buffer.consume(len);
        self.pos.offset += len as u64;
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }

        Ok(Some(ch))
    }

    /// Advances the cursor to the next newline, leaving it unconsumed.
    /// Returns `false` if the input ends first. Column tracking is
    /// byte-approximate across the skipped span; the newline that follows
    /// resets it.
    pub(crate) fn skip_to_newline(&mut self) -> io::Result<bool> {
        loop {
            let data = self.buffer.ensure(1, &mut self.reader)?;
            if data.is_empty() {
                return Ok(false);
            }

            match memchr::memchr(b'\n', data) {
                Some(i) => {
                    self.buffer.consume(i);
                    self.pos.offset += i as u64;
                    self.pos.column += i as u32;
                    return Ok(true);
                }
                None => {
                    let n = data.len();
                    self.buffer.consume(n);
                    self.pos.offset += n as u64;
                    self.pos.column += n as u32;
                }
            }
        }
    }
}

fn decode_char(bytes: &[u8]) -> Option<(char, usize)> {
    let first = *bytes.first()?;
    if first.is_ascii() {
        return Some((char::from(first), 1));
    }

    let len = match first {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => 1,
    };

    match std::str::from_utf8(&bytes[..len.min(bytes.len())]) {
        Ok(s) => s.chars().next().map(|ch| (ch, ch.len_utf8())),
        // Invalid or truncated sequence: replace and advance one byte.
        Err(_) => Some((char::REPLACEMENT_CHARACTER, 1)),
    }
}

fn is_whitespace(ch: char) -> bool {
    ch == ' ' || ch == '\t' || ch == '\n'
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '=' | '+' | '#' | '-')
}

fn is_nag(ch: char) -> bool {
    matches!(
        ch,
        '!' | '?'
            | '‼'
            | '⁇'
            | '⁉'
            | '⁈'
            | '□'
            | '='
            | '∞'
            | '±'
            | '∓'
            | '+'
            | '-'
            | '⨀'
            | '⟳'
            | '→'
            | '↑'
            | '⇆'
    )
}
