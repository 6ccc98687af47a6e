//! A tolerant, concurrent parser for chess game collections in PGN
//! notation.
//!
//! A PGN file holds zero or more games, each a block of `[Key "Value"]`
//! tags followed by a move list. This crate parses such files into
//! [`Game`] records through a three-stage pipeline:
//!
//! * a [`Scanner`] that turns raw bytes into typed [`Token`]s,
//! * a [`Parser`] that turns tokens into games, skipping ahead to the next
//!   game boundary after a malformed game instead of aborting the file,
//! * a chunk orchestrator ([`parse_concurrent`]) that splits a large file
//!   into byte ranges, parses them in parallel with one independent
//!   scanner and parser per range, and resynchronizes each range onto a
//!   true game boundary so every game is parsed exactly once.
//!
//! Move text is treated as opaque: it must look lexically plausible, but
//! no chess legality is checked. Parenthesized variation lines are
//! reported as an error for that game, never silently dropped.
//!
//! # Examples
//!
//! Parse a stream sequentially:
//!
//! ```
//! use std::io::Cursor;
//!
//! let input = "\
//! [Event \"Rated Classical game\"]
//! [White \"BFG9k\"]
//! [Black \"mamalak\"]
//!
//! 1. e4 e6 2. d4 b6 {modest} 3. a3?! Bb7 1-0
//! ";
//!
//! let (games, errors) = pgn::parse(Cursor::new(input));
//! assert!(errors.is_none());
//!
//! let game = &games[0];
//! assert_eq!(game.tags.get("White"), Some("BFG9k"));
//! assert_eq!(game.moves.len(), 6);
//! assert_eq!(game.moves[3].annotation.as_deref(), Some("modest"));
//! assert_eq!(game.moves[4].nag.as_deref(), Some("?!"));
//! ```
//!
//! Parse a large file concurrently:
//!
//! ```no_run
//! let games = pgn::parse_concurrent("lichess_db_standard_rated.pgn")?;
//! println!("{} games", games.len());
//! # Ok::<_, std::io::Error>(())
//! ```
//!
//! # Feature flags
//!
//! * `serde`: Implements `serde::Serialize` and `serde::Deserialize` for
//!   [`Game`], [`Move`] and [`Tags`].

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

mod buffer;
mod concurrent;
mod error;
mod game;
mod parser;
mod scanner;
mod token;

pub use crate::{
    concurrent::{parse_concurrent, parse_concurrent_chunked},
    error::{AggregateError, GameError, ParseError},
    game::{Game, Move, Tags},
    parser::{parse, Parser},
    scanner::Scanner,
    token::{IllegalCause, Position, Token, TokenKind},
};
