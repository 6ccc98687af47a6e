//! Error types for scanning and parsing.

use std::{fmt, io};

use crate::{game::Game, token::Position};

/// An error encountered while parsing a single game.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A grammar mismatch: the parser expected one token and found another.
    #[error("invalid token at {position}: expecting \"{expected}\" but got \"{got}\"")]
    UnexpectedToken {
        expected: &'static str,
        got: String,
        position: Position,
    },

    /// A syntactically valid construct the parser does not implement.
    #[error("unsupported feature at {position}: {feature}")]
    UnsupportedFeature {
        feature: &'static str,
        position: Position,
    },

    /// A digit-initiated token that matches none of `1/2-1/2`, `1-0`, `0-1`.
    #[error("malformed result at {position}: \"{literal}\"")]
    MalformedNumericResult { literal: String, position: Position },

    /// A quoted string or brace comment never closed before end of input.
    #[error("unterminated literal at {position}")]
    UnterminatedLiteral { position: Position },

    /// A move number token whose literal does not fit an integer.
    #[error("invalid move number at {position}: \"{literal}\"")]
    InvalidMoveNumber { literal: String, position: Position },

    /// A read error from the underlying input source.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ParseError {
    pub fn is_io(&self) -> bool {
        matches!(self, ParseError::Io(_))
    }
}

/// A [`ParseError`] together with whatever partial tags and moves had been
/// assembled before the game was aborted, kept for diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct GameError {
    pub partial: Game,
    pub error: ParseError,
}

/// All per-game failures of one sequential parsing run.
///
/// The rendered form is the failure count, up to the first 10 individual
/// errors verbatim, and a count of any remainder.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<ParseError>,
}

impl AggregateError {
    /// `None` when there is nothing to report.
    pub(crate) fn from_errors(errors: Vec<ParseError>) -> Option<AggregateError> {
        if errors.is_empty() {
            None
        } else {
            Some(AggregateError { errors })
        }
    }

    /// The individual per-game errors, in source order. Never empty.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn count(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} errors occurred while parsing pgn", self.errors.len())?;
        for (i, error) in self.errors.iter().take(10).enumerate() {
            writeln!(f, "\t{}. {}", i + 1, error)?;
        }
        if self.errors.len() > 10 {
            writeln!(f, "and {} other errors", self.errors.len() - 10)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}
