//! Recursive-descent parser with per-game error recovery.

use std::io::{self, Read};

use crate::{
    error::{AggregateError, GameError, ParseError},
    game::{Game, Move, Tags},
    scanner::Scanner,
    token::{IllegalCause, Position, Token, TokenKind},
};

/// Parses every game from `input` in order.
///
/// One malformed game never aborts the rest of the input: the parser skips
/// ahead to the next game boundary and continues. The games that did parse
/// are always returned; failures are aggregated into a single error, `None`
/// when there were no failures.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
///
/// let input = "[Event \"Casual\"]\n\n1. e4 e5 2. Nf3 1-0\n";
/// let (games, errors) = pgn::parse(Cursor::new(input));
///
/// assert!(errors.is_none());
/// assert_eq!(games.len(), 1);
/// assert_eq!(games[0].moves.len(), 3);
/// ```
pub fn parse<R: Read>(input: R) -> (Vec<Game>, Option<AggregateError>) {
    let mut parser = Parser::from_reader(input);
    let mut games = Vec::new();
    let mut errors = Vec::new();

    loop {
        match parser.at_end() {
            Ok(true) => break,
            Ok(false) => (),
            Err(err) => {
                errors.push(ParseError::Io(err));
                break;
            }
        }

        match parser.parse_game() {
            Ok(game) => games.push(game),
            Err(err) => {
                // A read error will not get better by retrying.
                let fatal = err.error.is_io();
                errors.push(err.error);
                if fatal {
                    break;
                }
                if let Err(err) = parser.recover(false) {
                    errors.push(ParseError::Io(err));
                    break;
                }
            }
        }
    }

    (games, AggregateError::from_errors(errors))
}

/// A PGN parser over a single [`Scanner`].
///
/// Holds no state beyond the scanner's own cursor; each concurrent worker
/// constructs its own parser.
#[derive(Debug)]
pub struct Parser<R> {
    scanner: Scanner<R>,
}

impl<R: Read> Parser<R> {
    pub fn new(scanner: Scanner<R>) -> Parser<R> {
        Parser { scanner }
    }

    pub fn from_reader(reader: R) -> Parser<R> {
        Parser::new(Scanner::new(reader))
    }

    /// The position of the next unconsumed character.
    pub fn position(&self) -> Position {
        self.scanner.position()
    }

    /// Whether only whitespace remains before end of input. The whitespace
    /// is consumed.
    pub fn at_end(&mut self) -> io::Result<bool> {
        Ok(self.scanner.peek()?.is_none())
    }

    /// Parses one game: a tag block followed by a move list. On failure the
    /// partial game assembled so far travels with the error.
    pub fn parse_game(&mut self) -> Result<Game, GameError> {
        let mut game = Game::default();

        if let Err(error) = self.parse_tags_into(&mut game.tags) {
            return Err(GameError { partial: game, error });
        }
        if let Err(error) = self.parse_moves_into(&mut game.moves) {
            return Err(GameError { partial: game, error });
        }

        Ok(game)
    }

    /// Parses a tag block of `[Key "Value"]` pairs, stopping when the next
    /// non-whitespace character is not `[`. Duplicate keys keep the last
    /// value.
    pub fn parse_tags(&mut self) -> Result<Tags, GameError> {
        let mut tags = Tags::new();
        match self.parse_tags_into(&mut tags) {
            Ok(()) => Ok(tags),
            Err(error) => Err(GameError {
                partial: Game {
                    tags,
                    moves: Vec::new(),
                },
                error,
            }),
        }
    }

    /// Parses a move list terminated by a result token.
    pub fn parse_moves(&mut self) -> Result<Vec<Move>, GameError> {
        let mut moves = Vec::new();
        match self.parse_moves_into(&mut moves) {
            Ok(()) => Ok(moves),
            Err(error) => Err(GameError {
                partial: Game {
                    tags: Tags::new(),
                    moves,
                },
                error,
            }),
        }
    }

    fn parse_tags_into(&mut self, tags: &mut Tags) -> Result<(), ParseError> {
        loop {
            let tok = self.scanner.next_token()?;
            if tok.kind != TokenKind::LBracket {
                return Err(unexpected("[", tok));
            }

            let key = match self.scanner.next_token()? {
                Token {
                    kind: TokenKind::Ident(text),
                    ..
                } => text,
                tok => return Err(unexpected("IDENT", tok)),
            };

            let value = match self.scanner.next_token()? {
                Token {
                    kind: TokenKind::Quote(text),
                    ..
                } => text,
                tok => return Err(unexpected("QUOTE", tok)),
            };

            let tok = self.scanner.next_token()?;
            if tok.kind != TokenKind::RBracket {
                return Err(unexpected("]", tok));
            }

            tags.insert(key, value);

            if self.scanner.peek()? != Some('[') {
                return Ok(());
            }
        }
    }

    /// A move is an optional move number, a mandatory move text, then an
    /// optional NAG and an optional comment. The list ends at the first
    /// result token; end of input before a result is a hard error. A `(`
    /// aborts the game: variations are unimplemented.
    fn parse_moves_into(&mut self, moves: &mut Vec<Move>) -> Result<(), ParseError> {
        let mut tok = self.scanner.next_token()?;

        // Some games have no recorded moves, just a result.
        if matches!(tok.kind, TokenKind::Result(_)) {
            return Ok(());
        }

        loop {
            let mut mv = Move::default();

            if let TokenKind::MoveNumber(literal) = &tok.kind {
                let number =
                    btoi::btou(literal.as_bytes()).map_err(|_| ParseError::InvalidMoveNumber {
                        literal: literal.clone(),
                        position: tok.position,
                    })?;
                mv.number = Some(number);
                tok = self.scanner.next_token()?;
            }

            match tok.kind {
                TokenKind::Ident(text) => mv.text = text,
                _ => return Err(unexpected("IDENT", tok)),
            }

            tok = self.scanner.next_token()?;

            if let TokenKind::Nag(glyph) = tok.kind {
                mv.nag = Some(glyph);
                tok = self.scanner.next_token()?;
            }

            if let TokenKind::Comment(text) = tok.kind {
                mv.annotation = Some(text);
                tok = self.scanner.next_token()?;
            }

            if tok.kind == TokenKind::LParen {
                return Err(ParseError::UnsupportedFeature {
                    feature: "move alternatives",
                    position: tok.position,
                });
            }

            moves.push(mv);

            if matches!(tok.kind, TokenKind::Result(_)) {
                return Ok(());
            }
        }
    }

    /// Reads the next token and validates it as a single move in algebraic
    /// notation: a castling literal, or a piece or file letter followed only
    /// by characters from the SAN alphabet.
    ///
    /// This is deliberately stricter than [`Parser::parse_moves`], which
    /// accepts any identifier as move text.
    pub fn parse_move_str(&mut self) -> Result<String, ParseError> {
        let tok = self.scanner.next_token()?;
        let position = tok.position;
        let text = match tok.kind {
            TokenKind::Ident(text) => text,
            _ => return Err(unexpected("move", tok)),
        };

        if text == "O-O" || text == "O-O-O" {
            return Ok(text);
        }

        let plausible = matches!(
            text.chars().next(),
            Some('N' | 'B' | 'R' | 'Q' | 'K' | 'a'..='h')
        ) && text.chars().all(is_san_char);

        if plausible {
            Ok(text)
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "move",
                got: text,
                position,
            })
        }
    }

    /// Advances the cursor to the next game boundary: a newline, directly
    /// followed by one or more newlines, followed by a `[` that is left
    /// unconsumed. A no-op at the true start of input. Used after a parse
    /// failure and by concurrent chunks seeked to an arbitrary offset.
    pub fn recover(&mut self, is_start: bool) -> io::Result<()> {
        if is_start {
            return Ok(());
        }

        loop {
            if !self.scanner.skip_to_newline()? {
                return Ok(());
            }
            self.scanner.next_char()?;

            if self.scanner.peek_char()? != Some('\n') {
                continue;
            }
            while self.scanner.peek_char()? == Some('\n') {
                self.scanner.next_char()?;
            }

            if self.scanner.peek_char()? == Some('[') {
                return Ok(());
            }
        }
    }
}

fn unexpected(expected: &'static str, tok: Token) -> ParseError {
    let position = tok.position;
    match tok.kind {
        TokenKind::Illegal {
            cause: IllegalCause::Unterminated,
            ..
        } => ParseError::UnterminatedLiteral { position },
        TokenKind::Illegal {
            cause: IllegalCause::MalformedResult,
            literal,
        } => ParseError::MalformedNumericResult { literal, position },
        kind => ParseError::UnexpectedToken {
            expected,
            got: kind.literal().to_owned(),
            position,
        },
    }
}

fn is_san_char(ch: char) -> bool {
    matches!(ch, 'a'..='h' | '1'..='8' | 'N' | 'B' | 'R' | 'Q' | 'K' | '=' | '+' | 'x' | '-' | '#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parser(input: &str) -> Parser<Cursor<Vec<u8>>> {
        Parser::from_reader(Cursor::new(input.as_bytes().to_vec()))
    }

    fn mv(number: Option<u32>, text: &str) -> Move {
        Move {
            number,
            text: text.to_owned(),
            ..Move::default()
        }
    }

    #[test]
    fn test_parse_game() {
        let game = parser(
            "[Event \"Rated Classical game\"]\n\
             [Site \"https://lichess.org/j1dkb5dw\"]\n\
             [Result \"1-0\"]\n\
             \n\
             1. e4 e6 2. d4 b6 3. a3 Bb7 1-0",
        )
        .parse_game()
        .expect("valid game");

        assert_eq!(game.tags.get("Event"), Some("Rated Classical game"));
        assert_eq!(game.tags.get("Site"), Some("https://lichess.org/j1dkb5dw"));
        assert_eq!(game.tags.get("Result"), Some("1-0"));
        assert_eq!(
            game.moves,
            [
                mv(Some(1), "e4"),
                mv(None, "e6"),
                mv(Some(2), "d4"),
                mv(None, "b6"),
                mv(Some(3), "a3"),
                mv(None, "Bb7"),
            ]
        );
    }

    #[test]
    fn test_bare_result_means_no_moves() {
        let moves = parser("* ").parse_moves().expect("valid");
        assert!(moves.is_empty());
    }

    #[test]
    fn test_missing_result_is_an_error() {
        let err = parser("1. e4").parse_moves().expect_err("no result token");
        assert!(matches!(err.error, ParseError::UnexpectedToken { .. }));
        // The move itself had already been assembled.
        assert_eq!(err.partial.moves, [mv(Some(1), "e4")]);
    }

    #[test]
    fn test_black_move_keeps_number() {
        let moves = parser("1... c5 *").parse_moves().expect("valid");
        assert_eq!(moves, [mv(Some(1), "c5")]);
    }

    #[test]
    fn test_nag_and_annotation_attach_to_move() {
        let moves = parser("1. e4!? { risky } e5 *").parse_moves().expect("valid");
        assert_eq!(
            moves,
            [
                Move {
                    number: Some(1),
                    text: "e4".to_owned(),
                    nag: Some("!?".to_owned()),
                    annotation: Some("risky".to_owned()),
                    alternatives: Vec::new(),
                },
                mv(None, "e5"),
            ]
        );
    }

    #[test]
    fn test_variations_are_unsupported_not_dropped() {
        let err = parser("1. e4 (1. d4) 1-0")
            .parse_moves()
            .expect_err("variations unimplemented");
        assert!(matches!(
            err.error,
            ParseError::UnsupportedFeature {
                feature: "move alternatives",
                ..
            }
        ));
    }

    #[test]
    fn test_tag_mismatch_keeps_partial_tags() {
        let err = parser("[Event \"Casual\"]\n[Site broken]\n\n1. e4 *")
            .parse_tags()
            .expect_err("second tag is malformed");
        assert_eq!(err.partial.tags.get("Event"), Some("Casual"));
        let rendered = err.to_string();
        assert!(rendered.contains("expecting \"QUOTE\" but got \"broken\""), "{rendered}");
    }

    #[test]
    fn test_duplicate_tag_last_write_wins() {
        let tags = parser("[Event \"First\"]\n[Event \"Second\"]\n\n")
            .parse_tags()
            .expect("valid tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("Event"), Some("Second"));
    }

    #[test]
    fn test_quoted_escapes_resolve() {
        let tags = parser("[White \"Deep \\\"Blue\\\" \\\\1997\"]\n\n")
            .parse_tags()
            .expect("valid tags");
        assert_eq!(tags.get("White"), Some("Deep \"Blue\" \\1997"));
    }

    #[test]
    fn test_unterminated_tag_value() {
        let err = parser("[Event \"no closing")
            .parse_tags()
            .expect_err("unterminated quote");
        assert!(matches!(err.error, ParseError::UnterminatedLiteral { .. }));
    }

    #[test]
    fn test_recover_finds_next_game_boundary() {
        let mut p = parser("garbage ]]] 1/3 more garbage\n\n[Event \"Ok\"]\n\n1. e4 *");
        p.recover(false).expect("in-memory read");

        let game = p.parse_game().expect("recovered onto a real game");
        assert_eq!(game.tags.get("Event"), Some("Ok"));
        assert_eq!(game.moves, [mv(Some(1), "e4")]);
    }

    #[test]
    fn test_recover_at_start_is_a_noop() {
        let mut p = parser("[Event \"Ok\"]\n\n1. e4 *");
        p.recover(true).expect("in-memory read");
        assert!(p.parse_game().is_ok());
    }

    #[test]
    fn test_recover_stops_at_end_of_input() {
        let mut p = parser("no boundary here");
        p.recover(false).expect("in-memory read");
        assert!(p.at_end().expect("in-memory read"));
    }

    #[test]
    fn test_parse_skips_bad_games() {
        let input = "[Event \"One\"]\n\n1. e4 *\n\n\
                     [Event broken]\n\n1. e4 *\n\n\
                     [Event \"Three\"]\n\n1. d4 *\n";
        let (games, errors) = parse(Cursor::new(input));

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].tags.get("Event"), Some("One"));
        assert_eq!(games[1].tags.get("Event"), Some("Three"));
        assert_eq!(errors.expect("one failure").count(), 1);
    }

    #[test]
    fn test_aggregate_error_caps_at_ten() {
        let input = "[Event broken]\n\n".repeat(12);
        let (games, errors) = parse(Cursor::new(input.as_bytes().to_vec()));

        assert!(games.is_empty());
        let errors = errors.expect("every game failed");
        assert_eq!(errors.count(), 12);

        let rendered = errors.to_string();
        assert!(rendered.starts_with("12 errors occurred"), "{rendered}");
        assert!(rendered.contains("and 2 other errors"), "{rendered}");
        assert!(!rendered.contains("\t11."), "{rendered}");
    }

    #[test]
    fn test_malformed_result_error() {
        let err = parser("1. e4 e5 1/3")
            .parse_moves()
            .expect_err("1/3 is not a result");
        assert!(matches!(
            err.error,
            ParseError::MalformedNumericResult { ref literal, .. } if literal == "1/3"
        ));
    }

    #[test]
    fn test_parse_move_str() {
        assert_eq!(parser("Nf3").parse_move_str().expect("valid"), "Nf3");
        assert_eq!(parser("O-O-O").parse_move_str().expect("valid"), "O-O-O");
        assert_eq!(parser("exd5+").parse_move_str().expect("valid"), "exd5+");
        assert_eq!(parser("e8=Q#").parse_move_str().expect("valid"), "e8=Q#");

        assert!(parser("zz").parse_move_str().is_err());
        assert!(parser("Pe4").parse_move_str().is_err());
        assert!(parser("Nf9").parse_move_str().is_err());
        assert!(parser("42").parse_move_str().is_err());
    }
}
