//! In-memory representation of parsed games.

/// The metadata tags of a game: an ordered string mapping in which the last
/// write to a key wins.
///
/// Iteration yields entries in first-insertion order; overwriting a value
/// does not move its key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tags {
    entries: Vec<(String, String)>,
}

impl Tags {
    pub fn new() -> Tags {
        Tags::default()
    }

    /// Inserts a tag pair, replacing the value in place if the key already
    /// exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Tags {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Tags {
        let mut tags = Tags::new();
        for (key, value) in iter {
            tags.insert(key, value);
        }
        tags
    }
}

/// A single half-move with its annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    /// The move number, present only when the move immediately followed a
    /// move number token in the source (white's move of a numbered pair).
    pub number: Option<u32>,
    /// The move in algebraic notation, lexically plausible but not
    /// validated against the rules of chess.
    pub text: String,
    /// The `{ ... }` comment attached to the move, trimmed of spaces.
    pub annotation: Option<String>,
    /// The numeric annotation glyph attached to the move, like `?!`.
    pub nag: Option<String>,
    /// Alternative lines that could have been played instead of this move.
    /// Always empty: variations are unimplemented and reported as a parse
    /// error.
    pub alternatives: Vec<Move>,
}

/// A complete game: metadata tags plus the moves that were played.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Game {
    pub tags: Tags,
    pub moves: Vec<Move>,
}
