// Token type produced by the tokenizer.

use crate::character::{CharType, get_char_type};

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Starts with a letter or digit.
    Word,
    /// Punctuation mark(s).
    Punctuation,
    /// Character not used in running text (symbols, emoji, ...).
    Unknown,
}

impl TokenKind {
    /// Classify a token by its first character.
    pub fn classify(surface: &str) -> Self {
        match surface.chars().next().map(get_char_type) {
            Some(CharType::Letter | CharType::Digit) => TokenKind::Word,
            Some(CharType::Punctuation) => {
                // "-talo" style word continuations start with a hyphen
                if surface.chars().skip(1).any(char::is_alphanumeric) {
                    TokenKind::Word
                } else {
                    TokenKind::Punctuation
                }
            }
            _ => TokenKind::Unknown,
        }
    }
}

/// One token of running text.
///
/// `surface` is what the tokenizer emits, which need not be a verbatim slice
/// of the input: a tokenizer model may normalize it. `position` is the
/// 0-based index of the token in its sequence; surfaces may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub surface: String,
    pub position: usize,
    pub kind: TokenKind,
}

impl Token {
    /// Create a new token with an explicit kind.
    pub fn new(kind: TokenKind, surface: impl Into<String>, position: usize) -> Self {
        Self {
            surface: surface.into(),
            position,
            kind,
        }
    }

    /// Create a token, classifying its kind from the surface.
    pub fn classified(surface: impl Into<String>, position: usize) -> Self {
        let surface = surface.into();
        let kind = TokenKind::classify(&surface);
        Self {
            surface,
            position,
            kind,
        }
    }

    /// Length of the surface in characters.
    pub fn char_len(&self) -> usize {
        self.surface.chars().count()
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.surface
    }
}
