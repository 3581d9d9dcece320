// Functional roles a loaded model can play.

use std::fmt;
use std::str::FromStr;

/// The functional purpose of a loaded transducer.
///
/// A model store holds at most one model per role. Every reading produced by
/// the analyser carries the role of the model it came from, so callers can
/// tell authoritative lexicon readings from guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Primary morphological analyser (lexicon-backed).
    Analysis,
    /// Guesser used as a backoff when the analyser yields nothing.
    Guesser,
    /// Tokenizer transducer used for segmenting running text.
    Tokenizer,
}

impl Role {
    /// All roles, in slot order.
    pub const ALL: [Role; 3] = [Role::Analysis, Role::Guesser, Role::Tokenizer];

    /// Dense slot index of this role (0..3).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Role::Analysis => 0,
            Role::Guesser => 1,
            Role::Tokenizer => 2,
        }
    }

    /// Lowercase name, as used in logs and by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Analysis => "analysis",
            Role::Guesser => "guesser",
            Role::Tokenizer => "tokenizer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model role: {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Accepts both British and American spellings and the verb forms used
    /// in omorfi automaton file names (`analyse`, `guess`, `tokenise`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "analysis" | "analyse" | "analyze" | "analyser" | "analyzer" => Ok(Role::Analysis),
            "guesser" | "guess" => Ok(Role::Guesser),
            "tokenizer" | "tokeniser" | "tokenize" | "tokenise" => Ok(Role::Tokenizer),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}
