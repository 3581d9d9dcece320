// Case variants tried during analysis.

use crate::character::{is_lower, is_upper, simple_lower, simple_upper};

/// A recasing applied to a token before re-analysing it.
///
/// Readings found through a recased form are annotated with
/// [`CaseChange::marker`] so the change stays visible downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseChange {
    /// Every letter lowercased: "TALO" -> "talo".
    Lowercased,
    /// First letter uppercased, rest untouched: "talo" -> "Talo".
    Titlecased,
    /// First letter lowercased, rest untouched: "Talo" -> "talo".
    Detitlecased,
    /// Every letter uppercased: "talo" -> "TALO".
    Uppercased,
}

impl CaseChange {
    /// Tag appended to outputs of readings found through this recasing.
    pub fn marker(self) -> &'static str {
        match self {
            CaseChange::Lowercased => "[CASECHANGE=LOWERCASED]",
            CaseChange::Titlecased => "[CASECHANGE=TITLECASED]",
            CaseChange::Detitlecased => "[CASECHANGE=DETITLECASED]",
            CaseChange::Uppercased => "[CASECHANGE=UPPERCASED]",
        }
    }

    /// Produce the recased variant of `word`, or `None` when the change does
    /// not apply to it or would leave it unchanged.
    ///
    /// Titlecasing only applies to words longer than two characters that
    /// start with a lowercase letter; detitlecasing only to words starting
    /// with an uppercase letter.
    pub fn apply(self, word: &str) -> Option<String> {
        let first = word.chars().next()?;
        let variant: String = match self {
            CaseChange::Lowercased => word.chars().map(simple_lower).collect(),
            CaseChange::Uppercased => word.chars().map(simple_upper).collect(),
            CaseChange::Titlecased => {
                if word.chars().count() <= 2 || !is_lower(first) {
                    return None;
                }
                std::iter::once(simple_upper(first))
                    .chain(word.chars().skip(1))
                    .collect()
            }
            CaseChange::Detitlecased => {
                if !is_upper(first) {
                    return None;
                }
                std::iter::once(simple_lower(first))
                    .chain(word.chars().skip(1))
                    .collect()
            }
        };
        (variant != word).then_some(variant)
    }
}
