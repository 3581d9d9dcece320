// Morphological analysis result types.

use std::cmp::Ordering;

use crate::role::Role;
use crate::token::Token;

/// One morphological reading of a token, tagged with the role of the model
/// that produced it.
///
/// Lower `weight` is better (tropical semiring). `origin` is either
/// [`Role::Analysis`] for lexicon readings or [`Role::Guesser`] for
/// backoff guesses; guesses are never authoritative.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    pub output: String,
    pub weight: f32,
    pub origin: Role,
}

impl Analysis {
    pub fn new(output: impl Into<String>, weight: f32, origin: Role) -> Self {
        Self {
            output: output.into(),
            weight,
            origin,
        }
    }

    /// Whether this reading came from the guesser rather than the lexicon.
    pub fn is_guess(&self) -> bool {
        self.origin == Role::Guesser
    }

    /// Canonical ranking: ascending weight, ties broken by output string.
    pub fn ranking(a: &Analysis, b: &Analysis) -> Ordering {
        a.weight
            .total_cmp(&b.weight)
            .then_with(|| a.output.cmp(&b.output))
    }
}

/// Sort analyses into canonical order (best first, deterministic ties).
pub fn sort_analyses(analyses: &mut [Analysis]) {
    analyses.sort_by(Analysis::ranking);
}

/// A token together with its ranked analyses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisResult {
    pub token: Token,
    pub analyses: Vec<Analysis>,
    /// Set when a traversal cap cut the lookup short; the list may be
    /// incomplete.
    pub truncated: bool,
}

impl AnalysisResult {
    /// Whether any reading was found.
    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    /// The best-ranked analysis, if any.
    pub fn best(&self) -> Option<&Analysis> {
        self.analyses.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn sort_by_weight_then_output() {
        let mut analyses = vec![
            Analysis::new("c", 2.0, Role::Analysis),
            Analysis::new("b", 1.0, Role::Analysis),
            Analysis::new("a", 1.0, Role::Analysis),
        ];
        sort_analyses(&mut analyses);
        let outputs: Vec<&str> = analyses.iter().map(|a| a.output.as_str()).collect();
        assert_eq!(outputs, vec!["a", "b", "c"]);
    }

    #[test]
    fn negative_weights_sort_first() {
        let mut analyses = vec![
            Analysis::new("x", 0.5, Role::Analysis),
            Analysis::new("y", -1.0, Role::Analysis),
        ];
        sort_analyses(&mut analyses);
        assert_eq!(analyses[0].output, "y");
    }

    #[test]
    fn guess_flag() {
        assert!(Analysis::new("x", 0.0, Role::Guesser).is_guess());
        assert!(!Analysis::new("x", 0.0, Role::Analysis).is_guess());
    }

    #[test]
    fn result_best() {
        let result = AnalysisResult {
            token: Token::new(TokenKind::Word, "talo", 0),
            analyses: vec![Analysis::new("talo[N]", 0.0, Role::Analysis)],
            truncated: false,
        };
        assert!(!result.is_empty());
        assert_eq!(result.best().map(|a| a.output.as_str()), Some("talo[N]"));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::TokenKind;

    #[test]
    fn analysis_result_json_shape() {
        let result = AnalysisResult {
            token: Token::new(TokenKind::Word, "talossa", 3),
            analyses: vec![Analysis::new("talo[CASE=INE]", 0.5, Role::Analysis)],
            truncated: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "token": { "surface": "talossa", "position": 3, "kind": "Word" },
                "analyses": [
                    { "output": "talo[CASE=INE]", "weight": 0.5, "origin": "Analysis" }
                ],
                "truncated": false
            })
        );
        let back: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn role_round_trips_by_name() {
        for role in Role::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role:?}\""));
            assert_eq!(serde_json::from_str::<Role>(&json).unwrap(), role);
        }
    }
}
