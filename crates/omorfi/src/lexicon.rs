// Lexicon membership on top of an analyser.

use omorfi_core::{Analysis, Role};

use crate::analyser::Analyse;

/// Segmentation boundary symbols written into analyser output.
const BOUNDARY_MARKERS: [&str; 7] = ["{MB}", "{WB}", "{XB}", "{DB}", "{SB}", "{STUB}", "{hyph?}"];

/// Bracketed tags that annotate an analysis rather than describe the word.
const ANNOTATION_TAGS: [&str; 4] = ["[BOUNDARY=", "[GUESS=", "[CASECHANGE=", "[WEIGHT="];

/// Tag the analysis model puts on its own back-off guesses.
const GUESS_TAG: &str = "[GUESS=";

/// Remove boundary markers and annotation tags from an analysis output.
pub fn strip_markers(output: &str) -> String {
    let mut out = String::with_capacity(output.len());
    let mut rest = output;
    'scan: while let Some(c) = rest.chars().next() {
        if c == '{' {
            for marker in BOUNDARY_MARKERS {
                if let Some(after) = rest.strip_prefix(marker) {
                    rest = after;
                    continue 'scan;
                }
            }
        } else if c == '[' {
            for tag in ANNOTATION_TAGS {
                if rest.starts_with(tag) {
                    if let Some(end) = rest.find(']') {
                        rest = &rest[end + 1..];
                        continue 'scan;
                    }
                }
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Whether an analysis counts as a lexicon hit.
fn is_lexicon_hit(analysis: &Analysis) -> bool {
    analysis.origin == Role::Analysis
        && !analysis.output.contains(GUESS_TAG)
        && !strip_markers(&analysis.output).is_empty()
}

/// Boolean lexicon membership test.
///
/// A token is accepted when the analyser returns at least one reading from
/// the analysis model that is not a guess and still has content once its
/// markers are stripped. This runs a full analysis, so it costs as much as
/// [`Analyse::analyse`].
pub struct LexiconChecker<'a> {
    analyser: &'a dyn Analyse,
}

impl<'a> LexiconChecker<'a> {
    pub fn new(analyser: &'a dyn Analyse) -> Self {
        Self { analyser }
    }

    pub fn accept(&self, token: &str) -> bool {
        self.analyser.analyse(token).iter().any(is_lexicon_hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyser::AnalysisOutcome;

    /// Returns fixed analyses for known tokens.
    struct MockAnalyser;

    impl Analyse for MockAnalyser {
        fn analyse_detailed(&self, token: &str) -> AnalysisOutcome {
            let analyses = match token {
                "talo" => vec![Analysis::new("talo[UPOS=NOUN]", 0.0, Role::Analysis)],
                "Talo" => vec![Analysis::new(
                    "talo[UPOS=NOUN][CASECHANGE=LOWERCASED]",
                    0.0,
                    Role::Analysis,
                )],
                "xyz" => vec![Analysis::new("xyz[UPOS=NOUN]", 3.0, Role::Guesser)],
                "qwe" => vec![Analysis::new("qwe[GUESS=NOUN]", 3.0, Role::Analysis)],
                "bare" => vec![Analysis::new("{MB}[WEIGHT=0.5]", 0.0, Role::Analysis)],
                "mixed" => vec![
                    Analysis::new("mixed[GUESS=NOUN]", 1.0, Role::Analysis),
                    Analysis::new("mix{MB}ed[UPOS=VERB]", 2.0, Role::Analysis),
                ],
                _ => Vec::new(),
            };
            AnalysisOutcome {
                analyses,
                truncated: None,
            }
        }
    }

    #[test]
    fn strip_boundaries_and_annotations() {
        assert_eq!(
            strip_markers("talo{MB}ssa[BOUNDARY=LEXITEM][WEIGHT=0.000000]"),
            "talossa"
        );
        assert_eq!(strip_markers("{hyph?}a{STUB}{WB}"), "a");
        assert_eq!(strip_markers("x[CASECHANGE=TITLECASED][GUESS=X]"), "x");
        assert_eq!(strip_markers("talo[UPOS=NOUN]"), "talo[UPOS=NOUN]");
        assert_eq!(strip_markers("{open[WEIGHT=1"), "{open[WEIGHT=1");
        assert_eq!(strip_markers(""), "");
    }

    #[test]
    fn accepts_lexicon_words() {
        let checker = LexiconChecker::new(&MockAnalyser);
        assert!(checker.accept("talo"));
        assert!(checker.accept("Talo"));
        assert!(checker.accept("mixed"));
    }

    #[test]
    fn rejects_guesses_and_empty_readings() {
        let checker = LexiconChecker::new(&MockAnalyser);
        assert!(!checker.accept("xyz"));
        assert!(!checker.accept("qwe"));
        assert!(!checker.accept("bare"));
        assert!(!checker.accept("nothing"));
    }
}
