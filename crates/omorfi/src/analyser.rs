// Analyser: primary-model lookup, case-variant retries and guesser backoff.

use hashbrown::HashMap;

use omorfi_core::analysis::sort_analyses;
use omorfi_core::case::CaseChange;
use omorfi_core::{Analysis, AnalysisResult, Role, Token};
use omorfi_fst::{LookupOptions, LookupResult, Transducer, TraversalLimitExceeded};

use crate::store::ModelStore;

/// Trait for morphological analysers.
///
/// The lexicon checker is written against this trait so that it can sit on
/// top of any analyser.
pub trait Analyse {
    /// Analyse one token, reporting whether a traversal limit was hit.
    fn analyse_detailed(&self, token: &str) -> AnalysisOutcome;

    /// Analyse one token. An empty list means no reading was found, which is
    /// not proof that the word does not exist.
    fn analyse(&self, token: &str) -> Vec<Analysis> {
        self.analyse_detailed(token).analyses
    }
}

/// Which case variants of a token the analyser also tries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyserOptions {
    /// "TALO" -> "talo"
    pub try_lowercase: bool,
    /// "talo" -> "Talo"
    pub try_titlecase: bool,
    /// "Talo" -> "talo"
    pub try_detitlecase: bool,
    /// "talo" -> "TALO"
    pub try_uppercase: bool,
    /// Limits for every lookup the analyser makes.
    pub lookup: LookupOptions,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            try_lowercase: true,
            try_titlecase: true,
            try_detitlecase: true,
            try_uppercase: false,
            lookup: LookupOptions::default(),
        }
    }
}

impl AnalyserOptions {
    /// Enabled case changes, in the order they are tried.
    fn case_changes(&self) -> impl Iterator<Item = CaseChange> {
        [
            (self.try_lowercase, CaseChange::Lowercased),
            (self.try_titlecase, CaseChange::Titlecased),
            (self.try_detitlecase, CaseChange::Detitlecased),
            (self.try_uppercase, CaseChange::Uppercased),
        ]
        .into_iter()
        .filter_map(|(enabled, change)| enabled.then_some(change))
    }
}

/// Analyses of one token plus the first traversal limit any lookup hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisOutcome {
    /// Ascending weight, ties by output string.
    pub analyses: Vec<Analysis>,
    pub truncated: Option<TraversalLimitExceeded>,
}

/// Analyser over the models held by a [`ModelStore`].
///
/// Models are fetched from the store on every call, so a model loaded or
/// unloaded meanwhile takes effect on the next token.
#[derive(Debug, Clone, Copy)]
pub struct Analyser<'s> {
    store: &'s ModelStore,
    options: AnalyserOptions,
}

/// Collects readings of several lookups, keeping the best weight per output.
#[derive(Default)]
struct Merge {
    best: HashMap<String, f32>,
    truncated: Option<TraversalLimitExceeded>,
}

impl Merge {
    fn add(&mut self, result: LookupResult, marker: &str) {
        if self.truncated.is_none() {
            self.truncated = result.truncated;
        }
        for reading in result.readings {
            let mut output = reading.output;
            output.push_str(marker);
            let weight = self.best.entry(output).or_insert(reading.weight);
            if reading.weight < *weight {
                *weight = reading.weight;
            }
        }
    }

    /// Rank the merged readings and keep the best `cap` of them.
    fn finish(mut self, origin: Role, cap: usize) -> AnalysisOutcome {
        let mut analyses: Vec<Analysis> = self
            .best
            .into_iter()
            .map(|(output, weight)| Analysis::new(output, weight, origin))
            .collect();
        sort_analyses(&mut analyses);
        if analyses.len() > cap {
            analyses.truncate(cap);
            self.truncated.get_or_insert(TraversalLimitExceeded::ReadingCap);
        }
        AnalysisOutcome {
            analyses,
            truncated: self.truncated,
        }
    }
}

impl<'s> Analyser<'s> {
    pub fn new(store: &'s ModelStore, options: AnalyserOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &AnalyserOptions {
        &self.options
    }

    /// Look up `token` and its enabled case variants in `transducer`.
    ///
    /// Each lookup is capped at `max_readings` on its own; the merged list is
    /// capped again when it is finished.
    fn lookup_with_variants(&self, transducer: &Transducer, token: &str) -> Merge {
        let mut merge = Merge::default();
        merge.add(transducer.lookup(token, &self.options.lookup), "");

        let mut tried = vec![token.to_string()];
        for change in self.options.case_changes() {
            let Some(variant) = change.apply(token) else {
                continue;
            };
            if tried.contains(&variant) {
                continue;
            }
            merge.add(
                transducer.lookup(&variant, &self.options.lookup),
                change.marker(),
            );
            tried.push(variant);
        }
        merge
    }

    /// Analyse a token sequence lazily, pairing each token with its result.
    pub fn analyse_tokens<I>(&self, tokens: I) -> impl Iterator<Item = AnalysisResult> + use<'s, I>
    where
        I: IntoIterator<Item = Token>,
    {
        let analyser = *self;
        tokens.into_iter().map(move |token| {
            let outcome = analyser.analyse_detailed(&token.surface);
            AnalysisResult {
                token,
                analyses: outcome.analyses,
                truncated: outcome.truncated.is_some(),
            }
        })
    }
}

impl Analyse for Analyser<'_> {
    /// 1. Look up the token and its case variants in the analysis model.
    /// 2. If that finds nothing, look the token up in the guesser model.
    ///
    /// Guesses are only returned when the analysis model found nothing, and
    /// are marked with [`Role::Guesser`].
    fn analyse_detailed(&self, token: &str) -> AnalysisOutcome {
        let mut truncated = None;
        if let Some(model) = self.store.get(Role::Analysis) {
            let outcome = self
                .lookup_with_variants(model.transducer(), token)
                .finish(Role::Analysis, self.options.lookup.max_readings);
            if !outcome.analyses.is_empty() {
                return outcome;
            }
            truncated = outcome.truncated;
        }

        if let Some(model) = self.store.get(Role::Guesser) {
            let mut merge = Merge::default();
            merge.add(model.transducer().lookup(token, &self.options.lookup), "");
            let mut outcome = merge.finish(Role::Guesser, self.options.lookup.max_readings);
            if outcome.truncated.is_none() {
                outcome.truncated = truncated;
            }
            return outcome;
        }

        AnalysisOutcome {
            analyses: Vec::new(),
            truncated,
        }
    }
}
