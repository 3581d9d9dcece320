// Omorfi: top-level handle owning a model store and per-component options.
//
// Design notes:
// - The handle owns the ModelStore and creates a lightweight Analyser,
//   Tokenizer or LexiconChecker on the fly in each method call, so every
//   call sees the models registered at that moment.
// - All methods take &self; loading and unloading go through the store's own
//   locking, so one handle can be shared across threads.

use std::path::Path;
use std::sync::Arc;

use omorfi_core::{Analysis, AnalysisResult, Role};
use omorfi_fst::Transducer;

use crate::analyser::{Analyse, Analyser, AnalyserOptions, AnalysisOutcome};
use crate::lexicon::LexiconChecker;
use crate::store::{Model, ModelLoadError, ModelStore};
use crate::tokenizer::{Tokenizer, TokenizerOptions, Tokens};

/// Tokenisation, analysis and lexicon lookup over a set of loaded models.
#[derive(Debug, Default)]
pub struct Omorfi {
    store: ModelStore,
    analyser_options: AnalyserOptions,
    tokenizer_options: TokenizerOptions,
}

impl Omorfi {
    /// Handle with no models loaded and default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(analyser_options: AnalyserOptions, tokenizer_options: TokenizerOptions) -> Self {
        Self {
            store: ModelStore::new(),
            analyser_options,
            tokenizer_options,
        }
    }

    /// Load the model file at `path` for `role`, replacing any model already
    /// loaded for it. On error the previous model stays in place.
    pub fn load(&self, path: impl AsRef<Path>, role: Role) -> Result<(), ModelLoadError> {
        self.store.load(path, role).map(|_| ())
    }

    /// Register an in-memory transducer for `role`.
    pub fn register(&self, role: Role, transducer: Transducer) -> Result<(), ModelLoadError> {
        self.store.register(role, transducer).map(|_| ())
    }

    /// Unload the model for `role`. Returns whether one was loaded.
    pub fn unload(&self, role: Role) -> bool {
        self.store.unload(role).is_some()
    }

    pub fn model(&self, role: Role) -> Option<Arc<Model>> {
        self.store.get(role)
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    // -- Options --

    pub fn analyser_options(&self) -> &AnalyserOptions {
        &self.analyser_options
    }

    pub fn set_analyser_options(&mut self, options: AnalyserOptions) {
        self.analyser_options = options;
    }

    pub fn tokenizer_options(&self) -> &TokenizerOptions {
        &self.tokenizer_options
    }

    pub fn set_tokenizer_options(&mut self, options: TokenizerOptions) {
        self.tokenizer_options = options;
    }

    // -- Operations --

    pub fn analyser(&self) -> Analyser<'_> {
        Analyser::new(&self.store, self.analyser_options)
    }

    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::from_store(&self.store, self.tokenizer_options)
    }

    /// Analyses of `token`, best first. Empty when nothing is found.
    pub fn analyse(&self, token: &str) -> Vec<Analysis> {
        self.analyser().analyse(token)
    }

    /// Like [`Omorfi::analyse`], also reporting whether a traversal limit
    /// cut the lookup short.
    pub fn analyse_detailed(&self, token: &str) -> AnalysisOutcome {
        self.analyser().analyse_detailed(token)
    }

    /// Tokens of `text`, lazily.
    pub fn tokenise<'a>(&self, text: &'a str) -> Tokens<'a> {
        self.tokenizer().tokenize(text)
    }

    /// Whether `token` is in the lexicon of the analysis model.
    pub fn accept(&self, token: &str) -> bool {
        let analyser = self.analyser();
        LexiconChecker::new(&analyser).accept(token)
    }

    /// Tokenise `text` and analyse every token, lazily.
    pub fn analyse_text<'a>(&'a self, text: &'a str) -> impl Iterator<Item = AnalysisResult> + 'a {
        self.analyser().analyse_tokens(self.tokenise(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omorfi_fst::TransducerBuilder;

    fn omorfi() -> Omorfi {
        let omorfi = Omorfi::new();
        let mut b = TransducerBuilder::new();
        b.add_path("kissa", "kissa[UPOS=NOUN]", 0.0).unwrap();
        b.add_path("on", "olla[UPOS=AUX]", 0.0).unwrap();
        b.add_path(".", ".[UPOS=PUNCT]", 0.0).unwrap();
        omorfi.register(Role::Analysis, b.build().unwrap()).unwrap();

        let mut b = TransducerBuilder::new();
        b.add_path("xyz", "xyz[UPOS=NOUN][GUESS=NOUN]", 10.0).unwrap();
        omorfi.register(Role::Guesser, b.build().unwrap()).unwrap();
        omorfi
    }

    #[test]
    fn facade_operations() {
        let omorfi = omorfi();
        assert_eq!(omorfi.analyse("kissa")[0].output, "kissa[UPOS=NOUN]");
        assert!(omorfi.accept("kissa"));
        assert!(!omorfi.accept("xyz"));
        assert!(!omorfi.analyse("xyz").is_empty());
        assert!(!omorfi.accept("koira"));
        assert_eq!(omorfi.tokenise("Kissa on.").count(), 3);
    }

    #[test]
    fn analyse_text_pairs_tokens_with_results() {
        let omorfi = omorfi();
        let results: Vec<AnalysisResult> = omorfi.analyse_text("Kissa on xyz.").collect();
        let surfaces: Vec<&str> = results.iter().map(|r| r.token.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["Kissa", "on", "xyz", "."]);
        assert_eq!(
            results[0].best().map(|a| a.output.as_str()),
            Some("kissa[UPOS=NOUN][CASECHANGE=LOWERCASED]")
        );
        assert!(results[2].best().is_some_and(Analysis::is_guess));
        assert!(!results[3].is_empty());
    }

    #[test]
    fn unload_removes_capability() {
        let omorfi = omorfi();
        assert!(omorfi.unload(Role::Guesser));
        assert!(!omorfi.unload(Role::Guesser));
        assert!(omorfi.analyse("xyz").is_empty());
        assert!(omorfi.model(Role::Analysis).is_some());
    }

    #[test]
    fn options_are_applied() {
        let mut omorfi = omorfi();
        omorfi.set_analyser_options(AnalyserOptions {
            try_lowercase: false,
            try_detitlecase: false,
            ..AnalyserOptions::default()
        });
        assert!(omorfi.analyse("Kissa").is_empty());
        assert!(!omorfi.analyser_options().try_lowercase);
    }

    #[test]
    fn handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Omorfi>();
    }
}
