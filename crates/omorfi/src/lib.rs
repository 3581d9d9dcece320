//! Tokenisation, morphological analysis and lexicon lookup over weighted
//! finite-state models.
//!
//! Models are compiled elsewhere and handed over as files together with the
//! [`Role`] they play. The pipeline is
//! text -> [`Tokenizer`] -> tokens -> [`Analyser`] -> ranked analyses per
//! token, with [`LexiconChecker`] reducing an analysis to a yes/no answer.
//!
//! ```no_run
//! use omorfi::{Omorfi, Role};
//!
//! let omorfi = Omorfi::new();
//! omorfi.load("omorfi.describe.bin", Role::Analysis)?;
//! for result in omorfi.analyse_text("Kissa istui matolla.") {
//!     println!("{}: {:?}", result.token.surface, result.best());
//! }
//! # Ok::<(), omorfi::ModelLoadError>(())
//! ```
//!
//! The crate never installs a logger; it reports model loads, rejections and
//! truncated lookups through the `log` facade.

pub mod analyser;
pub mod handle;
pub mod lexicon;
pub mod store;
pub mod tokenizer;

pub use analyser::{Analyse, Analyser, AnalyserOptions, AnalysisOutcome};
pub use handle::Omorfi;
pub use lexicon::LexiconChecker;
pub use omorfi_core::{Analysis, AnalysisResult, Role, Token, TokenKind};
pub use omorfi_fst::{LookupOptions, TraversalLimitExceeded};
pub use store::{Model, ModelLoadError, ModelStore};
pub use tokenizer::{Tokenizer, TokenizerOptions, Tokens};
