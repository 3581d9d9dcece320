//! Weighted finite-state transducer engine for omorfi models.
//!
//! Loads compiled transducers from their binary form into an in-memory state
//! arena and performs weighted lookup over them. Weights live in the tropical
//! semiring: they add up along a path and lower totals are preferred.
//!
//! # Architecture
//!
//! - [`format`] -- Binary header, section layout, encode/decode
//! - [`transition`] -- Fixed-size on-disk record layouts
//! - [`symbols`] -- Symbol table, symbol classes and input segmentation
//! - [`flags`] -- Flag diacritic operations (P, N, C, U, R, D)
//! - [`transducer`] -- State arena, transition slices and the builder
//! - [`config`] -- Lookup options and the explicit DFS stack
//! - [`lookup`] -- Weighted traversal producing ranked readings

pub mod config;
pub mod flags;
pub mod format;
pub mod lookup;
pub mod symbols;
pub mod transducer;
pub mod transition;

pub use config::LookupOptions;
pub use lookup::{LookupResult, Reading, TraversalLimitExceeded};
pub use symbols::{SymbolKind, SymbolTable};
pub use transducer::{Transducer, TransducerBuilder};

/// Index into a transducer's symbol table.
pub type SymbolId = u32;

/// Index into a transducer's state arena.
pub type StateId = u32;

/// Symbol id of epsilon (the empty string) in every symbol table.
pub const EPSILON: SymbolId = 0;

/// Default number of transition pushes one lookup may perform before it is
/// cut short.
pub const MAX_STEP_COUNT: u32 = 100_000;

/// Error type for transducer parsing and validation.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    #[error("invalid magic number in transducer header")]
    InvalidMagic,
    #[error("unsupported format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },
    #[error("data too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },
    #[error("trailing data: expected {expected} bytes, got {actual}")]
    TrailingData { expected: usize, actual: usize },
    #[error("invalid symbol table: {0}")]
    InvalidSymbolTable(String),
    #[error("invalid flag diacritic: {0}")]
    InvalidFlagDiacritic(String),
    #[error("state {state} out of range ({state_count} states)")]
    StateOutOfRange { state: u32, state_count: u32 },
    #[error("symbol {symbol} out of range ({symbol_count} symbols)")]
    SymbolOutOfRange { symbol: u32, symbol_count: u32 },
    #[error("non-finite weight {weight} in {location}")]
    NonFiniteWeight { weight: f32, location: String },
    #[error("transducer has no states")]
    NoStates,
    #[error("{state_count} states declared, but the records can touch at most {limit}")]
    TooManyStates { state_count: u32, limit: u64 },
    #[error("state {0} has more than one final weight")]
    DuplicateFinal(u32),
}
