//! Shared types for omorfi morphological analysis.
//!
//! - [`role`] -- the functional role a loaded model plays
//! - [`token`] -- tokens of running text
//! - [`analysis`] -- readings tagged with their origin, per-token results
//! - [`character`] -- character classification for rule-based tokenizing
//! - [`case`] -- the recasings tried during analysis

pub mod analysis;
pub mod case;
pub mod character;
pub mod role;
pub mod token;

pub use analysis::{Analysis, AnalysisResult};
pub use role::Role;
pub use token::{Token, TokenKind};
