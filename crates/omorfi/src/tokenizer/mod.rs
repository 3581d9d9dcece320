// Tokenizer: splits running text into an ordered sequence of tokens.
//
// Text is handled one whitespace-delimited chunk at a time. With a
// tokenizer model, a chunk is looked up and the best reading's output is
// split on whitespace; the model may normalize surfaces, so tokens are not
// guaranteed to be slices of the input. Chunks the model has no reading for,
// and all chunks when no model is loaded, go through the rules in `rules`.

pub mod rules;

use std::collections::VecDeque;
use std::sync::Arc;

use omorfi_core::character::is_whitespace;
use omorfi_core::{Role, Token};
use omorfi_fst::LookupOptions;

use crate::store::{Model, ModelStore};

/// Tokenizer options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TokenizerOptions {
    /// Limits for tokenizer-model lookups.
    pub lookup: LookupOptions,
}

/// Text tokenizer, optionally backed by a [`Role::Tokenizer`] model.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    model: Option<Arc<Model>>,
    options: TokenizerOptions,
}

impl Tokenizer {
    /// Rule-based tokenizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizer backed by `model`.
    pub fn with_model(model: Arc<Model>, options: TokenizerOptions) -> Self {
        Self {
            model: Some(model),
            options,
        }
    }

    /// Tokenizer using whatever tokenizer model `store` holds right now.
    pub fn from_store(store: &ModelStore, options: TokenizerOptions) -> Self {
        Self {
            model: store.get(Role::Tokenizer),
            options,
        }
    }

    /// Whether a tokenizer model backs this tokenizer.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Tokenize `text` lazily.
    ///
    /// Each call starts from scratch: tokenizing the same text twice gives
    /// the same sequence. Empty or whitespace-only text yields nothing.
    pub fn tokenize<'a>(&self, text: &'a str) -> Tokens<'a> {
        Tokens {
            rest: text,
            model: self.model.clone(),
            lookup: self.options.lookup,
            pending: VecDeque::new(),
            position: 0,
        }
    }
}

/// Iterator over the tokens of one text. See [`Tokenizer::tokenize`].
#[derive(Debug)]
pub struct Tokens<'a> {
    rest: &'a str,
    model: Option<Arc<Model>>,
    lookup: LookupOptions,
    pending: VecDeque<Token>,
    position: usize,
}

impl Tokens<'_> {
    /// Queue the tokens of one whitespace-free chunk.
    fn fill(&mut self, chunk: &str) {
        if let Some(model) = &self.model {
            let result = model.transducer().lookup(chunk, &self.lookup);
            if let Some(best) = result.readings.first() {
                let before = self.pending.len();
                self.pending.extend(
                    best.output
                        .split(is_whitespace)
                        .filter(|piece| !piece.is_empty())
                        .map(|piece| Token::classified(piece, 0)),
                );
                if self.pending.len() > before {
                    return;
                }
            }
            log::trace!("no tokenizer reading for {chunk:?}, using rules");
        }
        self.pending.extend(
            rules::split(chunk)
                .into_iter()
                .map(|(kind, surface)| Token::new(kind, surface, 0)),
        );
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(mut token) = self.pending.pop_front() {
                token.position = self.position;
                self.position += 1;
                return Some(token);
            }

            let text = self.rest.trim_start_matches(is_whitespace);
            if text.is_empty() {
                self.rest = text;
                return None;
            }
            let end = text.find(is_whitespace).unwrap_or(text.len());
            let (chunk, rest) = text.split_at(end);
            self.rest = rest;
            self.fill(chunk);
        }
    }
}

impl std::iter::FusedIterator for Tokens<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use omorfi_core::TokenKind;
    use omorfi_fst::TransducerBuilder;

    fn surfaces(tokens: Tokens<'_>) -> Vec<String> {
        tokens.map(|t| t.surface).collect()
    }

    fn tokenizer_model() -> Arc<Model> {
        let store = ModelStore::new();
        let mut b = TransducerBuilder::new();
        // "ettei" is split into two tokens, "jne." is kept whole
        b.add_path("ettei", "ett ei", 0.0).unwrap();
        b.add_path("jne.", "jne.", 0.0).unwrap();
        b.add_path("talo", "talo", 1.0).unwrap();
        b.add_path("talo", "ta lo", 2.0).unwrap();
        b.add_path("tyhja", "", 0.0).unwrap();
        store.register(Role::Tokenizer, b.build().unwrap()).unwrap()
    }

    #[test]
    fn empty_and_whitespace_text() {
        let tokenizer = Tokenizer::new();
        assert_eq!(tokenizer.tokenize("").count(), 0);
        assert_eq!(tokenizer.tokenize(" \t\n\u{00A0}").count(), 0);
    }

    #[test]
    fn rules_without_model() {
        let tokenizer = Tokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("Kissa istui, ja  nukkui.").collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(texts, vec!["Kissa", "istui", ",", "ja", "nukkui", "."]);
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
    }

    #[test]
    fn repeated_surfaces_keep_order() {
        let tokenizer = Tokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("on on on").collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens.iter().all(|t| t.surface == "on"));
        assert_eq!(tokens[2].position, 2);
    }

    #[test]
    fn tokenizing_twice_is_identical() {
        let tokenizer = Tokenizer::with_model(tokenizer_model(), TokenizerOptions::default());
        let text = "ettei talo, jne. kissa";
        let first: Vec<Token> = tokenizer.tokenize(text).collect();
        let second: Vec<Token> = tokenizer.tokenize(text).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn model_output_is_split_on_whitespace() {
        let tokenizer = Tokenizer::with_model(tokenizer_model(), TokenizerOptions::default());
        assert_eq!(
            surfaces(tokenizer.tokenize("ettei talo jne.")),
            vec!["ett", "ei", "talo", "jne."]
        );
    }

    #[test]
    fn chunks_unknown_to_the_model_use_rules() {
        let tokenizer = Tokenizer::with_model(tokenizer_model(), TokenizerOptions::default());
        assert!(tokenizer.has_model());
        assert_eq!(
            surfaces(tokenizer.tokenize("kissa, tyhja")),
            vec!["kissa", ",", "tyhja"]
        );
    }

    #[test]
    fn from_store_picks_up_tokenizer_role() {
        let store = ModelStore::new();
        assert!(!Tokenizer::from_store(&store, TokenizerOptions::default()).has_model());
        let mut b = TransducerBuilder::new();
        b.add_path("ab", "a b", 0.0).unwrap();
        store.register(Role::Tokenizer, b.build().unwrap()).unwrap();
        let tokenizer = Tokenizer::from_store(&store, TokenizerOptions::default());
        assert_eq!(surfaces(tokenizer.tokenize("ab")), vec!["a", "b"]);
    }
}
