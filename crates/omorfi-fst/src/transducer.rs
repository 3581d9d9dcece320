// In-memory transducer: state arena, per-state transition slices, builder.

use std::ops::Range;

use crate::config::LookupOptions;
use crate::lookup::{self, LookupResult};
use crate::symbols::SymbolTable;
use crate::transition::{FinalRecord, Transition, TransitionRecord};
use crate::{FstError, StateId, SymbolId, format};

/// One state of the arena.
///
/// The state's transitions occupy `first..end` of the shared transition
/// table: `first..consuming` are the non-consuming ones (epsilon and flag
/// input), `consuming..end` consume an input symbol and are sorted by it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct State {
    first: u32,
    consuming: u32,
    end: u32,
    final_weight: Option<f32>,
}

/// A loaded, validated, immutable weighted transducer.
///
/// Holds exactly one start state; every transition target and symbol id is
/// inside the arena and symbol table, and all weights are finite. Lookup
/// only needs `&self`, so one transducer can be shared across threads.
#[derive(Clone)]
pub struct Transducer {
    symbols: SymbolTable,
    states: Vec<State>,
    transitions: Vec<Transition>,
    start: StateId,
    alphabet_id: u32,
    /// Indexed by symbol id: whether some transition consumes the symbol.
    input_alphabet: Vec<bool>,
    /// Length in characters of the longest symbol in `input_alphabet`.
    max_input_chars: usize,
}

impl std::fmt::Debug for Transducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transducer")
            .field("state_count", &self.states.len())
            .field("transition_count", &self.transitions.len())
            .field("symbol_count", &self.symbols.len())
            .field("start", &self.start)
            .field("alphabet_id", &self.alphabet_id)
            .finish()
    }
}

fn check_weight(weight: f32, location: impl FnOnce() -> String) -> Result<(), FstError> {
    if weight.is_finite() {
        Ok(())
    } else {
        Err(FstError::NonFiniteWeight {
            weight,
            location: location(),
        })
    }
}

impl Transducer {
    /// Validate raw records and build the arena.
    ///
    /// Transition records may come in any order. Within a state, non-consuming
    /// transitions are placed first; consuming ones follow, sorted by input
    /// symbol so that [`Transducer::matching`] can binary-search them.
    pub fn from_records(
        symbols: SymbolTable,
        start: StateId,
        state_count: u32,
        records: &[TransitionRecord],
        finals: &[FinalRecord],
        alphabet_id: u32,
    ) -> Result<Self, FstError> {
        if state_count == 0 {
            return Err(FstError::NoStates);
        }
        // Every state is the start state or is named by some record.
        let limit = 2 * records.len() as u64 + finals.len() as u64 + 1;
        if u64::from(state_count) > limit {
            return Err(FstError::TooManyStates { state_count, limit });
        }
        let check_state = |state: u32| {
            if state < state_count {
                Ok(())
            } else {
                Err(FstError::StateOutOfRange { state, state_count })
            }
        };
        let symbol_count = symbols.len() as u32;
        let check_symbol = |symbol: u32| {
            if symbol < symbol_count {
                Ok(())
            } else {
                Err(FstError::SymbolOutOfRange {
                    symbol,
                    symbol_count,
                })
            }
        };

        check_state(start)?;
        for (i, r) in records.iter().enumerate() {
            check_state(r.source)?;
            check_state(r.target)?;
            check_symbol(r.input)?;
            check_symbol(r.output)?;
            check_weight(r.weight, || format!("transition {i}"))?;
        }

        let mut states = vec![State::default(); state_count as usize];
        for f in finals {
            check_state(f.state)?;
            check_weight(f.weight, || format!("final weight of state {}", f.state))?;
            let state = &mut states[f.state as usize];
            if state.final_weight.is_some() {
                return Err(FstError::DuplicateFinal(f.state));
            }
            state.final_weight = Some(f.weight);
        }

        let mut sorted = records.to_vec();
        sorted.sort_by_key(|r| {
            (
                r.source,
                symbols.is_consuming(r.input),
                r.input,
                r.output,
                r.target,
            )
        });

        let mut i = 0;
        for (source, state) in states.iter_mut().enumerate() {
            let source = source as u32;
            state.first = i as u32;
            while i < sorted.len() && sorted[i].source == source && !symbols.is_consuming(sorted[i].input)
            {
                i += 1;
            }
            state.consuming = i as u32;
            while i < sorted.len() && sorted[i].source == source {
                i += 1;
            }
            state.end = i as u32;
        }

        let mut input_alphabet = vec![false; symbols.len()];
        let mut max_input_chars = 0;
        for r in &sorted {
            if symbols.is_consuming(r.input) && !input_alphabet[r.input as usize] {
                input_alphabet[r.input as usize] = true;
                max_input_chars = max_input_chars.max(symbols.symbol(r.input).chars().count());
            }
        }

        let transitions = sorted
            .iter()
            .map(|r| Transition {
                input: r.input,
                output: r.output,
                target: r.target,
                weight: r.weight,
            })
            .collect();

        Ok(Self {
            symbols,
            states,
            transitions,
            start,
            alphabet_id,
            input_alphabet,
            max_input_chars,
        })
    }

    /// Decode a transducer from its binary form.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FstError> {
        format::decode(data)
    }

    /// Encode this transducer into its binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        format::encode(self)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    /// Alphabet id from the model header; 0 when unspecified.
    pub fn alphabet_id(&self) -> u32 {
        self.alphabet_id
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Whether some transition consumes `symbol` on its input side.
    pub fn is_input_symbol(&self, symbol: SymbolId) -> bool {
        self.input_alphabet.get(symbol as usize).copied().unwrap_or(false)
    }

    /// Split `input` into the symbols this transducer consumes, by greedy
    /// longest match. Symbols that only ever appear as outputs never match.
    /// Returns `None` if some position matches no input symbol.
    pub fn segment(&self, input: &str) -> Option<Vec<SymbolId>> {
        self.symbols
            .segment_by(input, self.max_input_chars, |id| self.input_alphabet[id as usize])
    }

    /// Final weight of `state`, or `None` if it is not accepting.
    pub fn final_weight(&self, state: StateId) -> Option<f32> {
        self.states.get(state as usize).and_then(|s| s.final_weight)
    }

    /// All transitions leaving `state`.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        let s = &self.states[state as usize];
        &self.transitions[s.first as usize..s.end as usize]
    }

    /// Transitions leaving `state` that consume no input.
    pub fn non_consuming(&self, state: StateId) -> &[Transition] {
        &self.transitions[self.non_consuming_range(state)]
    }

    /// Transitions leaving `state` that consume `symbol`.
    pub fn matching(&self, state: StateId, symbol: SymbolId) -> &[Transition] {
        &self.transitions[self.matching_range(state, symbol)]
    }

    pub(crate) fn transition(&self, index: usize) -> &Transition {
        &self.transitions[index]
    }

    pub(crate) fn non_consuming_range(&self, state: StateId) -> Range<usize> {
        let s = &self.states[state as usize];
        s.first as usize..s.consuming as usize
    }

    pub(crate) fn matching_range(&self, state: StateId, symbol: SymbolId) -> Range<usize> {
        let s = &self.states[state as usize];
        let (lo, hi) = (s.consuming as usize, s.end as usize);
        let slice = &self.transitions[lo..hi];
        let from = slice.partition_point(|t| t.input < symbol);
        let to = slice.partition_point(|t| t.input <= symbol);
        lo + from..lo + to
    }

    /// Transition records in arena order, for encoding.
    pub fn transition_records(&self) -> Vec<TransitionRecord> {
        let mut records = Vec::with_capacity(self.transitions.len());
        for (source, s) in self.states.iter().enumerate() {
            records.extend(
                self.transitions[s.first as usize..s.end as usize]
                    .iter()
                    .map(|t| t.to_record(source as StateId)),
            );
        }
        records
    }

    /// Final records in state order, for encoding.
    pub fn final_records(&self) -> Vec<FinalRecord> {
        self.states
            .iter()
            .enumerate()
            .filter_map(|(state, s)| {
                s.final_weight.map(|weight| FinalRecord {
                    state: state as u32,
                    weight,
                })
            })
            .collect()
    }

    /// Look up `input` and return its ranked readings.
    pub fn lookup(&self, input: &str, options: &LookupOptions) -> LookupResult {
        lookup::lookup(self, input, options)
    }
}

/// Split a string into builder symbols: a bracketed tag such as `[N]` or
/// `{MB}`, or a flag diacritic such as `@P.CASE.NOM@`, is one symbol; any
/// other character is a symbol of its own.
fn split_symbols(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        let close = match c {
            '[' => Some(']'),
            '{' => Some('}'),
            '@' => Some('@'),
            _ => None,
        };
        let len = close
            .and_then(|close| rest[1..].find(close).map(|i| i + 2))
            .filter(|&len| c != '@' || crate::flags::FlagParser::is_flag_shaped(&rest[..len]))
            .unwrap_or(c.len_utf8());
        out.push(&rest[..len]);
        rest = &rest[len..];
    }
    out
}

/// Programmatic construction of transducers.
///
/// Used by embedders that compile tiny models in code, and by tests and
/// benchmarks. State 0 exists from the start and is the start state.
#[derive(Debug, Clone)]
pub struct TransducerBuilder {
    symbols: SymbolTable,
    records: Vec<TransitionRecord>,
    finals: Vec<Option<f32>>,
    start: StateId,
    alphabet_id: u32,
}

impl Default for TransducerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransducerBuilder {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            records: Vec::new(),
            finals: vec![None],
            start: 0,
            alphabet_id: 0,
        }
    }

    pub fn with_alphabet_id(mut self, alphabet_id: u32) -> Self {
        self.alphabet_id = alphabet_id;
        self
    }

    /// Add a fresh, non-accepting state.
    pub fn add_state(&mut self) -> StateId {
        self.finals.push(None);
        (self.finals.len() - 1) as StateId
    }

    pub fn set_start(&mut self, state: StateId) -> Result<(), FstError> {
        self.check_state(state)?;
        self.start = state;
        Ok(())
    }

    /// Add an arc. `input` and `output` are single symbols; the empty string
    /// is epsilon.
    pub fn add_transition(
        &mut self,
        source: StateId,
        input: &str,
        output: &str,
        weight: f32,
        target: StateId,
    ) -> Result<(), FstError> {
        self.check_state(source)?;
        self.check_state(target)?;
        check_weight(weight, || format!("transition from state {source}"))?;
        let input = self.symbols.intern(input)?;
        let output = self.symbols.intern(output)?;
        self.records.push(TransitionRecord {
            source,
            target,
            input,
            output,
            weight,
        });
        Ok(())
    }

    /// Make `state` accepting with the given final weight, replacing any
    /// earlier one.
    pub fn set_final(&mut self, state: StateId, weight: f32) -> Result<(), FstError> {
        self.check_state(state)?;
        check_weight(weight, || format!("final weight of state {state}"))?;
        self.finals[state as usize] = Some(weight);
        Ok(())
    }

    /// Add a fresh path from the start state mapping `input` to `output`.
    ///
    /// Both sides are split into symbols (bracketed tags and flag diacritics
    /// stay whole) and paired up one by one, padding the shorter side with
    /// epsilon. The weight goes on the final state, which is returned.
    pub fn add_path(&mut self, input: &str, output: &str, weight: f32) -> Result<StateId, FstError> {
        let inputs = split_symbols(input);
        let outputs = split_symbols(output);
        let len = inputs.len().max(outputs.len());

        let mut state = self.start;
        for i in 0..len {
            let next = self.add_state();
            let sym_in = inputs.get(i).copied().unwrap_or("");
            let sym_out = outputs.get(i).copied().unwrap_or("");
            self.add_transition(state, sym_in, sym_out, 0.0, next)?;
            state = next;
        }
        self.set_final(state, weight)?;
        Ok(state)
    }

    /// Validate and build the transducer.
    pub fn build(self) -> Result<Transducer, FstError> {
        let finals: Vec<FinalRecord> = self
            .finals
            .iter()
            .enumerate()
            .filter_map(|(state, w)| {
                w.map(|weight| FinalRecord {
                    state: state as u32,
                    weight,
                })
            })
            .collect();
        Transducer::from_records(
            self.symbols,
            self.start,
            self.finals.len() as u32,
            &self.records,
            &finals,
            self.alphabet_id,
        )
    }

    fn check_state(&self, state: StateId) -> Result<(), FstError> {
        if (state as usize) < self.finals.len() {
            Ok(())
        } else {
            Err(FstError::StateOutOfRange {
                state,
                state_count: self.finals.len() as u32,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tags_and_flags() {
        assert_eq!(split_symbols("talo[N]"), vec!["t", "a", "l", "o", "[N]"]);
        assert_eq!(split_symbols("a{MB}b"), vec!["a", "{MB}", "b"]);
        assert_eq!(split_symbols("@P.X.Y@a"), vec!["@P.X.Y@", "a"]);
        assert_eq!(split_symbols("@a@"), vec!["@", "a", "@"]);
        assert_eq!(split_symbols("[open"), vec!["[", "o", "p", "e", "n"]);
        assert_eq!(split_symbols("\u{00e4}"), vec!["\u{00e4}"]);
    }

    #[test]
    fn transitions_are_grouped_and_sorted() {
        let mut b = TransducerBuilder::new();
        let s1 = b.add_state();
        b.add_transition(0, "b", "b", 0.0, s1).unwrap();
        b.add_transition(0, "a", "a", 0.0, s1).unwrap();
        b.add_transition(0, "", "x", 0.0, s1).unwrap();
        b.add_transition(0, "@P.F.V@", "@P.F.V@", 0.0, s1).unwrap();
        b.add_transition(0, "a", "c", 0.0, s1).unwrap();
        let t = b.build().unwrap();

        assert_eq!(t.transitions(0).len(), 5);
        assert_eq!(t.non_consuming(0).len(), 2);
        let a = t.symbols().id_of("a").unwrap();
        let outputs: Vec<&str> = t
            .matching(0, a)
            .iter()
            .map(|tr| t.symbols().symbol(tr.output))
            .collect();
        assert_eq!(outputs, vec!["a", "c"]);
        assert!(t.matching(0, t.symbols().id_of("x").unwrap()).is_empty());
        assert!(t.transitions(s1).is_empty());
    }

    #[test]
    fn builder_rejects_bad_input() {
        let mut b = TransducerBuilder::new();
        assert!(matches!(
            b.add_transition(0, "a", "a", 0.0, 3),
            Err(FstError::StateOutOfRange { state: 3, .. })
        ));
        assert!(matches!(
            b.set_final(0, f32::NAN),
            Err(FstError::NonFiniteWeight { .. })
        ));
        assert!(b.set_start(1).is_err());
    }

    #[test]
    fn from_records_validation() {
        let symbols = SymbolTable::from_strings(["", "a"]).unwrap();
        let arc = |target, input, weight| TransitionRecord {
            source: 0,
            target,
            input,
            output: input,
            weight,
        };

        let err = Transducer::from_records(symbols.clone(), 0, 0, &[], &[], 0).unwrap_err();
        assert!(matches!(err, FstError::NoStates));

        let err =
            Transducer::from_records(symbols.clone(), 0, 1, &[arc(0, 5, 0.0)], &[], 0).unwrap_err();
        assert!(matches!(err, FstError::SymbolOutOfRange { symbol: 5, .. }));

        let err = Transducer::from_records(symbols.clone(), 0, 1, &[arc(0, 1, f32::INFINITY)], &[], 0)
            .unwrap_err();
        assert!(matches!(err, FstError::NonFiniteWeight { .. }));

        let finals = [
            FinalRecord { state: 0, weight: 0.0 },
            FinalRecord { state: 0, weight: 1.0 },
        ];
        let err = Transducer::from_records(symbols.clone(), 0, 1, &[], &finals, 0).unwrap_err();
        assert!(matches!(err, FstError::DuplicateFinal(0)));

        let err = Transducer::from_records(symbols.clone(), 2, 1, &[], &[], 0).unwrap_err();
        assert!(matches!(err, FstError::StateOutOfRange { state: 2, .. }));

        let err = Transducer::from_records(symbols, 0, 5, &[arc(1, 1, 0.0)], &[], 0).unwrap_err();
        assert!(matches!(
            err,
            FstError::TooManyStates {
                state_count: 5,
                limit: 3
            }
        ));
    }

    #[test]
    fn input_alphabet_is_what_transitions_consume() {
        let mut b = TransducerBuilder::new();
        b.add_path("ab", "x[N]", 0.0).unwrap();
        let t = b.build().unwrap();
        let id = |s: &str| t.symbols().id_of(s).unwrap();

        assert!(t.is_input_symbol(id("a")));
        assert!(t.is_input_symbol(id("b")));
        assert!(!t.is_input_symbol(id("x")));
        assert!(!t.is_input_symbol(id("[N]")));
        assert!(!t.is_input_symbol(crate::EPSILON));
        assert_eq!(t.segment("ab"), Some(vec![id("a"), id("b")]));
        assert_eq!(t.segment("x"), None);
    }

    #[test]
    fn add_path_pads_with_epsilon() {
        let mut b = TransducerBuilder::new();
        let end = b.add_path("ab", "x", 0.5).unwrap();
        let t = b.build().unwrap();
        assert_eq!(t.state_count(), 3);
        assert_eq!(t.final_weight(end), Some(0.5));
        let last = &t.transitions(1)[0];
        assert_eq!(t.symbols().symbol(last.output), "");
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transducer>();
    }
}
