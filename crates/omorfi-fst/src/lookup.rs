// Weighted lookup: depth-first traversal with an explicit stack.

use hashbrown::HashMap;

use crate::config::{Frame, LookupOptions, Traversal};
use crate::flags::{self, FlagCheckResult};
use crate::symbols::SymbolKind;
use crate::transducer::Transducer;
use crate::{StateId, SymbolId};

/// One accepting path's output and total weight (path weight plus the final
/// weight of the state it ends in).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    pub output: String,
    pub weight: f32,
}

/// Which limit cut a lookup short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TraversalLimitExceeded {
    #[error("reading limit reached")]
    ReadingCap,
    #[error("step budget exhausted")]
    StepBudget,
    #[error("path depth limit reached")]
    DepthBudget,
}

/// Readings of one lookup, best first.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupResult {
    /// Distinct outputs sorted by ascending weight, ties by output string.
    pub readings: Vec<Reading>,
    /// Set when a limit stopped the search; `readings` may be incomplete.
    pub truncated: Option<TraversalLimitExceeded>,
}

impl LookupResult {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated.is_some()
    }
}

/// Distinct outputs found so far with their best weights.
struct Collector {
    best: HashMap<String, f32>,
    min_weight: Option<f32>,
}

impl Collector {
    fn new() -> Self {
        Self {
            best: HashMap::new(),
            min_weight: None,
        }
    }

    /// Record a reading. Returns `false` if it is a new output that does not
    /// fit under `cap`.
    fn add(&mut self, output: &str, weight: f32, cap: usize) -> bool {
        match self.best.get_mut(output) {
            Some(w) => {
                if weight < *w {
                    *w = weight;
                }
            }
            None => {
                if self.best.len() >= cap {
                    return false;
                }
                self.best.insert(output.to_string(), weight);
            }
        }
        self.min_weight = Some(self.min_weight.map_or(weight, |m| m.min(weight)));
        true
    }

    fn into_sorted(self) -> Vec<Reading> {
        let mut readings: Vec<Reading> = self
            .best
            .into_iter()
            .map(|(output, weight)| Reading { output, weight })
            .collect();
        readings.sort_by(|a, b| {
            a.weight
                .total_cmp(&b.weight)
                .then_with(|| a.output.cmp(&b.output))
        });
        readings
    }
}

fn frame_for(
    transducer: &Transducer,
    input: &[SymbolId],
    state: StateId,
    position: usize,
    weight: f32,
    output_len: usize,
) -> Frame {
    let epsilon = transducer.non_consuming_range(state);
    let matching = match input.get(position) {
        Some(&symbol) => transducer.matching_range(state, symbol),
        None => epsilon.end..epsilon.end,
    };
    Frame::new(state, position, weight, output_len, epsilon, matching)
}

/// Look up `input` in `transducer`.
///
/// The input is segmented by longest match over the symbols the transducer
/// consumes; if some part of it is not in that alphabet the result is empty. The search then follows
/// non-consuming transitions before consuming ones, never revisits a
/// `(state, position)` pair already on the current path (so epsilon cycles
/// terminate), and collects one reading per distinct output with its lowest
/// weight.
pub fn lookup(transducer: &Transducer, input: &str, options: &LookupOptions) -> LookupResult {
    if input.is_empty() {
        let readings = transducer
            .final_weight(transducer.start())
            .map(|weight| Reading {
                output: String::new(),
                weight,
            })
            .into_iter()
            .collect();
        return LookupResult {
            readings,
            truncated: None,
        };
    }

    let symbols = transducer.symbols();
    let Some(input_symbols) = transducer.segment(input) else {
        return LookupResult::default();
    };
    let input_len = input_symbols.len();

    let mut collector = Collector::new();
    let mut truncated = None;
    let mut t = Traversal::new(symbols.flag_feature_count());
    let start = frame_for(transducer, &input_symbols, transducer.start(), 0, 0.0, 0);
    t.push(start);

    'search: while let Some(depth) = t.frames.len().checked_sub(1) {
        let Some(index) = t.frames[depth].next_transition() else {
            t.pop();
            continue;
        };
        let parent = &t.frames[depth];
        let (parent_position, parent_weight, parent_output_len) =
            (parent.position, parent.weight, parent.output_len);
        let transition = transducer.transition(index);

        let position = if symbols.is_consuming(transition.input) {
            parent_position + 1
        } else {
            parent_position
        };
        if t.on_path.contains(&(transition.target, position)) {
            continue;
        }
        if depth + 1 > options.max_depth {
            truncated.get_or_insert(TraversalLimitExceeded::DepthBudget);
            continue;
        }
        let weight = parent_weight + transition.weight;
        if let (Some(margin), Some(best)) = (options.prune_margin, collector.min_weight) {
            if weight > best + margin {
                continue;
            }
        }

        let flag_update = match symbols.kind(transition.input) {
            SymbolKind::Flag(flag) => {
                let current = t.flag_row(depth)[flag.feature as usize];
                match flags::check_flag(&flag, current) {
                    FlagCheckResult::Reject => continue,
                    FlagCheckResult::Accept => None,
                    FlagCheckResult::AcceptAndSet { feature, state } => Some((feature, state)),
                }
            }
            SymbolKind::Epsilon | SymbolKind::Ordinary => None,
        };

        if t.steps >= options.max_steps {
            truncated = Some(TraversalLimitExceeded::StepBudget);
            break 'search;
        }
        t.steps += 1;

        t.output.truncate(parent_output_len);
        t.output.push_str(symbols.output_str(transition.output));
        t.push_flag_row(depth);
        if let Some((feature, state)) = flag_update {
            let row = (depth + 1) * t.feature_count + feature as usize;
            t.flag_rows[row] = state;
        }

        let target = transition.target;
        if position == input_len {
            if let Some(final_weight) = transducer.final_weight(target) {
                if !collector.add(&t.output, weight + final_weight, options.max_readings) {
                    truncated = Some(TraversalLimitExceeded::ReadingCap);
                    break 'search;
                }
            }
        }

        let child = frame_for(
            transducer,
            &input_symbols,
            target,
            position,
            weight,
            t.output.len(),
        );
        t.push(child);
    }

    if let Some(limit) = truncated {
        log::debug!("lookup of {input:?} truncated: {limit}");
    }

    LookupResult {
        readings: collector.into_sorted(),
        truncated,
    }
}
