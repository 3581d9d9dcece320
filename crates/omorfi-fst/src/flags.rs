// Flag diacritic operations: P, N, C, U, R, D

use crate::FstError;
use hashbrown::HashMap;

/// The six flag diacritic operations of the HFST/Xerox convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FlagOp {
    /// Positive set: unconditionally set feature to value.
    P,
    /// Negative set: set feature to "anything but value".
    N,
    /// Clear: reset feature to neutral.
    C,
    /// Unification: set if neutral or negatively set to another value,
    /// pass if equal, fail otherwise.
    U,
    /// Require: fail unless the feature has the value (or any value).
    R,
    /// Disallow: fail if the feature has the value (or any value).
    D,
}

/// Value index meaning "no value given" (`@R.FEAT@`, `@D.FEAT@`, `@C.FEAT@`).
pub const FLAG_VALUE_NONE: u16 = 0;

/// Neutral feature state: the feature has not been set on this path.
pub const FLAG_STATE_NEUTRAL: i32 = 0;

/// A parsed flag diacritic with interned feature and value indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlagDiacritic {
    pub op: FlagOp,
    pub feature: u16,
    pub value: u16,
}

/// Outcome of testing a flag diacritic against the current path state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagCheckResult {
    /// The path may not continue through this transition.
    Reject,
    /// Allowed, flag state unchanged.
    Accept,
    /// Allowed; the feature takes the given state. Positive states are
    /// `+value`, negative sets are `-value`, neutral is 0.
    AcceptAndSet { feature: u16, state: i32 },
}

/// Check whether a flag diacritic transition is allowed given the current
/// state of its feature.
pub fn check_flag(flag: &FlagDiacritic, current: i32) -> FlagCheckResult {
    let positive = i32::from(flag.value);
    match flag.op {
        FlagOp::P => FlagCheckResult::AcceptAndSet {
            feature: flag.feature,
            state: positive,
        },
        FlagOp::N => FlagCheckResult::AcceptAndSet {
            feature: flag.feature,
            state: -positive,
        },
        FlagOp::C => FlagCheckResult::AcceptAndSet {
            feature: flag.feature,
            state: FLAG_STATE_NEUTRAL,
        },
        FlagOp::U => {
            if current == positive {
                FlagCheckResult::Accept
            } else if current == FLAG_STATE_NEUTRAL || (current < 0 && current != -positive) {
                FlagCheckResult::AcceptAndSet {
                    feature: flag.feature,
                    state: positive,
                }
            } else {
                FlagCheckResult::Reject
            }
        }
        FlagOp::R => {
            let ok = if flag.value == FLAG_VALUE_NONE {
                current != FLAG_STATE_NEUTRAL
            } else {
                current == positive
            };
            if ok {
                FlagCheckResult::Accept
            } else {
                FlagCheckResult::Reject
            }
        }
        FlagOp::D => {
            let blocked = if flag.value == FLAG_VALUE_NONE {
                current != FLAG_STATE_NEUTRAL
            } else {
                current == positive
            };
            if blocked {
                FlagCheckResult::Reject
            } else {
                FlagCheckResult::Accept
            }
        }
    }
}

/// Interns flag features and values across one symbol table.
#[derive(Debug, Clone)]
pub struct FlagParser {
    features: HashMap<String, u16>,
    values: HashMap<String, u16>,
}

impl Default for FlagParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagParser {
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert(String::new(), FLAG_VALUE_NONE);
        Self {
            features: HashMap::new(),
            values,
        }
    }

    /// Number of distinct features seen so far.
    pub fn feature_count(&self) -> u16 {
        self.features.len() as u16
    }

    /// Whether a symbol string has the `@X.…@` shape of a flag diacritic.
    pub fn is_flag_shaped(symbol: &str) -> bool {
        let bytes = symbol.as_bytes();
        bytes.len() > 4 && bytes[0] == b'@' && bytes[2] == b'.' && bytes[bytes.len() - 1] == b'@'
    }

    /// Parse `@OP.FEATURE@` or `@OP.FEATURE.VALUE@`.
    ///
    /// Returns `Ok(None)` for symbols that are not flag-shaped, so callers can
    /// treat them as ordinary symbols.
    pub fn parse(&mut self, symbol: &str) -> Result<Option<FlagDiacritic>, FstError> {
        if !Self::is_flag_shaped(symbol) {
            return Ok(None);
        }
        let bytes = symbol.as_bytes();
        let op = match bytes[1] {
            b'P' => FlagOp::P,
            b'N' => FlagOp::N,
            b'C' => FlagOp::C,
            b'U' => FlagOp::U,
            b'R' => FlagOp::R,
            b'D' => FlagOp::D,
            other => {
                return Err(FstError::InvalidFlagDiacritic(format!(
                    "unknown operation '{}' in {symbol:?}",
                    other as char,
                )));
            }
        };

        // symbol[3..len-1] is "FEATURE.VALUE" or "FEATURE"
        let inner = &symbol[3..symbol.len() - 1];
        let (feature_str, value_str) = match inner.find('.') {
            Some(dot) => (&inner[..dot], &inner[dot + 1..]),
            None => (inner, ""),
        };
        if feature_str.is_empty() {
            return Err(FstError::InvalidFlagDiacritic(format!(
                "missing feature in {symbol:?}"
            )));
        }
        if matches!(op, FlagOp::P | FlagOp::N | FlagOp::U) && value_str.is_empty() {
            return Err(FstError::InvalidFlagDiacritic(format!(
                "operation requires a value in {symbol:?}"
            )));
        }

        let feature = {
            let next = self.features.len() as u16;
            *self.features.entry(feature_str.to_string()).or_insert(next)
        };
        let value = {
            let next = self.values.len() as u16;
            *self.values.entry(value_str.to_string()).or_insert(next)
        };

        Ok(Some(FlagDiacritic { op, feature, value }))
    }
}
