// Symbol table: id <-> string mapping, symbol classes, input segmentation.

use crate::flags::{FlagDiacritic, FlagParser};
use crate::{EPSILON, FstError, SymbolId};
use hashbrown::HashMap;

/// Largest number of symbols the on-disk table can hold (`u16` count).
pub const MAX_SYMBOLS: usize = u16::MAX as usize;

/// HFST's spelled-out epsilon.
const HFST_EPSILON: &str = "@_EPSILON_SYMBOL_@";

/// How the traversal treats a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Consumes no input, emits nothing.
    Epsilon,
    /// Consumes no input, emits nothing, constrains the path.
    Flag(FlagDiacritic),
    /// Consumes/emits its string.
    Ordinary,
}

/// The alphabet of one transducer.
///
/// Id 0 is always epsilon. Symbol strings are unique; a multi-character
/// string such as `[POS=NOUN]` or `{MB}` is a single symbol.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    strings: Vec<String>,
    kinds: Vec<SymbolKind>,
    index: HashMap<String, SymbolId>,
    /// Length in characters of the longest ordinary symbol.
    max_input_chars: usize,
    flags: FlagParser,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table containing only epsilon.
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), EPSILON);
        Self {
            strings: vec![String::new()],
            kinds: vec![SymbolKind::Epsilon],
            index,
            max_input_chars: 0,
            flags: FlagParser::new(),
        }
    }

    /// Build a table from symbol strings in id order.
    ///
    /// The first string must be empty (epsilon) and no string may repeat.
    pub fn from_strings<I, S>(symbols: I) -> Result<Self, FstError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut iter = symbols.into_iter();
        match iter.next() {
            Some(first) if first.as_ref().is_empty() => {}
            Some(first) => {
                return Err(FstError::InvalidSymbolTable(format!(
                    "symbol 0 must be epsilon, found {:?}",
                    first.as_ref()
                )));
            }
            None => {
                return Err(FstError::InvalidSymbolTable(
                    "empty symbol table".to_string(),
                ));
            }
        }

        let mut table = Self::new();
        for symbol in iter {
            let symbol = symbol.as_ref();
            if table.index.contains_key(symbol) {
                return Err(FstError::InvalidSymbolTable(format!(
                    "duplicate symbol {symbol:?}"
                )));
            }
            table.intern(symbol)?;
        }
        Ok(table)
    }

    /// Return the id of `symbol`, adding it to the table if needed.
    pub fn intern(&mut self, symbol: &str) -> Result<SymbolId, FstError> {
        if let Some(&id) = self.index.get(symbol) {
            return Ok(id);
        }
        if self.strings.len() >= MAX_SYMBOLS {
            return Err(FstError::InvalidSymbolTable(format!(
                "more than {MAX_SYMBOLS} symbols"
            )));
        }
        if symbol.contains('\0') {
            return Err(FstError::InvalidSymbolTable(format!(
                "symbol {symbol:?} contains NUL"
            )));
        }

        let kind = if symbol == HFST_EPSILON {
            SymbolKind::Epsilon
        } else if let Some(flag) = self.flags.parse(symbol)? {
            SymbolKind::Flag(flag)
        } else {
            self.max_input_chars = self.max_input_chars.max(symbol.chars().count());
            SymbolKind::Ordinary
        };

        let id = self.strings.len() as SymbolId;
        self.strings.push(symbol.to_string());
        self.kinds.push(kind);
        self.index.insert(symbol.to_string(), id);
        Ok(id)
    }

    /// Parse the table from binary data at `offset`: a `u16` count followed
    /// by that many NUL-terminated UTF-8 strings.
    ///
    /// Returns the table and the offset just past its last terminator.
    pub fn parse(data: &[u8], offset: usize) -> Result<(Self, usize), FstError> {
        if offset + 2 > data.len() {
            return Err(FstError::TooShort {
                expected: offset + 2,
                actual: data.len(),
            });
        }

        let symbol_count = u16::from_le_bytes([data[offset], data[offset + 1]]);
        let mut pos = offset + 2;
        let mut strings = Vec::with_capacity(symbol_count as usize);

        for i in 0..symbol_count {
            let start = pos;
            while pos < data.len() && data[pos] != 0 {
                pos += 1;
            }
            if pos >= data.len() {
                return Err(FstError::InvalidSymbolTable(
                    "unterminated symbol string".to_string(),
                ));
            }
            let symbol = std::str::from_utf8(&data[start..pos]).map_err(|_| {
                FstError::InvalidSymbolTable(format!("invalid UTF-8 in symbol {i}"))
            })?;
            strings.push(symbol);
            pos += 1; // skip NUL
        }

        Ok((Self::from_strings(strings)?, pos))
    }

    /// Append the binary form of this table to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        // intern() caps the table at MAX_SYMBOLS, so the count fits
        buf.extend_from_slice(&(self.strings.len() as u16).to_le_bytes());
        for s in &self.strings {
            buf.extend_from_slice(s.as_bytes());
            buf.push(0);
        }
    }

    /// Number of symbols, epsilon included.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// A table always holds epsilon, so this is never true.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// String of a symbol. Panics on an id outside the table.
    pub fn symbol(&self, id: SymbolId) -> &str {
        &self.strings[id as usize]
    }

    /// Class of a symbol. Panics on an id outside the table.
    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        self.kinds[id as usize]
    }

    /// Whether traversing this symbol on the input side consumes input.
    #[inline]
    pub fn is_consuming(&self, id: SymbolId) -> bool {
        matches!(self.kinds[id as usize], SymbolKind::Ordinary)
    }

    /// What traversing this symbol on the output side appends to the output.
    #[inline]
    pub fn output_str(&self, id: SymbolId) -> &str {
        match self.kinds[id as usize] {
            SymbolKind::Ordinary => &self.strings[id as usize],
            SymbolKind::Epsilon | SymbolKind::Flag(_) => "",
        }
    }

    /// Look up a symbol id by string.
    pub fn id_of(&self, symbol: &str) -> Option<SymbolId> {
        self.index.get(symbol).copied()
    }

    /// Number of distinct flag diacritic features.
    pub fn flag_feature_count(&self) -> u16 {
        self.flags.feature_count()
    }

    /// Iterate over `(id, string)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (i as SymbolId, s.as_str()))
    }

    /// Split `input` into ordinary symbols by greedy longest match.
    ///
    /// At each position the longest symbol string that matches is taken, so
    /// a multi-character symbol wins over its single-character prefix.
    /// Returns `None` if some position matches no symbol.
    pub fn segment(&self, input: &str) -> Option<Vec<SymbolId>> {
        self.segment_by(input, self.max_input_chars, |id| self.is_consuming(id))
    }

    /// Greedy longest-match segmentation over the ordinary symbols accepted
    /// by `usable`, none of which is longer than `max_chars` characters.
    pub(crate) fn segment_by(
        &self,
        input: &str,
        max_chars: usize,
        usable: impl Fn(SymbolId) -> bool,
    ) -> Option<Vec<SymbolId>> {
        let bounds: Vec<usize> = input
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(input.len()))
            .collect();
        let char_count = bounds.len() - 1;

        let mut out = Vec::with_capacity(char_count);
        let mut pos = 0;
        while pos < char_count {
            let longest = max_chars.min(char_count - pos);
            let (id, len) = (1..=longest).rev().find_map(|len| {
                let piece = &input[bounds[pos]..bounds[pos + len]];
                self.index
                    .get(piece)
                    .copied()
                    .filter(|&id| self.is_consuming(id) && usable(id))
                    .map(|id| (id, len))
            })?;
            out.push(id);
            pos += len;
        }
        Some(out)
    }
}
