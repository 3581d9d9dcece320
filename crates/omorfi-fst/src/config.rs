// Lookup options and traversal state (explicit DFS stack).

use hashbrown::HashSet;

use crate::{MAX_STEP_COUNT, StateId};

/// Default cap on distinct readings returned by one lookup.
pub const MAX_READING_COUNT: usize = 100;

/// Default cap on path length, in transitions.
pub const MAX_PATH_DEPTH: usize = 2000;

/// Limits applied to a single lookup.
///
/// Hitting a limit never fails the lookup: the readings found so far are
/// returned and the result is marked truncated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LookupOptions {
    /// Stop after this many distinct output strings.
    pub max_readings: usize,
    /// Stop after this many transitions have been followed.
    pub max_steps: u32,
    /// Do not extend paths beyond this many transitions.
    pub max_depth: usize,
    /// Drop a branch once its weight exceeds the best complete reading by
    /// more than this margin. Only safe when no weight is negative.
    pub prune_margin: Option<f32>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            max_readings: MAX_READING_COUNT,
            max_steps: MAX_STEP_COUNT,
            max_depth: MAX_PATH_DEPTH,
            prune_margin: None,
        }
    }
}

/// One stack frame: a state reached at an input position, and a cursor over
/// the transitions still to try from it.
///
/// Non-consuming transitions (`cursor..epsilon_end`) are tried before the
/// ones consuming the next input symbol (`matching_start..matching_end`).
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub state: StateId,
    pub position: usize,
    pub weight: f32,
    /// Length of the output buffer on the path up to this frame.
    pub output_len: usize,
    cursor: usize,
    epsilon_end: usize,
    matching_start: usize,
    matching_end: usize,
}

impl Frame {
    pub fn new(
        state: StateId,
        position: usize,
        weight: f32,
        output_len: usize,
        epsilon: std::ops::Range<usize>,
        matching: std::ops::Range<usize>,
    ) -> Self {
        Self {
            state,
            position,
            weight,
            output_len,
            cursor: epsilon.start,
            epsilon_end: epsilon.end,
            matching_start: matching.start,
            matching_end: matching.end,
        }
    }

    /// Index of the next transition to try, advancing the cursor.
    #[inline]
    pub fn next_transition(&mut self) -> Option<usize> {
        if self.cursor < self.epsilon_end {
            self.cursor += 1;
            return Some(self.cursor - 1);
        }
        if self.cursor < self.matching_start {
            self.cursor = self.matching_start;
        }
        if self.cursor < self.matching_end {
            self.cursor += 1;
            return Some(self.cursor - 1);
        }
        None
    }
}

/// Traversal state for one lookup call.
///
/// The output buffer and the flag rows are shared by all frames: a frame owns
/// the prefix `output[..output_len]` and row `depth` of `flag_rows`, and
/// both are truncated back to the parent's extent when a sibling is pushed.
/// Flag rows are copied forward on push, so backtracking needs no undo.
#[derive(Debug)]
pub(crate) struct Traversal {
    pub frames: Vec<Frame>,
    pub output: String,
    /// Flattened `[depth * feature_count + feature]` flag states.
    pub flag_rows: Vec<i32>,
    pub feature_count: usize,
    /// `(state, position)` pairs on the current path.
    pub on_path: HashSet<(StateId, usize)>,
    pub steps: u32,
}

impl Traversal {
    pub fn new(flag_feature_count: u16) -> Self {
        let feature_count = flag_feature_count as usize;
        Self {
            frames: Vec::new(),
            output: String::new(),
            flag_rows: vec![0; feature_count],
            feature_count,
            on_path: HashSet::new(),
            steps: 0,
        }
    }

    /// Flag row of the frame at `depth`.
    #[inline]
    pub fn flag_row(&self, depth: usize) -> &[i32] {
        &self.flag_rows[depth * self.feature_count..(depth + 1) * self.feature_count]
    }

    /// Start the row for a child at `depth + 1` as a copy of row `depth`.
    #[inline]
    pub fn push_flag_row(&mut self, depth: usize) {
        let fc = self.feature_count;
        self.flag_rows.truncate((depth + 1) * fc);
        self.flag_rows
            .extend_from_within(depth * fc..(depth + 1) * fc);
    }

    /// Push a frame and mark its `(state, position)` as on the path.
    pub fn push(&mut self, frame: Frame) {
        self.on_path.insert((frame.state, frame.position));
        self.frames.push(frame);
    }

    /// Pop the top frame, unmarking it.
    pub fn pop(&mut self) {
        if let Some(frame) = self.frames.pop() {
            self.on_path.remove(&(frame.state, frame.position));
        }
    }
}
