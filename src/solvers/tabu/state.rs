//! Integer vector with transactional updates.

use fixedbitset::FixedBitSet;

/// A vector of integers that remembers the values at the last [`State::save`]. All modifications
/// since then form the *delta*, which can be committed ([`State::save`]), reverted
/// ([`State::restore`]), or replayed on another state ([`State::apply_delta_to`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    values: Vec<u64>,
    old: Vec<u64>,
    changed: FixedBitSet,
    delta: Vec<usize>,
}

impl State {
    /// Create a new state with `values` as baseline.
    pub fn new(values: Vec<u64>) -> Self {
        let n = values.len();
        Self {
            old: values.clone(),
            values,
            changed: FixedBitSet::with_capacity(n),
            delta: Vec::new(),
        }
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the state has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current value at `i`.
    pub fn get(&self, i: usize) -> u64 {
        self.values[i]
    }

    /// Value at `i` at the last save.
    pub fn get_old(&self, i: usize) -> u64 {
        self.old[i]
    }

    /// All current values.
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Set the value at `i`.
    pub fn set(&mut self, i: usize, value: u64) {
        if self.values[i] == value {
            return;
        }
        if !self.changed.put(i) {
            self.delta.push(i);
        }
        self.values[i] = value;
    }

    /// Commit all changes since the last save.
    pub fn save(&mut self) {
        for &i in &self.delta {
            self.old[i] = self.values[i];
        }
        self.clear_delta();
    }

    /// Revert all changes since the last save.
    pub fn restore(&mut self) {
        for &i in &self.delta {
            self.values[i] = self.old[i];
        }
        self.clear_delta();
    }

    fn clear_delta(&mut self) {
        self.changed.clear();
        self.delta.clear();
    }

    /// Number of values modified since the last save.
    pub fn delta_size(&self) -> usize {
        self.delta.len()
    }

    /// Indices modified since the last save.
    pub fn delta(&self) -> &[usize] {
        &self.delta
    }

    /// Set all values of the delta of `self` in `other`. They become part of the delta of `other`.
    pub fn apply_delta_to(&self, other: &mut State) {
        for &i in &self.delta {
            other.set(i, self.values[i]);
        }
    }

    /// Overwrite `self` with the current values of `other`, dropping the delta of `self`. The
    /// values of `other` become the new baseline.
    pub fn copy_from(&mut self, other: &State) {
        self.values.clone_from(&other.values);
        self.old.clone_from(&other.values);
        self.clear_delta();
    }
}
