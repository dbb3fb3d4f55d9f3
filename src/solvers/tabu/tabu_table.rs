//! Tabu memories that forbid revisiting weight vectors or objective values.

use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use ordered_float::OrderedFloat;
use rand::Rng;

/// A memory of forbidden items.
pub trait TabuTable<T: ?Sized> {
    /// Forbid `item`. `chosen` is set if the item was accepted by the search (and not only
    /// evaluated).
    fn forbid(&mut self, item: &T, chosen: bool);

    /// Check whether `item` is allowed.
    fn is_allowed(&self, item: &T) -> bool;

    /// Allow all items again.
    fn reset(&mut self);
}

/// Fixed-size table indexed by a hash of the whole weight vector (Fortz and Thorup). The hash of a
/// vector is the XOR, over all edges, of `(weight[e] * h[e]) >> 16 & mask`, where `h[e]` are random
/// odd 64-bit numbers (Dietzfelbinger hashing). Both evaluated and accepted vectors are forbidden.
#[derive(Debug, Clone)]
pub struct WeightVectorTabu {
    table: FixedBitSet,
    h: Vec<u64>,
    mask: u64,
}

impl WeightVectorTabu {
    /// Create a table with `1 << bits` entries for vectors of length `len`.
    pub fn new<R: Rng + ?Sized>(len: usize, bits: u32, rng: &mut R) -> Self {
        let size = 1usize << bits;
        Self {
            table: FixedBitSet::with_capacity(size),
            h: (0..len).map(|_| rng.gen::<u64>() | 1).collect(),
            mask: (size - 1) as u64,
        }
    }

    /// Compute the hash of a weight vector.
    pub fn hash(&self, weights: &[u64]) -> usize {
        weights
            .iter()
            .zip(&self.h)
            .fold(0, |acc, (w, h)| acc ^ ((w.wrapping_mul(*h) >> 16) & self.mask)) as usize
    }
}

impl TabuTable<[u64]> for WeightVectorTabu {
    fn forbid(&mut self, weights: &[u64], _chosen: bool) {
        let hash = self.hash(weights);
        self.table.insert(hash);
    }

    fn is_allowed(&self, weights: &[u64]) -> bool {
        !self.table.contains(self.hash(weights))
    }

    fn reset(&mut self) {
        self.table.clear();
    }
}

/// Forbid objective values that were accepted recently. Time is counted in accepted moves; an
/// accepted score is forbidden until `ttl` further scores were accepted.
#[derive(Debug, Clone)]
pub struct ScoreTabu {
    table: HashMap<OrderedFloat<f64>, u64>,
    time: u64,
    ttl: u64,
}

impl ScoreTabu {
    /// Create an empty table where scores are forbidden for `ttl` accepted moves.
    pub fn new(ttl: u64) -> Self {
        Self {
            table: HashMap::new(),
            time: 0,
            ttl,
        }
    }
}

impl TabuTable<f64> for ScoreTabu {
    fn forbid(&mut self, score: &f64, chosen: bool) {
        if chosen {
            self.table.insert(OrderedFloat(*score), self.time);
            self.time += 1;
        }
    }

    fn is_allowed(&self, score: &f64) -> bool {
        match self.table.get(&OrderedFloat(*score)) {
            Some(t) => t + self.ttl < self.time,
            None => true,
        }
    }

    fn reset(&mut self) {
        self.table.clear();
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn weight_vector() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut tabu = WeightVectorTabu::new(4, 16, &mut rng);
        let w = [1u64, 2, 3, 4];
        assert!(tabu.is_allowed(&w[..]));
        tabu.forbid(&w[..], false);
        assert!(!tabu.is_allowed(&w[..]));
        tabu.forbid(&w[..], true);
        assert!(!tabu.is_allowed(&w[..]));
        tabu.reset();
        assert!(tabu.is_allowed(&w[..]));
    }

    #[test]
    fn hash_fits_the_table() {
        let mut rng = StdRng::seed_from_u64(1);
        let tabu = WeightVectorTabu::new(3, 4, &mut rng);
        for w in 1..200 {
            assert!(tabu.hash(&[w, w + 1, 3 * w]) < 16);
        }
    }

    #[test]
    fn score_ttl() {
        let mut tabu = ScoreTabu::new(2);
        assert!(tabu.is_allowed(&1.5));
        // evaluated but not chosen: nothing changes
        tabu.forbid(&1.5, false);
        assert!(tabu.is_allowed(&1.5));

        tabu.forbid(&1.5, true);
        assert!(!tabu.is_allowed(&1.5));
        tabu.forbid(&1.0, true);
        assert!(!tabu.is_allowed(&1.5));
        tabu.forbid(&0.9, true);
        assert!(tabu.is_allowed(&1.5));
        assert!(!tabu.is_allowed(&0.9));

        tabu.reset();
        assert!(tabu.is_allowed(&0.9));
    }
}
