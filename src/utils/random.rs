//! # Weighted Random Selection
//!
//! Spawn and decoration choices are drawn from integer-weighted tables, and
//! several weights grow with depth or distance through step tables.

use rand::Rng;

/// A discrete set of options, each with an integer weight.
///
/// # Examples
///
/// ```
/// use burrow::RandomTable;
/// use rand::SeedableRng;
///
/// let table = RandomTable::new().add("orc", 80).add("troll", 0);
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// assert_eq!(table.choose(&mut rng), Some(&"orc"));
/// ```
#[derive(Debug, Clone)]
pub struct RandomTable<T> {
    entries: Vec<(T, u32)>,
}

impl<T> Default for RandomTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> RandomTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option. Zero-weight options are kept but never chosen.
    pub fn add(mut self, value: T, weight: u32) -> Self {
        self.entries.push((value, weight));
        self
    }

    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }

    /// Picks an option with probability proportional to its weight.
    ///
    /// Returns `None` when every weight is zero.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let total = self.total_weight();
        if total == 0 {
            return None;
        }

        let mut roll = rng.gen_range(0..total);
        for (value, weight) in &self.entries {
            if roll < *weight {
                return Some(value);
            }
            roll -= weight;
        }
        None
    }
}

/// Looks up a step table of `(value, threshold)` pairs: the value of the last
/// entry whose threshold is at most `metric`, or 0 when none qualifies.
///
/// ```
/// use burrow::from_metric;
///
/// let trolls = [(15, 3), (30, 5), (60, 7)];
/// assert_eq!(from_metric(&trolls, 1), 0);
/// assert_eq!(from_metric(&trolls, 5), 30);
/// assert_eq!(from_metric(&trolls, 12), 60);
/// ```
pub fn from_metric(table: &[(u32, u32)], metric: u32) -> u32 {
    table
        .iter()
        .rev()
        .find(|(_, threshold)| *threshold <= metric)
        .map(|(value, _)| *value)
        .unwrap_or(0)
}
