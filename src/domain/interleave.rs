//! Fair interleaving of keyed items.
//!
//! Items are sorted into "tubes", one per key. The interleaver then drains the
//! tubes so that no two neighbours share a key:
//!
//! ```text
//! in:  a a a a a X X X X
//! out: a X a X a X a X a
//! ```
//!
//! A tube holding more than half of all items cannot be alternated with the
//! rest. Its excess is removed up front and returned as rejects.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which tube to draw from when the largest one would repeat the previous key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonLargestPick {
    /// The next-largest tube (ties go to the key seen first)
    #[default]
    SecondLargest,
    /// The first non-empty tube in input order
    FirstAvailable,
}

impl NonLargestPick {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecondLargest => "second-largest",
            Self::FirstAvailable => "first-available",
        }
    }
}

impl fmt::Display for NonLargestPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NonLargestPick {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second-largest" | "second_largest" => Ok(Self::SecondLargest),
            "first-available" | "first_available" => Ok(Self::FirstAvailable),
            other => Err(format!("unknown pick policy: {other}")),
        }
    }
}

/// Result of [`FairInterleaver::compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interleaved<T> {
    /// Overflow removed from the dominant tube, last-inserted first
    pub rejects: Vec<T>,
    /// Remaining items, alternating by key
    pub sorted: Vec<T>,
    /// Emissions that had to repeat the previous key
    pub forced_repeats: usize,
}

struct Tube<K, T> {
    key: K,
    items: VecDeque<T>,
}

/// Number of items that must be removed from a tube of size `largest` out of
/// `total` items so the rest can alternate: `L - (O + 1)` when positive.
pub fn overflow(total: usize, largest: usize) -> usize {
    let others = total.saturating_sub(largest);
    largest.saturating_sub(others + 1)
}

/// Interleaves items so that no two adjacent items share a key.
///
/// Tubes are tracked in a max-heap keyed by size. Entries go stale as tubes
/// shrink and are discarded lazily; a tube's size only ever decreases, so at
/// most one live entry exists per tube.
pub struct FairInterleaver<K, T> {
    tubes: Vec<Tube<K, T>>,
    heap: BinaryHeap<(usize, Reverse<usize>)>,
    total: usize,
    pick: NonLargestPick,
}

impl<K, T> FairInterleaver<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new<F>(items: impl IntoIterator<Item = T>, key_fn: F) -> Self
    where
        F: Fn(&T) -> K,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut tubes: Vec<Tube<K, T>> = Vec::new();
        let mut total = 0;

        for item in items {
            let key = key_fn(&item);
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                tubes.push(Tube {
                    key,
                    items: VecDeque::new(),
                });
                tubes.len() - 1
            });
            tubes[slot].items.push_back(item);
            total += 1;
        }

        let heap = tubes
            .iter()
            .enumerate()
            .map(|(slot, tube)| (tube.items.len(), Reverse(slot)))
            .collect();

        Self {
            tubes,
            heap,
            total,
            pick: NonLargestPick::default(),
        }
    }

    pub fn with_pick(mut self, pick: NonLargestPick) -> Self {
        self.pick = pick;
        self
    }

    /// Remove overflow, then drain all tubes into an alternating sequence.
    pub fn compute(mut self) -> Interleaved<T> {
        let rejects = self.pop_rejects();
        let mut sorted = Vec::with_capacity(self.total - rejects.len());
        let mut forced_repeats = 0;
        let mut prev: Option<K> = None;

        while let Some(largest) = self.largest() {
            let slot = match &prev {
                Some(prev_key) if *prev_key == self.tubes[largest].key => {
                    match self.non_largest(largest) {
                        Some(other) => other,
                        None => {
                            warn!(
                                "only tube {:?} left, repeating previous key",
                                self.tubes[largest].key
                            );
                            forced_repeats += 1;
                            largest
                        }
                    }
                }
                _ => largest,
            };

            let Some(item) = self.take_from(slot) else {
                break;
            };
            prev = Some(self.tubes[slot].key.clone());
            sorted.push(item);
        }

        debug!(
            "interleaved {} items: {} sorted, {} rejects, {} forced repeats",
            self.total,
            sorted.len(),
            rejects.len(),
            forced_repeats
        );
        Interleaved {
            rejects,
            sorted,
            forced_repeats,
        }
    }

    /// Remove the overflow of the largest tube, most recently added first.
    fn pop_rejects(&mut self) -> Vec<T> {
        let Some(largest) = self.largest() else {
            return Vec::new();
        };
        let size = self.tubes[largest].items.len();
        let count = overflow(self.total, size);
        if count == 0 {
            return Vec::new();
        }

        let tube = &mut self.tubes[largest];
        let rejects: Vec<T> = (0..count).filter_map(|_| tube.items.pop_back()).collect();
        debug!(
            "tube {:?} holds {} of {} items, rejecting {}",
            tube.key,
            size,
            self.total,
            rejects.len()
        );
        self.heap.push((tube.items.len(), Reverse(largest)));
        rejects
    }

    /// Slot of the largest non-empty tube, discarding stale heap entries.
    fn largest(&mut self) -> Option<usize> {
        while let Some(&(size, Reverse(slot))) = self.heap.peek() {
            let current = self.tubes[slot].items.len();
            if size == current && current > 0 {
                return Some(slot);
            }
            self.heap.pop();
        }
        None
    }

    /// A non-empty tube other than `largest`, if any remains.
    fn non_largest(&mut self, largest: usize) -> Option<usize> {
        match self.pick {
            NonLargestPick::SecondLargest => {
                let top = self.heap.pop();
                let second = self.largest();
                if let Some(top) = top {
                    self.heap.push(top);
                }
                second
            }
            NonLargestPick::FirstAvailable => self
                .tubes
                .iter()
                .enumerate()
                .find(|(slot, tube)| *slot != largest && !tube.items.is_empty())
                .map(|(slot, _)| slot),
        }
    }

    fn take_from(&mut self, slot: usize) -> Option<T> {
        let tube = &mut self.tubes[slot];
        let item = tube.items.pop_front()?;
        if !tube.items.is_empty() {
            self.heap.push((tube.items.len(), Reverse(slot)));
        }
        Some(item)
    }
}
