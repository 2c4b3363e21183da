//! Shared time slots referenced by every annotation tier

use crate::Alignment;
use segalign_core::{seconds_to_millis, Interval};
use std::collections::BTreeMap;
use std::fmt;

/// A numbered point in time, rendered as `ts<N>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    /// 1-based slot number, increasing with time
    pub id: usize,
    /// Time in milliseconds
    pub millis: u64,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ts{}", self.id)
    }
}

/// Distinct annotation boundaries, keyed by millisecond value.
///
/// Equal timestamps always resolve to the same slot, no matter how many
/// annotations on however many tiers refer to it.
#[derive(Debug, Clone, Default)]
pub struct TimePointRegistry {
    slots: BTreeMap<u64, usize>,
}

impl TimePointRegistry {
    /// Collects the boundaries of the given intervals; silence is skipped
    pub fn from_intervals<'a>(intervals: impl IntoIterator<Item = &'a Interval>) -> Self {
        let mut slots: BTreeMap<u64, usize> = BTreeMap::new();
        for interval in intervals.into_iter().filter(|i| !i.is_silence()) {
            slots.insert(seconds_to_millis(interval.start), 0);
            slots.insert(seconds_to_millis(interval.end), 0);
        }
        for (id, slot) in slots.values_mut().enumerate() {
            *slot = id + 1;
        }
        Self { slots }
    }

    /// Registry over the word and phone tiers of an alignment
    pub fn from_alignment(alignment: &Alignment) -> Self {
        Self::from_intervals(alignment.words.intervals().iter().chain(alignment.phones.intervals()))
    }

    /// Looks up the slot for a time in milliseconds
    pub fn slot(&self, millis: u64) -> Option<TimeSlot> {
        self.slots.get(&millis).map(|&id| TimeSlot { id, millis })
    }

    /// All slots in ascending time order
    pub fn iter(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.slots.iter().map(|(&millis, &id)| TimeSlot { id, millis })
    }

    /// Number of distinct time points
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no time point was registered
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_sorted_and_shared() {
        let intervals = vec![
            Interval::new(0.0, 0.15, "the"),
            Interval::new(0.15, 0.4, "dog"),
            Interval::new(0.4, 0.9, "SIL"),
            Interval::new(0.0, 0.05, "DH"),
            Interval::new(0.05, 0.15, "AH"),
        ];
        let registry = TimePointRegistry::from_intervals(&intervals);

        let times: Vec<_> = registry.iter().map(|slot| slot.millis).collect();
        assert_eq!(times, vec![0, 50, 150, 400]);
        assert_eq!(registry.slot(150).unwrap().to_string(), "ts3");
        // repeated lookups never consume a slot
        assert_eq!(registry.slot(150), registry.slot(150));
        assert!(registry.slot(900).is_none());
    }
}
