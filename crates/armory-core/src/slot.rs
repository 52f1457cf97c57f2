//! Gem slot sizes and slot multisets.

use std::fmt;

/// Largest gem slot size. Slot sizes live in `1..=MAX_SLOT_SIZE`.
pub const MAX_SLOT_SIZE: u8 = 4;

/// Returns true if `size` is a legal slot size.
pub fn is_valid_slot_size(size: u8) -> bool {
    (1..=MAX_SLOT_SIZE).contains(&size)
}

/// A multiset of slot sizes, stored as a count per size.
///
/// Used both for slot budgets (physical slots available) and for jewel
/// demand (required slot sizes of chosen jewels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotCounts {
    counts: [u16; MAX_SLOT_SIZE as usize],
}

impl SlotCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a multiset from a list of sizes. Invalid sizes are ignored.
    pub fn from_sizes(sizes: &[u8]) -> Self {
        let mut counts = Self::new();
        for &size in sizes {
            counts.push(size);
        }
        counts
    }

    /// Adds one slot of `size`. Returns false for an invalid size.
    pub fn push(&mut self, size: u8) -> bool {
        if !is_valid_slot_size(size) {
            return false;
        }
        self.counts[size as usize - 1] += 1;
        true
    }

    /// Removes one slot of `size` if present.
    pub fn pop(&mut self, size: u8) -> bool {
        if !is_valid_slot_size(size) || self.counts[size as usize - 1] == 0 {
            return false;
        }
        self.counts[size as usize - 1] -= 1;
        true
    }

    pub fn add(&mut self, other: &SlotCounts) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }

    pub fn sub(&mut self, other: &SlotCounts) {
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine = mine.saturating_sub(*theirs);
        }
    }

    pub fn count(&self, size: u8) -> u16 {
        if is_valid_slot_size(size) {
            self.counts[size as usize - 1]
        } else {
            0
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| u32::from(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of slots whose size is at least `size`.
    pub fn at_least(&self, size: u8) -> u32 {
        (size.max(1)..=MAX_SLOT_SIZE)
            .map(|s| u32::from(self.count(s)))
            .sum()
    }

    /// Returns true if every slot in `other` can be matched to a distinct
    /// slot in `self` that is at least as large.
    ///
    /// Equivalent to comparing both multisets sorted descending element by
    /// element. This is both the slot dominance relation between pieces and
    /// the feasibility test for placing jewels (`other` = jewel sizes).
    pub fn covers(&self, other: &SlotCounts) -> bool {
        (1..=MAX_SLOT_SIZE).all(|size| self.at_least(size) >= other.at_least(size))
    }

    /// Sum of `size^3` over all slots.
    pub fn size_cube(&self) -> i64 {
        (1..=MAX_SLOT_SIZE)
            .map(|size| i64::from(self.count(size)) * i64::from(size).pow(3))
            .sum()
    }

    /// Sizes in descending order, one entry per slot.
    pub fn sizes_descending(&self) -> Vec<u8> {
        let mut sizes = Vec::with_capacity(self.total() as usize);
        for size in (1..=MAX_SLOT_SIZE).rev() {
            for _ in 0..self.count(size) {
                sizes.push(size);
            }
        }
        sizes
    }
}

impl fmt::Display for SlotCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes = self.sizes_descending();
        if sizes.is_empty() {
            return write!(f, "-");
        }
        let parts: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_sizes_ignores_invalid() {
        let counts = SlotCounts::from_sizes(&[1, 0, 3, 5, 3]);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.count(3), 2);
        assert_eq!(counts.count(0), 0);
    }

    #[test]
    fn test_covers_uses_larger_slots_for_smaller_demand() {
        let slots = SlotCounts::from_sizes(&[3, 1]);

        assert!(slots.covers(&SlotCounts::from_sizes(&[2, 1])));
        assert!(slots.covers(&SlotCounts::from_sizes(&[1, 1])));
        assert!(!slots.covers(&SlotCounts::from_sizes(&[2, 2])));
        assert!(!slots.covers(&SlotCounts::from_sizes(&[1, 1, 1])));
        assert!(slots.covers(&SlotCounts::new()));
    }

    #[test]
    fn test_size_cube_and_display() {
        let slots = SlotCounts::from_sizes(&[1, 2, 4]);
        assert_eq!(slots.size_cube(), 1 + 8 + 64);
        assert_eq!(slots.to_string(), "4/2/1");
        assert_eq!(SlotCounts::new().to_string(), "-");
    }

    #[test]
    fn test_pop_and_sub() {
        let mut slots = SlotCounts::from_sizes(&[2, 2, 1]);
        assert!(slots.pop(2));
        assert!(!slots.pop(3));
        slots.sub(&SlotCounts::from_sizes(&[1, 1]));
        assert_eq!(slots.sizes_descending(), vec![2]);
    }
}
