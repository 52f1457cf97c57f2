//! Search inputs and outputs.

use std::collections::HashMap;

use armory_core::{ArmoryError, Catalog, DesiredAbilities, JewelId, Result, SlotCounts};

use crate::combination::Combination;
use crate::statistics::SearchStatistics;

/// What to search for.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    desired: DesiredAbilities,
    extra_slots: SlotCounts,
    jewel_limits: HashMap<JewelId, u32>,
}

impl SearchRequest {
    pub fn new(desired: DesiredAbilities) -> Self {
        Self {
            desired,
            ..Self::default()
        }
    }

    /// Gem slots available to every combination, such as weapon slots.
    pub fn with_extra_slots(mut self, slots: SlotCounts) -> Self {
        self.extra_slots = slots;
        self
    }

    /// Caps how many copies of `jewel` may be placed.
    pub fn with_jewel_limit(mut self, jewel: JewelId, count: u32) -> Self {
        self.jewel_limits.insert(jewel, count);
        self
    }

    pub fn desired(&self) -> &DesiredAbilities {
        &self.desired
    }

    pub fn extra_slots(&self) -> &SlotCounts {
        &self.extra_slots
    }

    pub fn jewel_limits(&self) -> &HashMap<JewelId, u32> {
        &self.jewel_limits
    }

    /// Checks the request against the catalog.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an invalid desired set or a limit
    /// on a jewel the catalog does not contain.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        self.desired.validate(catalog)?;
        if let Some(jewel) = self
            .jewel_limits
            .keys()
            .find(|&&id| catalog.jewel(id).is_none())
        {
            return Err(ArmoryError::invalid_configuration(format!(
                "jewel limit for unknown jewel id {}",
                jewel.0
            )));
        }
        Ok(())
    }
}

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// The whole space was explored, or the result limit was reached.
    Completed,
    /// Stopped through the cancellation handle; results are partial.
    Cancelled,
}

impl SearchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStatus::Completed => "COMPLETED",
            SearchStatus::Cancelled => "CANCELLED",
        }
    }
}

/// A judged combination with its ranking keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub combination: Combination,
    pub is_match: bool,
    /// One value per ranking criterion, in criterion order.
    pub keys: Vec<i64>,
    /// Order in which the search found this combination.
    pub discovery_index: u64,
}

/// Outcome of one search run.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub status: SearchStatus,
    /// Ranked matches.
    pub results: Vec<SearchResult>,
    pub statistics: SearchStatistics,
}

impl SearchReport {
    pub fn is_cancelled(&self) -> bool {
        self.status == SearchStatus::Cancelled
    }

    /// The search finished and nothing matched. Never true when cancelled.
    pub fn is_no_match(&self) -> bool {
        self.status == SearchStatus::Completed && self.results.is_empty()
    }
}
