//! Multi-criteria session filtering.
//!
//! Pure functions over the in-memory catalog; no network round trips. The
//! criteria intersect in a fixed order - activity category, complexity,
//! equipment, intensity, muscle group - and every unset criterion is a
//! no-op.

use crate::model::{ActivityCategory, Level, MuscleGroup, TrainingSession};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter criteria for the session catalog.
///
/// The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionFilterSpec {
    /// Keep sessions tagged with at least one selected category.
    pub activity_categories: BTreeSet<ActivityCategory>,
    /// Keep sessions whose rounded complexity average falls in the selected
    /// level range.
    pub complexity: BTreeSet<Level>,
    /// Keep sessions with this equipment requirement. Single value: picking
    /// a new one replaces the old, it never accumulates.
    pub equipment: Option<bool>,
    /// Keep sessions whose rounded intensity average falls in the selected
    /// level range.
    pub intensity: BTreeSet<Level>,
    /// Keep sessions tagged with at least one selected muscle group.
    pub muscle_groups: BTreeSet<MuscleGroup>,
}

impl SessionFilterSpec {
    /// Criteria that filter nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every criterion is unset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activity_categories.is_empty()
            && self.complexity.is_empty()
            && self.equipment.is_none()
            && self.intensity.is_empty()
            && self.muscle_groups.is_empty()
    }

    /// Replace the equipment selection (single-value toggle).
    #[must_use]
    pub const fn with_equipment(mut self, needs_equipment: bool) -> Self {
        self.equipment = Some(needs_equipment);
        self
    }

    /// Apply the criteria, keeping the catalog's order.
    #[must_use]
    pub fn apply(&self, sessions: &[TrainingSession]) -> Vec<TrainingSession> {
        sessions
            .iter()
            .filter(|session| self.matches(session))
            .cloned()
            .collect()
    }

    /// Intersection of the five criteria, in the fixed order.
    fn matches(&self, session: &TrainingSession) -> bool {
        tags_intersect(&self.activity_categories, &session.activity_categories)
            && level_in_range(&self.complexity, session.complexity.rounded_average())
            && self.equipment.is_none_or(|needs| session.equipment == needs)
            && level_in_range(&self.intensity, session.intensity.rounded_average())
            && tags_intersect(&self.muscle_groups, &session.muscle_groups)
    }
}

/// Categorical criterion: at least one session tag is selected.
fn tags_intersect<T: Ord>(selected: &BTreeSet<T>, tags: &[T]) -> bool {
    selected.is_empty() || tags.iter().any(|tag| selected.contains(tag))
}

/// Range criterion over discrete levels.
///
/// The selection collapses to its min/max bounds, so picking only Low and
/// High spans the gap and Moderate passes as well - a selection without the
/// midpoint behaves as the full range. Pending product confirmation.
fn level_in_range(selected: &BTreeSet<Level>, rounded_average: u8) -> bool {
    let (Some(min), Some(max)) = (selected.first(), selected.last()) else {
        return true;
    };
    (min.value()..=max.value()).contains(&rounded_average)
}
