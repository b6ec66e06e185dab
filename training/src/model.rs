//! Domain models for the training catalog.
//!
//! All types are `Clone` and serde-serializable to support the functional
//! architecture pattern. Records reference each other by id only; the
//! normalized stores never embed one entity inside another.

use chrono::{DateTime, Utc};
use fitsync_core::entity::Entity;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Wrap an existing id string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The raw id string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Unique identifier for a training session.
    SessionId
}
string_id! {
    /// Unique identifier for a training plan.
    PlanId
}
string_id! {
    /// Unique identifier for a plan-session fragment.
    FragmentId
}
string_id! {
    /// Unique identifier for a training record.
    RecordId
}
string_id! {
    /// Unique identifier for the user who owns or created a record.
    UserId
}

// ═══════════════════════════════════════════════════════════════════════
// Shared enums
// ═══════════════════════════════════════════════════════════════════════

/// Discrete complexity/intensity level.
///
/// The wire value is the ordinal (1-3); rolling averages computed from
/// ratings always stay within `[1.0, 3.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Level 1.
    Low,
    /// Level 2.
    Moderate,
    /// Level 3.
    High,
}

impl Level {
    /// Every level, in ascending order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Moderate, Self::High];

    /// The ordinal value (1-3).
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Moderate => 2,
            Self::High => 3,
        }
    }
}

/// Who can see a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed in the shared catalog.
    Public,
    /// Visible to the creator only.
    Private,
}

/// Muscle group tag on a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum MuscleGroup {
    Arms,
    Back,
    Chest,
    Core,
    Glutes,
    Legs,
    Shoulders,
    FullBody,
}

/// Activity category tag on a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum ActivityCategory {
    Cardio,
    Strength,
    Mobility,
    Balance,
    Endurance,
    Recovery,
}

/// Video hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoPlatform {
    /// YouTube.
    Youtube,
    /// Vimeo.
    Vimeo,
}

/// Reference to the instructional video backing a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Hosting platform.
    pub platform: VideoPlatform,
    /// Canonical video URL.
    pub url: String,
    /// Video length in seconds.
    pub duration_seconds: u32,
    /// Channel the video was published on.
    pub channel: String,
}

// ═══════════════════════════════════════════════════════════════════════
// Rating statistics
// ═══════════════════════════════════════════════════════════════════════

/// Default level plus the rolling average over submitted ratings.
///
/// The average starts at the creator-chosen default and is recomputed from
/// the running count on every rating; it can only be written through the
/// rating operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    /// Creator-chosen default level.
    pub default: Level,
    /// Rolling average over submitted ratings, within `[1.0, 3.0]`.
    pub average: f64,
    /// Number of ratings folded into the average.
    pub rating_count: u32,
}

impl LevelStats {
    /// Stats for a freshly created session: the average is the default
    /// level, with no ratings yet.
    #[must_use]
    pub fn new(default: Level) -> Self {
        Self {
            default,
            average: f64::from(default.value()),
            rating_count: 0,
        }
    }

    /// Fold one rating into the rolling average.
    ///
    /// `new_avg = (avg * n + rating) / (n + 1)`, clamped to `[1.0, 3.0]`.
    #[must_use]
    pub fn rate(&self, rating: Level) -> Self {
        let count = self.rating_count;
        let folded = (self.average * f64::from(count) + f64::from(rating.value()))
            / f64::from(count + 1);
        Self {
            default: self.default,
            average: folded.clamp(1.0, 3.0),
            rating_count: count + 1,
        }
    }

    /// The average rounded to the nearest discrete level value.
    #[must_use]
    pub fn rounded_average(&self) -> u8 {
        // Average is clamped to [1.0, 3.0], so the cast is lossless.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.average.round() as u8
        }
    }
}

/// A user's submitted rating for one completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRating {
    /// Perceived complexity.
    pub complexity: Level,
    /// Perceived intensity.
    pub intensity: Level,
}

// ═══════════════════════════════════════════════════════════════════════
// TrainingSession
// ═══════════════════════════════════════════════════════════════════════

/// A single workout: video, tags, and rating statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSession {
    /// Unique identifier.
    pub id: SessionId,
    /// Display title.
    pub title: String,
    /// Instructional video reference.
    pub video: VideoRef,
    /// Complexity default and rolling average.
    pub complexity: LevelStats,
    /// Intensity default and rolling average.
    pub intensity: LevelStats,
    /// Whether equipment is required.
    pub equipment: bool,
    /// Muscle group tags.
    pub muscle_groups: Vec<MuscleGroup>,
    /// Activity category tags.
    pub activity_categories: Vec<ActivityCategory>,
    /// Free-form focus tags.
    pub focus_tags: Vec<String>,
    /// Catalog visibility.
    pub visibility: Visibility,
    /// Creating user.
    pub creator_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Regular field edits from the session editor.
///
/// Rating statistics are deliberately absent: averages and counts can only
/// change through [`SessionChanges::Rating`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFields {
    /// New title.
    pub title: Option<String>,
    /// New video reference.
    pub video: Option<VideoRef>,
    /// New equipment flag.
    pub equipment: Option<bool>,
    /// New muscle group tags.
    pub muscle_groups: Option<Vec<MuscleGroup>>,
    /// New activity category tags.
    pub activity_categories: Option<Vec<ActivityCategory>>,
    /// New focus tags.
    pub focus_tags: Option<Vec<String>>,
    /// New visibility.
    pub visibility: Option<Visibility>,
    /// New update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update payload for a training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionChanges {
    /// Regular field edits.
    Fields(SessionFields),
    /// Recomputed rating statistics; produced only by the rating operation.
    Rating {
        /// New complexity stats.
        complexity: LevelStats,
        /// New intensity stats.
        intensity: LevelStats,
        /// Update timestamp.
        updated_at: DateTime<Utc>,
    },
}

impl Entity for TrainingSession {
    type Id = SessionId;
    type Changes = SessionChanges;

    fn id(&self) -> &SessionId {
        &self.id
    }

    fn apply(&mut self, changes: &SessionChanges) {
        match changes {
            SessionChanges::Fields(fields) => {
                if let Some(title) = &fields.title {
                    self.title = title.clone();
                }
                if let Some(video) = &fields.video {
                    self.video = video.clone();
                }
                if let Some(equipment) = fields.equipment {
                    self.equipment = equipment;
                }
                if let Some(muscle_groups) = &fields.muscle_groups {
                    self.muscle_groups = muscle_groups.clone();
                }
                if let Some(activity_categories) = &fields.activity_categories {
                    self.activity_categories = activity_categories.clone();
                }
                if let Some(focus_tags) = &fields.focus_tags {
                    self.focus_tags = focus_tags.clone();
                }
                if let Some(visibility) = fields.visibility {
                    self.visibility = visibility;
                }
                if let Some(updated_at) = fields.updated_at {
                    self.updated_at = updated_at;
                }
            },
            SessionChanges::Rating { complexity, intensity, updated_at } => {
                self.complexity = complexity.clone();
                self.intensity = intensity.clone();
                self.updated_at = *updated_at;
            },
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TrainingPlan
// ═══════════════════════════════════════════════════════════════════════

/// An ordered program of scheduled session occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    /// Unique identifier.
    pub id: PlanId,
    /// Display title.
    pub title: String,
    /// Owned fragments, in program order.
    pub fragment_ids: Vec<FragmentId>,
    /// Catalog visibility.
    pub visibility: Visibility,
    /// Creating user.
    pub creator_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update payload for a training plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanChanges {
    /// New title.
    pub title: Option<String>,
    /// New fragment order.
    pub fragment_ids: Option<Vec<FragmentId>>,
    /// New visibility.
    pub visibility: Option<Visibility>,
    /// New update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for TrainingPlan {
    type Id = PlanId;
    type Changes = PlanChanges;

    fn id(&self) -> &PlanId {
        &self.id
    }

    fn apply(&mut self, changes: &PlanChanges) {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(fragment_ids) = &changes.fragment_ids {
            self.fragment_ids = fragment_ids.clone();
        }
        if let Some(visibility) = changes.visibility {
            self.visibility = visibility;
        }
        if let Some(updated_at) = changes.updated_at {
            self.updated_at = updated_at;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PlanSessionFragment
// ═══════════════════════════════════════════════════════════════════════

/// A scheduled occurrence of a session inside a plan.
///
/// The indirection lets the same session appear several times in one plan
/// with independent scheduling metadata. Fragments are owned by their plan
/// and removed by an explicit batch delete when the plan is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSessionFragment {
    /// Unique identifier.
    pub id: FragmentId,
    /// Owning plan.
    pub plan_id: PlanId,
    /// Scheduled session.
    pub session_id: SessionId,
    /// Program week (1-based).
    pub week: u32,
    /// Day of the week (1 = Monday .. 7 = Sunday).
    pub weekday: u8,
    /// Position within the day.
    pub order_index: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update payload for a fragment (reschedule/reorder).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentChanges {
    /// New program week.
    pub week: Option<u32>,
    /// New day of the week.
    pub weekday: Option<u8>,
    /// New position within the day.
    pub order_index: Option<u32>,
    /// New update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for PlanSessionFragment {
    type Id = FragmentId;
    type Changes = FragmentChanges;

    fn id(&self) -> &FragmentId {
        &self.id
    }

    fn apply(&mut self, changes: &FragmentChanges) {
        if let Some(week) = changes.week {
            self.week = week;
        }
        if let Some(weekday) = changes.weekday {
            self.weekday = weekday;
        }
        if let Some(order_index) = changes.order_index {
            self.order_index = order_index;
        }
        if let Some(updated_at) = changes.updated_at {
            self.updated_at = updated_at;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TrainingRecord
// ═══════════════════════════════════════════════════════════════════════

/// A completed-session receipt.
///
/// Created only through the session-completion workflow; a carried rating
/// chains into the session's rating operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Unique identifier.
    pub id: RecordId,
    /// The completed session.
    pub session_id: SessionId,
    /// The completing user.
    pub user_id: UserId,
    /// When the session was completed.
    pub completed_at: DateTime<Utc>,
    /// The user's rating, when submitted.
    pub rating: Option<SessionRating>,
}

/// Partial update payload for a training record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordChanges {
    /// New or corrected rating.
    pub rating: Option<SessionRating>,
}

impl Entity for TrainingRecord {
    type Id = RecordId;
    type Changes = RecordChanges;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn apply(&mut self, changes: &RecordChanges) {
        if let Some(rating) = changes.rating {
            self.rating = Some(rating);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn level_values_are_ordinal() {
        assert_eq!(Level::Low.value(), 1);
        assert_eq!(Level::Moderate.value(), 2);
        assert_eq!(Level::High.value(), 3);
        assert!(Level::Low < Level::Moderate && Level::Moderate < Level::High);
    }

    #[test]
    fn fresh_stats_average_the_default() {
        let stats = LevelStats::new(Level::Moderate);
        assert_eq!(stats.rating_count, 0);
        assert!((stats.average - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats.rounded_average(), 2);
    }

    #[test]
    fn rating_folds_into_rolling_average() {
        // With count 0 the first rating replaces the default-seeded average.
        let stats = LevelStats::new(Level::Low).rate(Level::High);
        assert!((stats.average - 3.0).abs() < f64::EPSILON);
        assert_eq!(stats.rating_count, 1);

        let stats = stats.rate(Level::Low);
        assert!((stats.average - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats.rating_count, 2);
    }

    proptest! {
        /// Any rating sequence keeps the average inside [1, 3].
        #[test]
        fn average_stays_in_bounds(ratings in prop::collection::vec(0u8..3, 0..50)) {
            let mut stats = LevelStats::new(Level::Moderate);
            for r in ratings {
                let level = Level::ALL[r as usize];
                stats = stats.rate(level);
                prop_assert!(stats.average >= 1.0);
                prop_assert!(stats.average <= 3.0);
                prop_assert!((1..=3).contains(&stats.rounded_average()));
            }
        }
    }

    #[test]
    fn session_apply_merges_fields_only() {
        let mut session = sample_session();
        let before_stats = session.complexity.clone();

        session.apply(&SessionChanges::Fields(SessionFields {
            title: Some("Renamed".to_string()),
            equipment: Some(true),
            ..SessionFields::default()
        }));

        assert_eq!(session.title, "Renamed");
        assert!(session.equipment);
        assert_eq!(session.complexity, before_stats);
    }

    #[test]
    fn session_apply_rating_replaces_stats() {
        let mut session = sample_session();
        let new_complexity = session.complexity.rate(Level::High);
        let new_intensity = session.intensity.rate(Level::Low);
        let stamp = session.updated_at + chrono::Duration::minutes(5);

        session.apply(&SessionChanges::Rating {
            complexity: new_complexity.clone(),
            intensity: new_intensity.clone(),
            updated_at: stamp,
        });

        assert_eq!(session.complexity, new_complexity);
        assert_eq!(session.intensity, new_intensity);
        assert_eq!(session.updated_at, stamp);
    }

    fn sample_session() -> TrainingSession {
        crate::fixtures::session("s-1", "Leg Day", "FitChan")
    }
}
