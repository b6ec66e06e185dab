//! Memoized read projections over [`TrainingState`].
//!
//! Constructors return a [`Selector`] or [`SelectorFamily`] the caller holds
//! on to; each is invalidated by the epoch of the slice(s) it reads, so a
//! dispatch that leaves a slice untouched leaves its projections cached.

use crate::filter::SessionFilterSpec;
use crate::model::{
    PlanId, PlanSessionFragment, SessionId, TrainingPlan, TrainingRecord, TrainingSession,
};
use crate::search::search_sessions;
use crate::state::TrainingState;
use fitsync_core::error::DataError;
use fitsync_core::selector::{Selector, SelectorFamily};

/// Combine two slice epochs into one cache key.
///
/// Distinct while each slice stays under 2^32 mutations.
const fn span_epochs(a: u64, b: u64) -> u64 {
    (a << 32) ^ b
}

// ═══════════════════════════════════════════════════════════════════════
// Sessions
// ═══════════════════════════════════════════════════════════════════════

/// Every session, in store order.
#[must_use]
pub fn all_sessions() -> Selector<TrainingState, Vec<TrainingSession>> {
    Selector::new(|s| s.sessions.epoch(), |s| s.sessions.records.to_vec())
}

/// One session by id.
#[must_use]
pub fn session_by_id() -> SelectorFamily<TrainingState, SessionId, Option<TrainingSession>> {
    SelectorFamily::new(
        |s| s.sessions.epoch(),
        |s, id| s.sessions.records.get(id).cloned(),
    )
}

/// Whether any session fetch is in flight.
#[must_use]
pub fn sessions_fetch_processing() -> Selector<TrainingState, bool> {
    Selector::new(|s| s.sessions.epoch(), |s| s.sessions.fetch.processing())
}

/// The last session fetch failure, if any.
#[must_use]
pub fn sessions_fetch_error() -> Selector<TrainingState, Option<DataError>> {
    Selector::new(
        |s| s.sessions.epoch(),
        |s| s.sessions.fetch.error().cloned(),
    )
}

/// Whether any session mutation (create/update/delete/rate) is in flight.
#[must_use]
pub fn sessions_mutation_processing() -> Selector<TrainingState, bool> {
    Selector::new(
        |s| s.sessions.epoch(),
        |s| {
            s.sessions.create.processing()
                || s.sessions.update.processing()
                || s.sessions.delete.processing()
                || s.sessions.rating.processing()
        },
    )
}

/// Whether the catalog has been fetched since the last purge.
#[must_use]
pub fn sessions_fetched() -> Selector<TrainingState, bool> {
    Selector::new(|s| s.sessions.epoch(), |s| s.sessions.fetched)
}

/// Sessions matching a search text and filter criteria.
///
/// The family key is the `(text, criteria)` pair, so flipping between two
/// filter states keeps both projections cached until the catalog changes.
#[must_use]
pub fn filtered_sessions()
-> SelectorFamily<TrainingState, (String, SessionFilterSpec), Vec<TrainingSession>> {
    SelectorFamily::new(
        |s| s.sessions.epoch(),
        |s, (text, spec): &(String, SessionFilterSpec)| {
            let searched = search_sessions(&s.sessions.records.to_vec(), text);
            spec.apply(&searched)
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Plans
// ═══════════════════════════════════════════════════════════════════════

/// Every plan, in store order.
#[must_use]
pub fn all_plans() -> Selector<TrainingState, Vec<TrainingPlan>> {
    Selector::new(|s| s.plans.epoch(), |s| s.plans.records.to_vec())
}

/// One plan by id.
#[must_use]
pub fn plan_by_id() -> SelectorFamily<TrainingState, PlanId, Option<TrainingPlan>> {
    SelectorFamily::new(|s| s.plans.epoch(), |s, id| s.plans.records.get(id).cloned())
}

/// Whether any plan fetch is in flight.
#[must_use]
pub fn plans_fetch_processing() -> Selector<TrainingState, bool> {
    Selector::new(|s| s.plans.epoch(), |s| s.plans.fetch.processing())
}

/// Whether plans have been fetched since the last purge.
#[must_use]
pub fn plans_fetched() -> Selector<TrainingState, bool> {
    Selector::new(|s| s.plans.epoch(), |s| s.plans.fetched)
}

// ═══════════════════════════════════════════════════════════════════════
// Fragments
// ═══════════════════════════════════════════════════════════════════════

/// The fragments of one plan, in the plan's program order.
///
/// Fragments the plan references but the slice has not loaded yet are
/// skipped; relations resolve by id, never by embedding.
#[must_use]
pub fn plan_fragments() -> SelectorFamily<TrainingState, PlanId, Vec<PlanSessionFragment>> {
    SelectorFamily::new(
        |s| span_epochs(s.plans.epoch(), s.fragments.epoch()),
        |s, plan_id| {
            let Some(plan) = s.plans.records.get(plan_id) else {
                return Vec::new();
            };
            plan.fragment_ids
                .iter()
                .filter_map(|id| s.fragments.records.get(id))
                .cloned()
                .collect()
        },
    )
}

/// Whether a plan's fragments have been loaded since the last purge.
#[must_use]
pub fn plan_fragments_fetched() -> SelectorFamily<TrainingState, PlanId, bool> {
    SelectorFamily::new(
        |s| s.fragments.epoch(),
        |s, plan_id| s.fragments.fetched_plans.contains(plan_id),
    )
}

/// The sessions a plan schedules, in program order, resolved through the
/// fragment indirection. A session appearing in several fragments appears
/// once per occurrence.
#[must_use]
pub fn plan_sessions() -> SelectorFamily<TrainingState, PlanId, Vec<TrainingSession>> {
    SelectorFamily::new(
        |s| span_epochs(span_epochs(s.plans.epoch(), s.fragments.epoch()), s.sessions.epoch()),
        |s, plan_id| {
            let Some(plan) = s.plans.records.get(plan_id) else {
                return Vec::new();
            };
            plan.fragment_ids
                .iter()
                .filter_map(|id| s.fragments.records.get(id))
                .filter_map(|fragment| s.sessions.records.get(&fragment.session_id))
                .cloned()
                .collect()
        },
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Records
// ═══════════════════════════════════════════════════════════════════════

/// Every record, in store order.
#[must_use]
pub fn all_records() -> Selector<TrainingState, Vec<TrainingRecord>> {
    Selector::new(|s| s.records.epoch(), |s| s.records.records.to_vec())
}

/// The records for one session.
#[must_use]
pub fn records_for_session() -> SelectorFamily<TrainingState, SessionId, Vec<TrainingRecord>> {
    SelectorFamily::new(
        |s| s.records.epoch(),
        |s, session_id| {
            s.records
                .records
                .iter()
                .filter(|record| record.session_id == *session_id)
                .cloned()
                .collect()
        },
    )
}

/// Whether any record fetch is in flight.
#[must_use]
pub fn records_fetch_processing() -> Selector<TrainingState, bool> {
    Selector::new(|s| s.records.epoch(), |s| s.records.fetch.processing())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{fragment, plan, session};

    #[test]
    fn session_by_id_resolves_and_misses() {
        let mut state = TrainingState::default();
        state.sessions.records.insert_one(session("s-1", "Leg Day", "FitChan"));
        state.sessions.touch();

        let by_id = session_by_id();
        assert!(by_id.select(&state, &SessionId::new("s-1")).is_some());
        assert!(by_id.select(&state, &SessionId::new("ghost")).is_none());
    }

    #[test]
    fn plan_fragments_follow_program_order() {
        let mut state = TrainingState::default();
        let mut p = plan("p-1", "Strength Block");
        p.fragment_ids = vec![
            crate::model::FragmentId::new("f-2"),
            crate::model::FragmentId::new("f-1"),
        ];
        state.plans.records.insert_one(p);
        state.plans.touch();
        state.fragments.records.insert_many(vec![
            fragment("f-1", "p-1", "s-1"),
            fragment("f-2", "p-1", "s-2"),
        ]);
        state.fragments.touch();

        let fragments = plan_fragments();
        let resolved = fragments.select(&state, &PlanId::new("p-1"));
        let order: Vec<&str> = resolved.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(order, ["f-2", "f-1"]);
    }

    #[test]
    fn plan_sessions_resolve_through_fragments() {
        let mut state = TrainingState::default();
        let mut p = plan("p-1", "Strength Block");
        p.fragment_ids = vec![crate::model::FragmentId::new("f-1")];
        state.plans.records.insert_one(p);
        state.plans.touch();
        state.fragments.records.insert_one(fragment("f-1", "p-1", "s-1"));
        state.fragments.touch();
        state.sessions.records.insert_one(session("s-1", "Leg Day", "FitChan"));
        state.sessions.touch();

        let sessions = plan_sessions();
        let resolved = sessions.select(&state, &PlanId::new("p-1"));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].title, "Leg Day");
    }

    #[test]
    fn untouched_slice_keeps_cached_projection() {
        let mut state = TrainingState::default();
        state.sessions.records.insert_one(session("s-1", "Leg Day", "FitChan"));
        state.sessions.touch();

        let all = all_sessions();
        let first = all.select(&state);

        // A plan mutation must not invalidate the sessions projection.
        state.plans.records.insert_one(plan("p-1", "Block"));
        state.plans.touch();
        let second = all.select(&state);
        assert_eq!(first, second);
    }

    #[test]
    fn filtered_sessions_keyed_by_text_and_spec() {
        let mut state = TrainingState::default();
        state.sessions.records.insert_many(vec![
            session("s-1", "Leg Day", "FitChan"),
            session("s-2", "Arm Blast", "Other"),
        ]);
        state.sessions.touch();

        let filtered = filtered_sessions();
        let key_leg = ("leg fit".to_string(), SessionFilterSpec::default());
        let key_all = (String::new(), SessionFilterSpec::default());

        assert_eq!(filtered.select(&state, &key_leg).len(), 1);
        assert_eq!(filtered.select(&state, &key_all).len(), 2);
        // Re-selecting with the first key still serves the cached value.
        assert_eq!(filtered.select(&state, &key_leg).len(), 1);
    }
}
