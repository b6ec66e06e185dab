//! Scheduling keys for the training domains.
//!
//! Mutations share one serial key per domain so writes never interleave;
//! each fetch kind has its own supersede key so a newer fetch of the same
//! kind invalidates an older in-flight one.

use fitsync_core::effect::OpKey;

/// Serialized session mutations (create/update/delete/rate).
pub const SESSION_WRITE: OpKey = OpKey("session.write");
/// Latest-wins catalog fetch.
pub const SESSION_FETCH_ALL: OpKey = OpKey("session.fetch_all");
/// Latest-wins single-session fetch.
pub const SESSION_FETCH_ONE: OpKey = OpKey("session.fetch_one");
/// Latest-wins query fetch.
pub const SESSION_FETCH_MANY: OpKey = OpKey("session.fetch_many");

/// Serialized plan mutations.
pub const PLAN_WRITE: OpKey = OpKey("plan.write");
/// Latest-wins plan catalog fetch.
pub const PLAN_FETCH_ALL: OpKey = OpKey("plan.fetch_all");
/// Latest-wins single-plan fetch.
pub const PLAN_FETCH_ONE: OpKey = OpKey("plan.fetch_one");

/// Serialized fragment mutations (including batches).
pub const FRAGMENT_WRITE: OpKey = OpKey("fragment.write");
/// Latest-wins per-plan fragment fetch.
pub const FRAGMENT_FETCH: OpKey = OpKey("fragment.fetch_for_plan");

/// Serialized record mutations.
pub const RECORD_WRITE: OpKey = OpKey("record.write");
/// Latest-wins record fetch.
pub const RECORD_FETCH_ALL: OpKey = OpKey("record.fetch_all");
/// Latest-wins single-record fetch.
pub const RECORD_FETCH_ONE: OpKey = OpKey("record.fetch_one");
