//! Scheduling keys for the accounts domain.

use fitsync_core::effect::OpKey;

/// Serialized profile-record mutations.
pub const USER_WRITE: OpKey = OpKey("user.write");
/// Latest-wins profile fetch.
pub const USER_FETCH: OpKey = OpKey("user.fetch_one");
