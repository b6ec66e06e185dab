//! # FitSync Training
//!
//! Training-session, plan, fragment, and record domains.
//!
//! Each domain owns a normalized slice of [`state::TrainingState`], a
//! three-phase action set, and a reducer that translates requests into
//! scheduled effects against the injected data services. Reads go through
//! memoized [`selectors`]; the [`filter`] and [`search`] engines project the
//! in-memory catalog without network round trips.
//!
//! ## Wiring
//!
//! ```ignore
//! use fitsync_runtime::Store;
//! use fitsync_training::prelude::*;
//!
//! let env = TrainingEnvironment::new(sessions, plans, fragments, records, notifier, clock);
//! let store = Store::new(TrainingState::default(), TrainingReducer::new(), env);
//!
//! store.send(SessionAction::FetchAllRequested.into()).await?;
//! ```

pub mod actions;
pub mod environment;
pub mod filter;
pub mod keys;
pub mod mocks;
pub mod model;
pub mod reducers;
pub mod search;
pub mod selectors;
pub mod state;

/// Everything an embedding application usually needs.
pub mod prelude {
    pub use crate::actions::{
        FragmentAction, PlanAction, RecordAction, SessionAction, TrainingAction,
    };
    pub use crate::environment::TrainingEnvironment;
    pub use crate::filter::SessionFilterSpec;
    pub use crate::model::{
        ActivityCategory, Level, MuscleGroup, PlanSessionFragment, SessionRating, TrainingPlan,
        TrainingRecord, TrainingSession, Visibility,
    };
    pub use crate::reducers::TrainingReducer;
    pub use crate::search::search_sessions;
    pub use crate::state::TrainingState;
}
