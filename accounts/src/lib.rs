//! # FitSync Accounts
//!
//! User profile state and authentication workflows.
//!
//! The authentication flows (sign-up, sign-in, third-party, logout,
//! password reset) run as an explicit finite-state machine
//! ([`state::AuthPhase`]) with a flow-generation counter: cancelled or
//! superseded flows can never apply stragglers to state. The stored
//! profile ([`model::PublicUser`]) is created or refreshed as a workflow
//! step and mutated afterwards through regular serialized updates.
//!
//! ## Wiring
//!
//! ```ignore
//! use fitsync_runtime::Store;
//! use fitsync_accounts::prelude::*;
//!
//! let env = AccountsEnvironment::new(gateway, users, notifier, clock);
//! let store = Store::new(AccountsState::default(), AccountsReducer::new(), env);
//!
//! store.send(AccountsAction::SignInRequested {
//!     email: "casey@example.com".into(),
//!     password: secret,
//! }).await?;
//! ```

pub mod actions;
pub mod environment;
pub mod keys;
pub mod mocks;
pub mod model;
pub mod providers;
pub mod reducer;
pub mod selectors;
pub mod state;

/// Everything an embedding application usually needs.
pub mod prelude {
    pub use crate::actions::AccountsAction;
    pub use crate::environment::AccountsEnvironment;
    pub use crate::model::{AuthUser, PublicUser, ThirdPartyProvider, UserId};
    pub use crate::providers::AuthGateway;
    pub use crate::reducer::AccountsReducer;
    pub use crate::state::{AccountsState, AuthPhase};
}
