//! # FitSync Core
//!
//! Core traits and types for the FitSync state synchronization architecture.
//!
//! This crate provides the fundamental abstractions for mediating between UI
//! components and a remote data service using the Reducer pattern with
//! normalized entity stores.
//!
//! ## Core Concepts
//!
//! - **State**: a normalized, id-keyed slice per entity domain ([`entity::EntityMap`])
//!   plus per-operation request status ([`status::RequestStatus`])
//! - **Action**: a closed sum type per domain; every operation contributes a
//!   `Requested` / `Completed` / `Failed` triple
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions (not execution), including the two
//!   scheduling policies: [`effect::Effect::Serial`] for mutations and
//!   [`effect::Effect::Supersede`] for fetches
//! - **Environment**: injected collaborators via traits ([`service::EntityData`],
//!   [`environment::Clock`], [`environment::Notifier`])
//! - **Selector**: memoized read projections invalidated by slice epochs
//!   ([`selector::Selector`], [`selector::SelectorFamily`])
//!
//! ## Architecture Principles
//!
//! - Unidirectional data flow: dispatch → reduce → effects → terminal action
//! - Single writer: only reducers mutate state, only effects produce terminal
//!   actions
//! - Explicit effects (no hidden I/O), explicit memoization (no framework magic)
//! - Every collaborator failure normalized to one error shape
//!   ([`error::DataError`])

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

pub mod entity;
pub mod error;
pub mod query;
pub mod selector;
pub mod service;
pub mod status;

mod effect_macros;

/// Reducer module - the core trait for state transition logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They fold actions into entity-store state (normalization and status-flag
/// bookkeeping) and describe, but never perform, side effects.
pub mod reducer {
    use crate::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: the state slice this reducer operates on
    /// - `Action`: the action type this reducer processes
    /// - `Environment`: the injected collaborators this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for SessionsReducer {
    ///     type State = TrainingState;
    ///     type Action = SessionAction;
    ///     type Environment = TrainingEnvironment<S, P, F, R, N>;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut Self::State,
    ///         action: Self::Action,
    ///         env: &Self::Environment,
    ///     ) -> SmallVec<[Effect<Self::Action>; 4]> {
    ///         match action {
    ///             SessionAction::FetchAllRequested => {
    ///                 state.sessions.fetch.start();
    ///                 // return a Supersede effect calling env.sessions
    ///                 # unimplemented!()
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected collaborators
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Applies the action to state in place (normalization, status flags)
        /// 2. Returns effect descriptions to be executed by the runtime
        ///
        /// A `Requested` action must only flip status flags and describe work;
        /// the paired collection mutation happens when the matching terminal
        /// action comes back through this same function.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects describe side effects to be performed by the runtime. They are
/// values (not execution) and carry the scheduling policy for the operation
/// they represent.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Boxed future produced by an effect, resolving to an optional feedback
    /// action.
    pub type ActionFuture<Action> = Pin<Box<dyn Future<Output = Option<Action>> + Send>>;

    /// Scheduling key identifying a class of operations.
    ///
    /// Keys are static labels such as `"session.write"` or `"plan.fetch_all"`.
    /// [`Effect::Serial`] effects sharing a key execute strictly one at a time
    /// in submission order; [`Effect::Supersede`] effects sharing a key
    /// invalidate the pending result of any older in-flight effect.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct OpKey(pub &'static str);

    impl OpKey {
        /// The label backing this key.
        #[must_use]
        pub const fn as_str(self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Debug for OpKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "OpKey({})", self.0)
        }
    }

    impl std::fmt::Display for OpKey {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: the action type that effects can produce (feedback loop)
    ///
    /// # Scheduling
    ///
    /// - `Future` runs immediately and concurrently with everything else
    /// - `Serial` queues behind other `Serial` effects with the same key
    ///   (exclusive composition - used by mutations)
    /// - `Supersede` marks older same-key effects stale so their results are
    ///   dropped (latest-wins composition - used by fetches)
    #[allow(missing_docs)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (verification polling, debounce)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back into
        /// the reducer.
        Future(ActionFuture<Action>),

        /// Async computation serialized with same-key effects, in submission
        /// order. One `Serial` effect fully completes (including dispatch of
        /// its feedback action) before the next with the same key starts.
        Serial {
            /// Scheduling key (typically one per entity domain's write path)
            key: OpKey,
            /// The queued computation
            future: ActionFuture<Action>,
        },

        /// Async computation that supersedes same-key effects: launching a new
        /// one invalidates the result of any older in-flight effect with the
        /// same key, so stale fetch results never reach the store.
        Supersede {
            /// Scheduling key (typically one per fetch kind)
            key: OpKey,
            /// The computation whose result may be superseded
            future: ActionFuture<Action>,
        },
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Serial { key, .. } => {
                    f.debug_struct("Effect::Serial").field("key", key).finish_non_exhaustive()
                },
                Effect::Supersede { key, .. } => {
                    f.debug_struct("Effect::Supersede").field("key", key).finish_non_exhaustive()
                },
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async computation as a plain future effect
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Wrap an async computation as a serialized (exclusive) effect
        pub fn serial<F>(key: OpKey, fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Serial { key, future: Box::pin(fut) }
        }

        /// Wrap an async computation as a latest-wins effect
        pub fn supersede<F>(key: OpKey, fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Supersede { key, future: Box::pin(fut) }
        }
    }
}

/// Environment module - collaborator traits shared across domains
///
/// All external dependencies are abstracted behind traits and injected via the
/// Environment parameter of each reducer.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use fitsync_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let now = clock.now();
    /// assert!(now.timestamp() > 0);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Fire-and-forget transient user messaging.
    ///
    /// Workflow failure paths surface errors through this collaborator; it is
    /// not part of the store's correctness and implementations must not block.
    pub trait Notifier: Send + Sync {
        /// Show a transient message to the user.
        fn notify(&self, message: &str);
    }

    /// Notifier that forwards messages to the `tracing` log stream.
    ///
    /// Useful as a default in headless embeddings and tests.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LogNotifier;

    impl Notifier for LogNotifier {
        fn notify(&self, message: &str) {
            tracing_message(message);
        }
    }

    fn tracing_message(message: &str) {
        // Kept out of the trait impl so the macro's static callsite is
        // generated once.
        tracing::info!(target: "fitsync::notify", message);
    }
}
