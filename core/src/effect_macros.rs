//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when turning a data-access call into an
//! effect that resolves to exactly one terminal action. Every collaborator
//! error is routed through `on_failure`, so the effect itself can never throw
//! across the dispatch boundary.

/// Create an [`Effect::Serial`](crate::effect::Effect::Serial) from a
/// fallible async call.
///
/// # Example
///
/// ```rust,ignore
/// use fitsync_core::serial_call;
///
/// serial_call! {
///     key: keys::SESSION_WRITE,
///     call: { let sessions = env.sessions.clone(); async move { sessions.create(draft).await } },
///     on_success: |session| Some(SessionAction::CreateCompleted { session }),
///     on_failure: |error| Some(SessionAction::CreateFailed { error }),
/// }
/// ```
#[macro_export]
macro_rules! serial_call {
    (
        key: $key:expr,
        call: $call:expr,
        on_success: |$ok:ident| $ok_body:expr,
        on_failure: |$err:ident| $err_body:expr $(,)?
    ) => {{
        // Evaluate eagerly so the boxed future owns its collaborator clones
        // instead of borrowing the environment.
        let call_future = $call;
        $crate::effect::Effect::Serial {
            key: $key,
            future: ::std::boxed::Box::pin(async move {
                match call_future.await {
                    ::std::result::Result::Ok($ok) => $ok_body,
                    ::std::result::Result::Err($err) => $err_body,
                }
            }),
        }
    }};
}

/// Create an [`Effect::Supersede`](crate::effect::Effect::Supersede) from a
/// fallible async call.
///
/// # Example
///
/// ```rust,ignore
/// use fitsync_core::supersede_call;
///
/// supersede_call! {
///     key: keys::SESSION_FETCH_ALL,
///     call: { let sessions = env.sessions.clone(); async move { sessions.fetch_all().await } },
///     on_success: |sessions| Some(SessionAction::FetchAllCompleted { sessions }),
///     on_failure: |error| Some(SessionAction::FetchAllFailed { error }),
/// }
/// ```
#[macro_export]
macro_rules! supersede_call {
    (
        key: $key:expr,
        call: $call:expr,
        on_success: |$ok:ident| $ok_body:expr,
        on_failure: |$err:ident| $err_body:expr $(,)?
    ) => {{
        let call_future = $call;
        $crate::effect::Effect::Supersede {
            key: $key,
            future: ::std::boxed::Box::pin(async move {
                match call_future.await {
                    ::std::result::Result::Ok($ok) => $ok_body,
                    ::std::result::Result::Err($err) => $err_body,
                }
            }),
        }
    }};
}

/// Create a plain [`Effect::Future`](crate::effect::Effect::Future) from a
/// fallible async call.
#[macro_export]
macro_rules! future_call {
    (
        call: $call:expr,
        on_success: |$ok:ident| $ok_body:expr,
        on_failure: |$err:ident| $err_body:expr $(,)?
    ) => {{
        let call_future = $call;
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match call_future.await {
                ::std::result::Result::Ok($ok) => $ok_body,
                ::std::result::Result::Err($err) => $err_body,
            }
        }))
    }};
}
