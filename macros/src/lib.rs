//! Derive macros for the FitSync framework
//!
//! This crate provides procedural macros to reduce boilerplate when building
//! entity-store domains with FitSync.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates phase helpers for action enums
//!   (requested/completed/failed)
//! - `#[derive(State)]` - Generates epoch helpers for state slices
//!
//! # Example
//!
//! ```ignore
//! use fitsync_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum SessionAction {
//!     #[request]
//!     CreateRequested { title: String },
//!
//!     #[completion]
//!     CreateCompleted { id: String },
//!
//!     #[failure]
//!     CreateFailed { error: String },
//! }
//!
//! // Generated methods:
//! assert!(SessionAction::CreateRequested { title: "x".into() }.is_request());
//! assert!(SessionAction::CreateCompleted { id: "1".into() }.is_terminal());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods reflecting the three-phase operation taxonomy:
/// - `is_request()` - true for `<Op>Requested` variants (the only phase UI
///   code may dispatch)
/// - `is_completion()` - true for `<Op>Completed` variants
/// - `is_failure()` - true for `<Op>Failed` variants
/// - `is_terminal()` - completion or failure (produced only by effects)
/// - `name()` - the variant name, for log/metric labels
///
/// # Attributes
///
/// - `#[request]` - Mark a variant as a request (intent)
/// - `#[completion]` - Mark a variant as a successful terminal phase
/// - `#[failure]` - Mark a variant as a failed terminal phase
///
/// Unmarked variants (e.g. a purge action) report `false` for all three
/// phase predicates.
///
/// # Panics
///
/// This macro produces a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant carries more than one phase attribute
#[proc_macro_derive(Action, attributes(request, completion, failure))]
#[allow(clippy::expect_used)] // Proc macro panics become compile errors, not runtime panics
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    // Collect variants by phase
    let mut request_variants = Vec::new();
    let mut completion_variants = Vec::new();
    let mut failure_variants = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let phases = [
            has_attribute(&variant.attrs, "request"),
            has_attribute(&variant.attrs, "completion"),
            has_attribute(&variant.attrs, "failure"),
        ];

        if phases.iter().filter(|p| **p).count() > 1 {
            return syn::Error::new_spanned(
                variant,
                "Variant can carry at most one of #[request], #[completion], #[failure]",
            )
            .to_compile_error()
            .into();
        }

        if phases[0] {
            request_variants.push(variant_name);
        }
        if phases[1] {
            completion_variants.push(variant_name);
        }
        if phases[2] {
            failure_variants.push(variant_name);
        }
    }

    // Build a map of variant names to their field shapes for arm generation
    let variant_map: std::collections::HashMap<_, _> = data_enum
        .variants
        .iter()
        .map(|v| (&v.ident, &v.fields))
        .collect();

    let arm = |variant: &&syn::Ident| {
        // SAFETY: variants were collected from data_enum.variants above
        let fields = variant_map.get(*variant).expect("variant must exist in map");
        match fields {
            Fields::Named(_) => quote! { Self::#variant { .. } => true, },
            Fields::Unnamed(_) => quote! { Self::#variant(..) => true, },
            Fields::Unit => quote! { Self::#variant => true, },
        }
    };

    let is_request_arms = request_variants.iter().map(arm);
    let is_completion_arms = completion_variants.iter().map(arm);
    let is_failure_arms = failure_variants.iter().map(arm);

    // Generate name() arms for every variant
    let name_arms = data_enum.variants.iter().map(|variant| {
        let variant_name = &variant.ident;
        let label = variant_name.to_string();
        match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } => #label, },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) => #label, },
            Fields::Unit => quote! { Self::#variant_name => #label, },
        }
    });

    let expanded = quote! {
        impl #name {
            /// Returns true if this action is a request (dispatchable intent)
            #[must_use]
            pub const fn is_request(&self) -> bool {
                match self {
                    #(#is_request_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is a successful terminal phase
            #[must_use]
            pub const fn is_completion(&self) -> bool {
                match self {
                    #(#is_completion_arms)*
                    _ => false,
                }
            }

            /// Returns true if this action is a failed terminal phase
            #[must_use]
            pub const fn is_failure(&self) -> bool {
                match self {
                    #(#is_failure_arms)*
                    _ => false,
                }
            }

            /// Returns true for either terminal phase (effect-produced only)
            #[must_use]
            pub const fn is_terminal(&self) -> bool {
                self.is_completion() || self.is_failure()
            }

            /// Returns the variant name for log and metric labels
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for State slices
///
/// Generates epoch helpers for the field marked `#[epoch]`:
/// - `epoch()` - the current version counter of this slice
/// - `touch()` - bump the counter, invalidating memoized selectors
///
/// Reducers call `touch()` on every mutation of the slice; selectors compare
/// `epoch()` against their cached value to decide whether to recompute.
///
/// # Attributes
///
/// - `#[epoch]` - Mark a `u64` field as the slice's version counter
///
/// # Panics
///
/// This macro produces a compile error (not a runtime panic) if applied to a
/// non-struct type.
#[proc_macro_derive(State, attributes(epoch))]
#[allow(clippy::expect_used)] // Proc macro panics become compile errors, not runtime panics
pub fn derive_state(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(State)] can only be used on structs")
            .to_compile_error()
            .into();
    };

    // Find the epoch field if present
    let epoch_field = data_struct
        .fields
        .iter()
        .find(|field| has_attribute(&field.attrs, "epoch"));

    let epoch_impl = if let Some(field) = epoch_field {
        // SAFETY: we only look at named struct fields
        let epoch_field_name = field.ident.as_ref().expect("struct field must have ident");
        quote! {
            impl #name {
                /// Get the current version counter of this slice
                #[must_use]
                pub const fn epoch(&self) -> u64 {
                    self.#epoch_field_name
                }

                /// Bump the version counter, invalidating memoized selectors
                pub const fn touch(&mut self) {
                    self.#epoch_field_name = self.#epoch_field_name.wrapping_add(1);
                }
            }
        }
    } else {
        quote! {}
    };

    let expanded = quote! {
        #epoch_impl
    };

    TokenStream::from(expanded)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
