use proc_macro::TokenStream;

mod copyable;
mod helper;
mod ty;

/// Generate an inherent `copy(&self) -> Self` method.
///
/// Type-level options:
/// - `#[copy(exclude = "a, b")]` leaves the named fields at their default
/// - `#[copy(version = "revision")]` names the version field, which is never copied
/// - `#[copy(method = "duplicate")]` renames the generated method
///
/// Field-level options:
/// - `#[copy(skip)]` treats the field as transient
/// - `#[copy(version)]` marks the version field
/// - `#[copy(deep)]` copies the value (or each element) through its own copy method
///
/// The type must implement `Default`; the generated method starts from the
/// default value and fills in every participating field.
#[proc_macro_derive(Copyable, attributes(copy))]
pub fn derive_copyable(input: TokenStream) -> TokenStream {
    copyable::derive_copyable(input.into()).into()
}
