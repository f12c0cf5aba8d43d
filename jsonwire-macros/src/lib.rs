//! Derive macros for jsonwire shapes and unions
//!
//! Both derives generate code against `::jsonwire_core`, so the deriving crate
//! must depend on `jsonwire-core` directly. They are re-exported from
//! `jsonwire_core` alongside the traits of the same name.
//!
//! # `#[derive(Shape)]`
//!
//! Builds the static directive table for a struct with named fields (or a unit
//! struct, for empty outputs). Each member becomes one table row:
//!
//! - the wire name is the member name in PascalCase (`role_arn` -> `RoleArn`)
//! - `Option<T>` members are optional; anything else is required on decode
//! - the member's type picks the coercion through `WireValue`
//!
//! Member attributes:
//!
//! - `#[wire(rename = "ARN")]`: explicit wire name
//! - `#[wire(alias = "message")]`: extra key accepted on decode, repeatable
//! - `#[wire(with = "path::to::module")]`: coerce through `module::encode` /
//!   `module::decode` instead of the type's own codec
//! - `#[wire(idempotency_token)]`: generate a token when the caller leaves the
//!   member empty (member must be `Option<String>`)
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq, Shape)]
//! pub struct CreateScheduleInput {
//!     pub name: String,
//!     pub target: Target,
//!     #[wire(idempotency_token)]
//!     pub client_token: Option<String>,
//! }
//! ```
//!
//! # `#[derive(Union)]`
//!
//! For enums whose variants each hold one value. The variant name is the wire
//! key unless renamed; exactly one variant marked `#[wire(unknown)]` holds
//! `UnknownVariant` for keys this client was not built with.
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq, Union)]
//! pub enum ScheduleExpression {
//!     Rate(RateExpression),
//!     Cron(CronExpression),
//!     #[wire(unknown)]
//!     Unknown(UnknownVariant),
//! }
//! ```

mod attrs;
mod shape;
mod union;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive `jsonwire_core::Shape` and `jsonwire_core::WireValue` for a struct
#[proc_macro_derive(Shape, attributes(wire))]
pub fn derive_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    shape::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `jsonwire_core::Union` and `jsonwire_core::WireValue` for an enum
#[proc_macro_derive(Union, attributes(wire))]
pub fn derive_union(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    union::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
