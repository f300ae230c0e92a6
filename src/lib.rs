#![deny(warnings)]
#![deny(clippy::all, clippy::pedantic, clippy::perf, clippy::suspicious)] // Catch correctness + perf + suspicious patterns early.
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

//! Caller-info marker resolution for C#-style language front ends.
//!
//! Given a member's parameter list, the markers attached to its parameters
//! (`CallerArgumentExpression`, `CallerMemberName`, `CallerLineNumber`,
//! `CallerFilePath`), and a concrete call site, this crate decides what value is
//! substituted for each omitted parameter. Declarations are validated once
//! ([`validate::validate_parameters`]), call sites are bound once
//! ([`binder::bind_call`]), and resolution ([`resolve::resolve_call`]) is total:
//! by the time a call is bound, every marker's validity is already known.

pub mod binder;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod line_map;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod resolve;
pub mod validate;

pub use binder::{
    bind_call, reshape_parameters, BoundArgument, CallArgument, CallExpression, CallForm,
};
pub use error::{Error, Result};
pub use line_map::{DirectiveKind, LineDirective, LineMap, MappedLocation};
pub use model::{
    CallerInfoMarker, DeclarationContext, DefaultValue, MarkerKind, MemberContext,
    OpaqueAttribute, ParamType, ParameterDeclaration, ParameterList, RefKind,
};
pub use resolve::{resolve_call, ResolveContext, ResolvedArgument, ResolvedCall};
pub use validate::{validate_parameters, MarkerState, SuppressReason, Validation};
