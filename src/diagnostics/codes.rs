//! Stable diagnostic codes for the caller-info marker subsystem.
//!
//! Hosts key suppressions and documentation off these strings, so they must not
//! change between releases. Errors use `CIM1xx`, warnings `CIM2xx`.

/// Category tag carried by every marker diagnostic.
pub const CATEGORY: &str = "caller-info";

/// The owning parameter has no default value.
pub const E_MISSING_DEFAULT: &str = "CIM101";
/// The owning parameter is `ref`/`out` (or `in` without a default).
pub const E_BY_REF: &str = "CIM102";
/// The substituted value's natural type does not convert to the parameter type.
pub const E_TYPE_MISMATCH: &str = "CIM103";

/// `ArgumentExpression` names a parameter that does not exist.
pub const W_INVALID_TARGET: &str = "CIM201";
/// `ArgumentExpression` names its own parameter.
pub const W_SELF_REFERENTIAL: &str = "CIM202";
/// Marker lost to a higher-precedence marker on the same parameter.
pub const W_OVERRIDDEN: &str = "CIM203";
/// Marker sits on a member that can never receive optional arguments.
pub const W_NO_EFFECT_CONTEXT: &str = "CIM204";
/// Repeated `ArgumentExpression` markers where multiplicity is not allowed.
pub const W_DUPLICATE: &str = "CIM205";
