//! Parameter metadata model: declarations, caller-info markers, and the
//! enclosing-member context used for member-name substitution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Span;

/// Passing mode of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefKind {
    Value,
    Ref,
    Out,
    In,
}

impl RefKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RefKind::Value => "by-value",
            RefKind::Ref => "ref",
            RefKind::Out => "out",
            RefKind::In => "in",
        }
    }
}

/// Semantic type of a parameter, reduced to what marker conversion checking
/// needs. Everything the checker has no special rules for lands in `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    String,
    Object,
    Boolean,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Nullable(Box<ParamType>),
    Named(String),
}

impl ParamType {
    /// Whether a string-valued substitution converts to this type implicitly.
    #[must_use]
    pub fn accepts_string(&self) -> bool {
        match self {
            ParamType::String | ParamType::Object => true,
            ParamType::Nullable(inner) => inner.accepts_string(),
            _ => false,
        }
    }

    /// Whether an `int`-valued substitution converts to this type implicitly:
    /// identity, widening to `long`/`float`/`double`, `decimal`, boxing to
    /// `object`, and the nullable forms of each.
    #[must_use]
    pub fn accepts_int(&self) -> bool {
        match self {
            ParamType::Object
            | ParamType::Int32
            | ParamType::Int64
            | ParamType::Float32
            | ParamType::Float64
            | ParamType::Decimal => true,
            ParamType::Nullable(inner) => inner.accepts_int(),
            _ => false,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Object => "object".to_string(),
            ParamType::Boolean => "bool".to_string(),
            ParamType::Char => "char".to_string(),
            ParamType::Int8 => "sbyte".to_string(),
            ParamType::UInt8 => "byte".to_string(),
            ParamType::Int16 => "short".to_string(),
            ParamType::UInt16 => "ushort".to_string(),
            ParamType::Int32 => "int".to_string(),
            ParamType::UInt32 => "uint".to_string(),
            ParamType::Int64 => "long".to_string(),
            ParamType::UInt64 => "ulong".to_string(),
            ParamType::Float32 => "float".to_string(),
            ParamType::Float64 => "double".to_string(),
            ParamType::Decimal => "decimal".to_string(),
            ParamType::Nullable(inner) => format!("{}?", inner.display_name()),
            ParamType::Named(name) => name.clone(),
        }
    }
}

/// Declared default value, kept with enough structure for fallback
/// substitution without re-parsing the declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// The kind of a caller-info marker.
///
/// Malformed or foreign metadata decodes to `Unknown`, which is inert
/// everywhere: no diagnostics, no substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    ArgumentExpression(String),
    MemberName,
    LineNumber,
    FilePath,
    Unknown,
}

impl MarkerKind {
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            MarkerKind::ArgumentExpression(_) => "CallerArgumentExpression",
            MarkerKind::MemberName => "CallerMemberName",
            MarkerKind::LineNumber => "CallerLineNumber",
            MarkerKind::FilePath => "CallerFilePath",
            MarkerKind::Unknown => "<unknown marker>",
        }
    }

    /// Precedence rank when distinct marker kinds collide on one parameter.
    /// Lower wins: `LineNumber` > `MemberName` > `FilePath` > `ArgumentExpression`.
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            MarkerKind::LineNumber => 0,
            MarkerKind::MemberName => 1,
            MarkerKind::FilePath => 2,
            MarkerKind::ArgumentExpression(_) => 3,
            MarkerKind::Unknown => u8::MAX,
        }
    }
}

/// A caller-info marker attached to a parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerInfoMarker {
    pub kind: MarkerKind,
    pub span: Option<Span>,
}

impl CallerInfoMarker {
    #[must_use]
    pub fn new(kind: MarkerKind) -> Self {
        Self { kind, span: None }
    }

    #[must_use]
    pub fn with_span(kind: MarkerKind, span: Span) -> Self {
        Self {
            kind,
            span: Some(span),
        }
    }
}

/// Attribute the resolver does not interpret (e.g. `[Optional]`,
/// `[DefaultParameterValue]`). Carried through untouched; never interacts
/// with markers except via the explicit precedence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueAttribute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    pub name: String,
    pub name_span: Option<Span>,
    pub ty: ParamType,
    pub ref_kind: RefKind,
    pub default: Option<DefaultValue>,
    pub markers: Vec<CallerInfoMarker>,
    pub attributes: Vec<OpaqueAttribute>,
    /// Appended by delegate-signature reshaping (`callback`, `state`,
    /// `result`); never a valid marker target.
    pub synthetic: bool,
}

impl ParameterDeclaration {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            name_span: None,
            ty,
            ref_kind: RefKind::Value,
            default: None,
            markers: Vec::new(),
            attributes: Vec::new(),
            synthetic: false,
        }
    }

    #[must_use]
    pub fn with_ref_kind(mut self, ref_kind: RefKind) -> Self {
        self.ref_kind = ref_kind;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_marker(mut self, marker: CallerInfoMarker) -> Self {
        self.markers.push(marker);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: OpaqueAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    #[must_use]
    pub fn has_markers(&self) -> bool {
        self.markers.iter().any(|m| m.kind != MarkerKind::Unknown)
    }
}

/// Description of the member enclosing a call site, for `MemberName`
/// substitution. Lambdas and local functions carry their nearest enclosing
/// named member rather than a synthetic name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberContext {
    Method { name: String },
    Constructor { is_static: bool },
    PropertyAccessor { property: String },
    IndexerAccessor { property: String },
    Operator { metadata_name: String },
    EventAccessor { event: String },
    FieldInitializer { field: String },
    PropertyInitializer { property: String },
    Lambda { enclosing: Box<MemberContext> },
    LocalFunction { enclosing: Box<MemberContext> },
}

impl MemberContext {
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        MemberContext::Method { name: name.into() }
    }

    /// Simple name substituted for `CallerMemberName`.
    #[must_use]
    pub fn member_name(&self) -> &str {
        match self {
            MemberContext::Method { name } => name,
            MemberContext::Constructor { is_static: false } => ".ctor",
            MemberContext::Constructor { is_static: true } => ".cctor",
            MemberContext::PropertyAccessor { property }
            | MemberContext::IndexerAccessor { property }
            | MemberContext::PropertyInitializer { property } => property,
            MemberContext::Operator { metadata_name } => metadata_name,
            MemberContext::EventAccessor { event } => event,
            MemberContext::FieldInitializer { field } => field,
            MemberContext::Lambda { enclosing } | MemberContext::LocalFunction { enclosing } => {
                enclosing.member_name()
            }
        }
    }
}

/// Declaration context the parameter list belongs to. Some contexts can never
/// receive optional arguments, which makes every marker inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeclarationContext {
    #[default]
    Ordinary,
    /// Defining declaration of a partial member (no implementation part).
    PartialDefinition,
    /// Interface or abstract member that is only ever used abstractly.
    AbstractOnly,
}

impl DeclarationContext {
    #[must_use]
    pub fn forbids_optional_arguments(self) -> bool {
        !matches!(self, DeclarationContext::Ordinary)
    }
}

/// An ordered parameter list plus the name→index map built once at
/// construction. The map skips synthetic parameters, so reshaped delegate
/// signatures never expose `callback`/`state`/`result` as marker targets.
#[derive(Debug, Clone)]
pub struct ParameterList {
    parameters: Vec<ParameterDeclaration>,
    index: HashMap<String, usize>,
    pub member: MemberContext,
    pub context: DeclarationContext,
    /// Whether the declaring marker attribute allows multiple
    /// `ArgumentExpression` occurrences on one parameter.
    pub allows_marker_multiplicity: bool,
}

impl ParameterList {
    #[must_use]
    pub fn new(parameters: Vec<ParameterDeclaration>, member: MemberContext) -> Self {
        let index = build_index(&parameters);
        Self {
            parameters,
            index,
            member,
            context: DeclarationContext::default(),
            allows_marker_multiplicity: false,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: DeclarationContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_marker_multiplicity(mut self) -> Self {
        self.allows_marker_multiplicity = true;
        self
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParameterDeclaration] {
        &self.parameters
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Order-independent lookup by declared name. Synthetic parameters are
    /// not found here.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(usize, &ParameterDeclaration)> {
        let index = *self.index.get(name)?;
        Some((index, &self.parameters[index]))
    }

    /// Positional lookup by name, including synthetic parameters; used by the
    /// binder for named-argument mapping.
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p.name == name)
    }
}

fn build_index(parameters: &[ParameterDeclaration]) -> HashMap<String, usize> {
    parameters
        .iter()
        .enumerate()
        .filter(|(_, parameter)| !parameter.synthetic)
        .map(|(position, parameter)| (parameter.name.clone(), position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lookup_is_order_independent() {
        let list = ParameterList::new(
            vec![
                ParameterDeclaration::new("p", ParamType::Int32),
                ParameterDeclaration::new("arg", ParamType::String),
            ],
            MemberContext::method("Log"),
        );
        assert_eq!(list.find("arg").map(|(i, _)| i), Some(1));
        assert_eq!(list.find("p").map(|(i, _)| i), Some(0));
        assert!(list.find("missing").is_none());
    }

    #[test]
    fn synthetic_parameters_are_invisible_to_marker_lookup() {
        let mut callback = ParameterDeclaration::new("callback", ParamType::Named("AsyncCallback".into()));
        callback.synthetic = true;
        let list = ParameterList::new(
            vec![ParameterDeclaration::new("p", ParamType::Int32), callback],
            MemberContext::method("Invoke"),
        );
        assert!(list.find("callback").is_none());
        assert_eq!(list.position_of("callback"), Some(1));
    }

    #[test]
    fn member_name_resolves_through_lambdas_to_named_member() {
        let ctx = MemberContext::Lambda {
            enclosing: Box::new(MemberContext::LocalFunction {
                enclosing: Box::new(MemberContext::method("Outer")),
            }),
        };
        assert_eq!(ctx.member_name(), "Outer");
    }

    #[test]
    fn accessor_contexts_use_owning_member_names() {
        let property = MemberContext::PropertyAccessor {
            property: "Count".into(),
        };
        assert_eq!(property.member_name(), "Count");
        let ctor = MemberContext::Constructor { is_static: false };
        assert_eq!(ctor.member_name(), ".ctor");
        let op = MemberContext::Operator {
            metadata_name: "op_Addition".into(),
        };
        assert_eq!(op.member_name(), "op_Addition");
    }

    #[test]
    fn line_number_conversions_cover_widening_nullable_and_boxing() {
        assert!(ParamType::Int32.accepts_int());
        assert!(ParamType::Int64.accepts_int());
        assert!(ParamType::Float64.accepts_int());
        assert!(ParamType::Decimal.accepts_int());
        assert!(ParamType::Object.accepts_int());
        assert!(ParamType::Nullable(Box::new(ParamType::Int32)).accepts_int());
        assert!(!ParamType::Int16.accepts_int());
        assert!(!ParamType::UInt32.accepts_int());
        assert!(!ParamType::String.accepts_int());
    }

    #[test]
    fn string_conversions_allow_object_and_nullable_string() {
        assert!(ParamType::String.accepts_string());
        assert!(ParamType::Object.accepts_string());
        assert!(!ParamType::Int32.accepts_string());
        assert!(!ParamType::Named("Uri".into()).accepts_string());
    }
}
