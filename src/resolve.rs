//! Per-call resolution of omitted caller-marked parameters.
//!
//! By this point declaration validity is settled, so resolution is total:
//! every parameter resolves to the supplied value, a substituted literal, or
//! the declared default. Nothing here can fail or emit diagnostics.

use tracing::trace;

use crate::binder::{BoundArgument, CallExpression};
use crate::diagnostics::SourceFile;
use crate::extract;
use crate::line_map::LineMap;
use crate::model::{DefaultValue, MarkerKind, ParameterList};
use crate::validate::Validation;

/// Source context a call site resolves against.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub file: &'a SourceFile,
    pub line_map: &'a LineMap,
}

/// Final value of one declared parameter at one call site.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedArgument {
    /// The caller supplied the argument; its own expression is used.
    Supplied,
    /// Marker-substituted string literal (expression text, member name, or
    /// file path).
    Text(String),
    /// Marker-substituted line number.
    Line(u32),
    /// The parameter's declared default value.
    Default(DefaultValue),
}

/// A fully resolved call: one entry per declared parameter, in declaration
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    pub arguments: Vec<ResolvedArgument>,
}

impl ResolvedCall {
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<&ResolvedArgument> {
        self.arguments.get(index)
    }
}

/// Resolve every parameter of a bound call.
///
/// For each omitted parameter, the highest-precedence active marker fires;
/// suppressed and rejected markers behave as absent. An `ArgumentExpression`
/// whose target was omitted, or whose target's own expression marker was
/// suppressed, falls back to the owner's declared default — never the
/// target's default and never a recursive re-resolution.
#[must_use]
pub fn resolve_call(
    list: &ParameterList,
    validation: &Validation,
    call: &CallExpression,
    ctx: &ResolveContext<'_>,
) -> ResolvedCall {
    let arguments = list
        .parameters()
        .iter()
        .enumerate()
        .map(|(index, parameter)| {
            let binding = call
                .binding(index)
                .copied()
                .unwrap_or(BoundArgument::Omitted);
            if binding.is_supplied() {
                return ResolvedArgument::Supplied;
            }
            match validation.firing_marker(index, parameter) {
                Some(MarkerKind::ArgumentExpression(target)) => {
                    resolve_expression_marker(list, validation, call, ctx, index, target)
                }
                Some(MarkerKind::MemberName) => {
                    ResolvedArgument::Text(list.member.member_name().to_string())
                }
                Some(MarkerKind::LineNumber) => {
                    match extract::line_number(ctx.file, ctx.line_map, call.call_span.start) {
                        Some(line) => ResolvedArgument::Line(line),
                        None => default_of(list, index),
                    }
                }
                Some(MarkerKind::FilePath) => ResolvedArgument::Text(extract::file_path(
                    ctx.file,
                    ctx.line_map,
                    call.call_span.start,
                )),
                Some(MarkerKind::Unknown) | None => default_of(list, index),
            }
        })
        .collect();
    trace!(
        member = list.member.member_name(),
        "resolved call-site substitutions"
    );
    ResolvedCall { arguments }
}

fn resolve_expression_marker(
    list: &ParameterList,
    validation: &Validation,
    call: &CallExpression,
    ctx: &ResolveContext<'_>,
    owner: usize,
    target: &str,
) -> ResolvedArgument {
    let Some((target_index, target_parameter)) = list.find(target) else {
        // An active marker always has a live target; be defensive anyway.
        return default_of(list, owner);
    };
    // A target whose own expression marker was suppressed (self-referential
    // or invalid-name) poisons substitution: fall back silently.
    if validation.expression_marker_suppressed(target_index, target_parameter) {
        return default_of(list, owner);
    }
    match call.binding(target_index) {
        Some(BoundArgument::Supplied { span }) => {
            ResolvedArgument::Text(extract::expression_text(ctx.file, *span).to_string())
        }
        _ => default_of(list, owner),
    }
}

fn default_of(list: &ParameterList, index: usize) -> ResolvedArgument {
    let default = list
        .parameters()
        .get(index)
        .and_then(|parameter| parameter.default.clone())
        .unwrap_or(DefaultValue::Null);
    ResolvedArgument::Default(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{bind_call, CallArgument};
    use crate::diagnostics::{FileId, Span};
    use crate::model::{
        CallerInfoMarker, MemberContext, ParamType, ParameterDeclaration, ParameterList,
    };
    use crate::validate::validate_parameters;
    use std::path::PathBuf;

    fn source_file(source: &str) -> SourceFile {
        SourceFile::new(FileId(0), PathBuf::from("src/program.cm"), source.to_string())
    }

    fn marked_list() -> ParameterList {
        ParameterList::new(
            vec![
                ParameterDeclaration::new("p", ParamType::Int32),
                ParameterDeclaration::new("arg", ParamType::String)
                    .with_default(DefaultValue::Str("<default-arg>".into()))
                    .with_marker(CallerInfoMarker::new(MarkerKind::ArgumentExpression(
                        "p".into(),
                    ))),
            ],
            MemberContext::method("Log"),
        )
    }

    #[test]
    fn supplied_target_substitutes_its_exact_source_text() {
        // Scenario A: Log(123) => arg == "123".
        let source = "Log(123);";
        let file = source_file(source);
        let list = marked_list();
        let validation = validate_parameters(&list);
        let call = bind_call(
            &list,
            &[CallArgument::positional(Span::in_file(FileId(0), 4, 7))],
            Span::in_file(FileId(0), 0, source.len()),
        )
        .unwrap();
        let resolved = resolve_call(
            &list,
            &validation,
            &call,
            &ResolveContext {
                file: &file,
                line_map: &LineMap::default(),
            },
        );
        assert_eq!(resolved.argument(0), Some(&ResolvedArgument::Supplied));
        assert_eq!(
            resolved.argument(1),
            Some(&ResolvedArgument::Text("123".to_string()))
        );
    }

    #[test]
    fn member_name_marker_substitutes_the_enclosing_member() {
        let file = source_file("Report();");
        let list = ParameterList::new(
            vec![ParameterDeclaration::new("name", ParamType::String)
                .with_default(DefaultValue::Str(String::new()))
                .with_marker(CallerInfoMarker::new(MarkerKind::MemberName))],
            MemberContext::method("Caller"),
        );
        let validation = validate_parameters(&list);
        let call = bind_call(&list, &[], Span::in_file(FileId(0), 0, 8)).unwrap();
        let resolved = resolve_call(
            &list,
            &validation,
            &call,
            &ResolveContext {
                file: &file,
                line_map: &LineMap::default(),
            },
        );
        assert_eq!(
            resolved.argument(0),
            Some(&ResolvedArgument::Text("Caller".to_string()))
        );
    }

    #[test]
    fn line_and_file_markers_use_the_call_span() {
        let source = "x();\ny();\nTrace();\n";
        let file = source_file(source);
        let offset = source.find("Trace").unwrap();
        let list = ParameterList::new(
            vec![
                ParameterDeclaration::new("line", ParamType::Int32)
                    .with_default(DefaultValue::Int(-1))
                    .with_marker(CallerInfoMarker::new(MarkerKind::LineNumber)),
                ParameterDeclaration::new("path", ParamType::String)
                    .with_default(DefaultValue::Str(String::new()))
                    .with_marker(CallerInfoMarker::new(MarkerKind::FilePath)),
            ],
            MemberContext::method("Trace"),
        );
        let validation = validate_parameters(&list);
        let call = bind_call(
            &list,
            &[],
            Span::in_file(FileId(0), offset, offset + 7),
        )
        .unwrap();
        let resolved = resolve_call(
            &list,
            &validation,
            &call,
            &ResolveContext {
                file: &file,
                line_map: &LineMap::default(),
            },
        );
        assert_eq!(resolved.argument(0), Some(&ResolvedArgument::Line(3)));
        assert_eq!(
            resolved.argument(1),
            Some(&ResolvedArgument::Text("src/program.cm".to_string()))
        );
    }

    #[test]
    fn omitted_target_falls_back_to_the_owners_default() {
        // P1: the owner's literal default, never the target's default.
        let source = "Log();";
        let file = source_file(source);
        let mut list = marked_list();
        // Give the target its own default so omission of both is legal.
        let mut parameters = list.parameters().to_vec();
        parameters[0] = parameters[0].clone().with_default(DefaultValue::Int(42));
        list = ParameterList::new(parameters, MemberContext::method("Log"));
        let validation = validate_parameters(&list);
        let call = bind_call(&list, &[], Span::in_file(FileId(0), 0, 5)).unwrap();
        let resolved = resolve_call(
            &list,
            &validation,
            &call,
            &ResolveContext {
                file: &file,
                line_map: &LineMap::default(),
            },
        );
        assert_eq!(
            resolved.argument(1),
            Some(&ResolvedArgument::Default(DefaultValue::Str(
                "<default-arg>".into()
            )))
        );
    }

    #[test]
    fn suppressed_target_marker_poisons_substitution_even_when_supplied() {
        // The target's own marker is self-referential; a sibling referring to
        // that target falls back to its default although the target was
        // supplied, with no extra diagnostic.
        let source = "M(123);";
        let file = source_file(source);
        let list = ParameterList::new(
            vec![
                ParameterDeclaration::new("p", ParamType::String)
                    .with_default(DefaultValue::Str("p_default".into()))
                    .with_marker(CallerInfoMarker::new(MarkerKind::ArgumentExpression(
                        "p".into(),
                    ))),
                ParameterDeclaration::new("q", ParamType::String)
                    .with_default(DefaultValue::Str("q_default".into()))
                    .with_marker(CallerInfoMarker::new(MarkerKind::ArgumentExpression(
                        "p".into(),
                    ))),
            ],
            MemberContext::method("M"),
        );
        let validation = validate_parameters(&list);
        assert_eq!(validation.diagnostics().len(), 1); // only the self-reference warning
        let call = bind_call(
            &list,
            &[CallArgument::positional(Span::in_file(FileId(0), 2, 5))],
            Span::in_file(FileId(0), 0, 6),
        )
        .unwrap();
        let resolved = resolve_call(
            &list,
            &validation,
            &call,
            &ResolveContext {
                file: &file,
                line_map: &LineMap::default(),
            },
        );
        // P4: the supplied value itself is used normally for `p`.
        assert_eq!(resolved.argument(0), Some(&ResolvedArgument::Supplied));
        assert_eq!(
            resolved.argument(1),
            Some(&ResolvedArgument::Default(DefaultValue::Str(
                "q_default".into()
            )))
        );
    }
}
