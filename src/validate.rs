//! Declaration-time validation of caller-info markers.
//!
//! Every marker ends up `Active`, `Suppressed` (inert at resolution, call
//! sites fall back to the default value), or `Rejected` (declaration error).
//! Validation is a pure function over the parameter list; diagnostics come
//! back as values and parameter order stays deterministic.

use tracing::debug;

use crate::diagnostics::{codes, Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::model::{MarkerKind, ParameterDeclaration, ParameterList, RefKind};

/// Why a marker is inert at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    SelfReferential,
    InvalidTargetName,
    /// Lost the precedence race; carries the winner's display name.
    OverriddenBy(String),
    /// The declaring member can never receive optional arguments.
    NoEffectContext,
    /// Earlier occurrence of a repeated `ArgumentExpression` marker.
    Duplicate,
    /// Malformed or foreign metadata; inert without a diagnostic.
    ForeignMetadata,
}

/// Post-validation state of a single marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerState {
    Active,
    Suppressed(SuppressReason),
    Rejected,
}

impl MarkerState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, MarkerState::Active)
    }
}

/// Result of validating one parameter list: a state per marker (outer index =
/// parameter, inner = marker declaration order) plus the diagnostics produced.
#[derive(Debug)]
pub struct Validation {
    states: Vec<Vec<MarkerState>>,
    diagnostics: Vec<Diagnostic>,
}

impl Validation {
    #[must_use]
    pub fn state(&self, parameter: usize, marker: usize) -> Option<&MarkerState> {
        self.states.get(parameter)?.get(marker)
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity.is_error())
    }

    /// The marker that fires for an omitted parameter, if any. At most one
    /// kind survives the collision pass; repeated `ArgumentExpression`
    /// markers resolve to the last declared occurrence.
    #[must_use]
    pub fn firing_marker<'a>(
        &self,
        index: usize,
        parameter: &'a ParameterDeclaration,
    ) -> Option<&'a MarkerKind> {
        let states = self.states.get(index)?;
        parameter
            .markers
            .iter()
            .zip(states)
            .rev()
            .find(|(_, state)| state.is_active())
            .map(|(marker, _)| &marker.kind)
    }

    /// Whether this parameter's own `ArgumentExpression` marker was
    /// suppressed as self-referential or invalid-name. Parameters in that
    /// state poison substitution for any sibling that targets them: the
    /// sibling falls back to its default value with no further diagnostic.
    #[must_use]
    pub fn expression_marker_suppressed(&self, index: usize, parameter: &ParameterDeclaration) -> bool {
        let Some(states) = self.states.get(index) else {
            return false;
        };
        parameter
            .markers
            .iter()
            .zip(states)
            .any(|(marker, state)| {
                matches!(marker.kind, MarkerKind::ArgumentExpression(_))
                    && matches!(
                        state,
                        MarkerState::Suppressed(
                            SuppressReason::SelfReferential | SuppressReason::InvalidTargetName
                        )
                    )
            })
    }
}

/// Validate every marker on every parameter of a declaration.
#[must_use]
pub fn validate_parameters(list: &ParameterList) -> Validation {
    let mut sink = DiagnosticSink::default();
    let mut states = Vec::with_capacity(list.len());
    for parameter in list.parameters() {
        let mut parameter_states: Vec<MarkerState> = parameter
            .markers
            .iter()
            .map(|marker| validate_marker(list, parameter, &marker.kind, marker.span, &mut sink))
            .collect();
        apply_precedence(list, parameter, &mut parameter_states, &mut sink);
        apply_context(list, parameter, &mut parameter_states, &mut sink);
        states.push(parameter_states);
    }
    let validation = Validation {
        states,
        diagnostics: sink.into_vec(),
    };
    debug!(
        member = list.member.member_name(),
        parameters = list.len(),
        diagnostics = validation.diagnostics.len(),
        "validated caller-info markers"
    );
    validation
}

fn validate_marker(
    list: &ParameterList,
    parameter: &ParameterDeclaration,
    kind: &MarkerKind,
    span: Option<crate::diagnostics::Span>,
    sink: &mut DiagnosticSink,
) -> MarkerState {
    if matches!(kind, MarkerKind::Unknown) {
        return MarkerState::Suppressed(SuppressReason::ForeignMetadata);
    }

    // Rules 1-2: the owning parameter must be optional, and by-ref forms are
    // invalid unless they carry a default value (`out` never does).
    match parameter.ref_kind {
        RefKind::Out => {
            sink.push(
                Diagnostic::error(
                    format!(
                        "the {} marker cannot be applied to out parameter '{}'",
                        kind.display_name(),
                        parameter.name
                    ),
                    span,
                )
                .with_code(DiagnosticCode::marker(codes::E_BY_REF)),
            );
            return MarkerState::Rejected;
        }
        // COM-style pseudo-optional `ref` parameters carry a default and are
        // legal owners; `ref` without one is not.
        RefKind::Ref | RefKind::In if !parameter.has_default() => {
            sink.push(
                Diagnostic::error(
                    format!(
                        "the {} marker cannot be applied to {} parameter '{}' without a default value",
                        kind.display_name(),
                        parameter.ref_kind.as_str(),
                        parameter.name
                    ),
                    span,
                )
                .with_code(DiagnosticCode::marker(codes::E_BY_REF)),
            );
            return MarkerState::Rejected;
        }
        _ => {}
    }
    if !parameter.has_default() {
        sink.push(
            Diagnostic::error(
                format!(
                    "the {} marker on parameter '{}' requires the parameter to have a default value",
                    kind.display_name(),
                    parameter.name
                ),
                span,
            )
            .with_code(DiagnosticCode::marker(codes::E_MISSING_DEFAULT)),
        );
        return MarkerState::Rejected;
    }

    // Rule 3: the substitution's natural type must reach the declared type.
    let (natural, convertible) = match kind {
        MarkerKind::LineNumber => ("int", parameter.ty.accepts_int()),
        _ => ("string", parameter.ty.accepts_string()),
    };
    if !convertible {
        sink.push(
            Diagnostic::error(
                format!(
                    "the {} marker on parameter '{}' produces a value of type '{natural}', which does not convert to the parameter type '{}'",
                    kind.display_name(),
                    parameter.name,
                    parameter.ty.display_name()
                ),
                span,
            )
            .with_code(DiagnosticCode::marker(codes::E_TYPE_MISMATCH)),
        );
        return MarkerState::Rejected;
    }

    // Rules 4-5: self-reference and unknown target names disable the marker
    // but keep the declaration compiling.
    if let MarkerKind::ArgumentExpression(target) = kind {
        if target == &parameter.name {
            sink.push(
                Diagnostic::warning(
                    format!(
                        "the CallerArgumentExpression marker on parameter '{}' will have no effect because it is self-referential",
                        parameter.name
                    ),
                    span,
                )
                .with_code(DiagnosticCode::marker(codes::W_SELF_REFERENTIAL)),
            );
            return MarkerState::Suppressed(SuppressReason::SelfReferential);
        }
        if list.find(target).is_none() {
            sink.push(
                Diagnostic::warning(
                    format!(
                        "the CallerArgumentExpression marker on parameter '{}' will have no effect: '{target}' is not a parameter of the declaring member",
                        parameter.name
                    ),
                    span,
                )
                .with_code(DiagnosticCode::marker(codes::W_INVALID_TARGET)),
            );
            return MarkerState::Suppressed(SuppressReason::InvalidTargetName);
        }
    }

    MarkerState::Active
}

/// Rule 6: when distinct marker kinds collide on one parameter, only the
/// highest-precedence kind stays active. The override warning is reported for
/// every loser, even one already rejected for a type mismatch, so swapping
/// attribute order never changes the outcome.
fn apply_precedence(
    list: &ParameterList,
    parameter: &ParameterDeclaration,
    states: &mut [MarkerState],
    sink: &mut DiagnosticSink,
) {
    let winner = parameter
        .markers
        .iter()
        .map(|marker| marker.kind.precedence())
        .min()
        .unwrap_or(u8::MAX);
    if winner == u8::MAX {
        return;
    }
    let winner_name = parameter
        .markers
        .iter()
        .find(|marker| marker.kind.precedence() == winner)
        .map(|marker| marker.kind.display_name())
        .unwrap_or_default();

    for (marker, state) in parameter.markers.iter().zip(states.iter_mut()) {
        if matches!(marker.kind, MarkerKind::Unknown) || marker.kind.precedence() == winner {
            continue;
        }
        sink.push(
            Diagnostic::warning(
                format!(
                    "the {} marker on parameter '{}' will have no effect: it is overridden by the {winner_name} marker",
                    marker.kind.display_name(),
                    parameter.name
                ),
                marker.span,
            )
            .with_code(DiagnosticCode::marker(codes::W_OVERRIDDEN)),
        );
        if state.is_active() {
            *state = MarkerState::Suppressed(SuppressReason::OverriddenBy(
                winner_name.to_string(),
            ));
        }
    }

    // Repeated `ArgumentExpression` markers: the last declared one is used.
    // Without explicit multiplicity support that repetition is diagnosed.
    let expression_indices: Vec<usize> = parameter
        .markers
        .iter()
        .enumerate()
        .filter(|(_, marker)| matches!(marker.kind, MarkerKind::ArgumentExpression(_)))
        .map(|(index, _)| index)
        .collect();
    if expression_indices.len() > 1 {
        for &index in &expression_indices[..expression_indices.len() - 1] {
            if !states[index].is_active() {
                continue;
            }
            if !list.allows_marker_multiplicity {
                sink.push(
                    Diagnostic::warning(
                        format!(
                            "repeated CallerArgumentExpression marker on parameter '{}'; only the last occurrence is used",
                            parameter.name
                        ),
                        parameter.markers[index].span,
                    )
                    .with_code(DiagnosticCode::marker(codes::W_DUPLICATE)),
                );
            }
            states[index] = MarkerState::Suppressed(SuppressReason::Duplicate);
        }
    }
}

/// Rule 7: members that can never receive optional arguments (partial
/// definitions, abstract-only members) make every surviving marker inert.
fn apply_context(
    list: &ParameterList,
    parameter: &ParameterDeclaration,
    states: &mut [MarkerState],
    sink: &mut DiagnosticSink,
) {
    if !list.context.forbids_optional_arguments() {
        return;
    }
    for (marker, state) in parameter.markers.iter().zip(states.iter_mut()) {
        if !state.is_active() {
            continue;
        }
        sink.push(
            Diagnostic::warning(
                format!(
                    "the {} marker on parameter '{}' will have no effect: the declaring member never receives optional arguments",
                    marker.kind.display_name(),
                    parameter.name
                ),
                marker.span,
            )
            .with_code(DiagnosticCode::marker(codes::W_NO_EFFECT_CONTEXT)),
        );
        *state = MarkerState::Suppressed(SuppressReason::NoEffectContext);
    }
}
