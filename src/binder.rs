//! Call-site binding: mapping supplied arguments onto declared parameters.
//!
//! The callable is already overload-resolved by the host; this stage only
//! decides, per declared parameter, "supplied with this source span" or
//! "omitted". Delegate `BeginInvoke`/`EndInvoke` call forms reshape the
//! parameter list before binding, so markers whose targets vanish in the
//! reshaped signature become invalid-name for that form specifically.

use tracing::trace;

use crate::diagnostics::Span;
use crate::error::{Error, Result};
use crate::model::{ParamType, ParameterDeclaration, ParameterList, RefKind};

/// The shape a callable is invoked through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallForm {
    /// Ordinary invocation, attribute-constructor application,
    /// collection-initializer element, or query-operator call; they all bind
    /// identically.
    Direct,
    /// `delegate.Invoke(...)` — same parameter list as the delegate.
    DelegateInvoke,
    /// `delegate.BeginInvoke(...)` — trailing `callback`/`state` appended.
    DelegateBeginInvoke,
    /// `delegate.EndInvoke(...)` — by-value parameters dropped, `result`
    /// appended.
    DelegateEndInvoke,
}

/// One argument at a call site: positional (`name == None`) or named.
#[derive(Debug, Clone)]
pub struct CallArgument {
    pub name: Option<String>,
    pub span: Span,
}

impl CallArgument {
    #[must_use]
    pub fn positional(span: Span) -> Self {
        Self { name: None, span }
    }

    #[must_use]
    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: Some(name.into()),
            span,
        }
    }
}

/// Binding outcome for one declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundArgument {
    Supplied { span: Span },
    Omitted,
}

impl BoundArgument {
    #[must_use]
    pub fn is_supplied(&self) -> bool {
        matches!(self, BoundArgument::Supplied { .. })
    }
}

/// A bound call site: one entry per declared parameter, plus the span whose
/// first token anchors `LineNumber` substitution. Constructed per call and
/// discarded after resolution.
#[derive(Debug, Clone)]
pub struct CallExpression {
    pub bindings: Vec<BoundArgument>,
    pub call_span: Span,
}

impl CallExpression {
    #[must_use]
    pub fn binding(&self, index: usize) -> Option<&BoundArgument> {
        self.bindings.get(index)
    }
}

/// Produce the parameter list a delegate call form actually exposes.
///
/// `BeginInvoke` appends `callback` and `state` as synthetic parameters;
/// `EndInvoke` keeps only `ref`/`out` parameters and appends a synthetic
/// `result`. Synthetic parameters never participate in marker target lookup.
#[must_use]
pub fn reshape_parameters(list: &ParameterList, form: CallForm) -> ParameterList {
    match form {
        CallForm::Direct | CallForm::DelegateInvoke => list.clone(),
        CallForm::DelegateBeginInvoke => {
            let mut parameters = list.parameters().to_vec();
            parameters.push(synthetic("callback", "AsyncCallback"));
            parameters.push(synthetic("state", "object"));
            rebuild(list, parameters)
        }
        CallForm::DelegateEndInvoke => {
            let mut parameters: Vec<ParameterDeclaration> = list
                .parameters()
                .iter()
                .filter(|parameter| {
                    matches!(parameter.ref_kind, RefKind::Ref | RefKind::Out)
                })
                .cloned()
                .collect();
            parameters.push(synthetic("result", "IAsyncResult"));
            rebuild(list, parameters)
        }
    }
}

fn synthetic(name: &str, type_name: &str) -> ParameterDeclaration {
    let mut parameter =
        ParameterDeclaration::new(name, ParamType::Named(type_name.to_string()));
    parameter.synthetic = true;
    parameter
}

fn rebuild(list: &ParameterList, parameters: Vec<ParameterDeclaration>) -> ParameterList {
    let mut reshaped = ParameterList::new(parameters, list.member.clone());
    reshaped.context = list.context;
    reshaped.allows_marker_multiplicity = list.allows_marker_multiplicity;
    reshaped
}

/// Bind a concrete argument list against a (possibly reshaped) parameter
/// list: positional arguments in declaration order, then named arguments in
/// any order. Omission is only legal for parameters with a default value or a
/// marker whose fallback covers them; anything else is a host contract
/// violation, not a user diagnostic, because overload resolution has already
/// accepted this call.
pub fn bind_call(
    list: &ParameterList,
    arguments: &[CallArgument],
    call_span: Span,
) -> Result<CallExpression> {
    let mut bindings = vec![BoundArgument::Omitted; list.len()];
    let mut next_positional = 0usize;

    for argument in arguments {
        match &argument.name {
            None => {
                if next_positional >= list.len() {
                    return Err(Error::bind(format!(
                        "positional argument overflows the {}-parameter list",
                        list.len()
                    )));
                }
                bindings[next_positional] = BoundArgument::Supplied {
                    span: argument.span,
                };
                next_positional += 1;
            }
            Some(name) => {
                let Some(position) = list.position_of(name) else {
                    return Err(Error::bind(format!(
                        "named argument '{name}' does not match any parameter"
                    )));
                };
                if bindings[position].is_supplied() {
                    return Err(Error::bind(format!(
                        "parameter '{name}' bound more than once"
                    )));
                }
                bindings[position] = BoundArgument::Supplied {
                    span: argument.span,
                };
            }
        }
    }

    for (parameter, binding) in list.parameters().iter().zip(&bindings) {
        if !binding.is_supplied() && !parameter.has_default() && !parameter.synthetic {
            return Err(Error::bind(format!(
                "required parameter '{}' was not supplied",
                parameter.name
            )));
        }
    }

    trace!(
        arguments = arguments.len(),
        parameters = list.len(),
        "bound call site"
    );
    Ok(CallExpression {
        bindings,
        call_span,
    })
}
