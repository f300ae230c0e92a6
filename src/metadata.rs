//! Marker metadata sidecars.
//!
//! Markers are persisted with the compiled library so downstream compilations
//! can resolve against it. Decoding is defensive: metadata written by a
//! non-conforming tool (wrong constructor arity, missing payload, unknown
//! marker names) decodes to [`MarkerKind::Unknown`] and stays inert, never a
//! decode failure.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::{
    CallerInfoMarker, DefaultValue, MarkerKind, OpaqueAttribute, ParamType,
    ParameterDeclaration, RefKind,
};

pub const SIDECAR_SCHEMA_VERSION: u32 = 1;

const KIND_ARGUMENT_EXPRESSION: &str = "caller_argument_expression";
const KIND_MEMBER_NAME: &str = "caller_member_name";
const KIND_LINE_NUMBER: &str = "caller_line_number";
const KIND_FILE_PATH: &str = "caller_file_path";

/// Serialized form of one marker. `arguments` carries the constructor
/// payload; a conforming `caller_argument_expression` entry has exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkerDescriptor {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

/// Serialized form of one parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub ty: ParamType,
    #[serde(default = "default_ref_kind")]
    pub ref_kind: RefKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<OpaqueAttribute>,
}

fn default_ref_kind() -> RefKind {
    RefKind::Value
}

/// Sidecar for one member's parameter list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSidecar {
    #[serde(default = "sidecar_schema_version")]
    pub version: u32,
    pub member: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

fn sidecar_schema_version() -> u32 {
    SIDECAR_SCHEMA_VERSION
}

/// Encode a parameter list for emission alongside compiled metadata.
#[must_use]
pub fn encode_parameters(member: &str, parameters: &[ParameterDeclaration]) -> MemberSidecar {
    MemberSidecar {
        version: SIDECAR_SCHEMA_VERSION,
        member: member.to_string(),
        parameters: parameters.iter().map(encode_parameter).collect(),
    }
}

fn encode_parameter(parameter: &ParameterDeclaration) -> ParameterDescriptor {
    ParameterDescriptor {
        name: parameter.name.clone(),
        ty: parameter.ty.clone(),
        ref_kind: parameter.ref_kind,
        default: parameter.default.clone(),
        markers: parameter.markers.iter().map(encode_marker).collect(),
        attributes: parameter.attributes.clone(),
    }
}

fn encode_marker(marker: &CallerInfoMarker) -> MarkerDescriptor {
    match &marker.kind {
        MarkerKind::ArgumentExpression(target) => MarkerDescriptor {
            kind: KIND_ARGUMENT_EXPRESSION.to_string(),
            arguments: vec![target.clone()],
        },
        MarkerKind::MemberName => MarkerDescriptor {
            kind: KIND_MEMBER_NAME.to_string(),
            arguments: Vec::new(),
        },
        MarkerKind::LineNumber => MarkerDescriptor {
            kind: KIND_LINE_NUMBER.to_string(),
            arguments: Vec::new(),
        },
        MarkerKind::FilePath => MarkerDescriptor {
            kind: KIND_FILE_PATH.to_string(),
            arguments: Vec::new(),
        },
        MarkerKind::Unknown => MarkerDescriptor {
            kind: String::new(),
            arguments: Vec::new(),
        },
    }
}

/// Decode a sidecar's parameters back into declarations.
///
/// Malformed markers become `Unknown` rather than failing the decode; the
/// rest of the parameter carries on untouched, including attributes this
/// crate does not interpret.
#[must_use]
pub fn decode_parameters(sidecar: &MemberSidecar) -> Vec<ParameterDeclaration> {
    sidecar.parameters.iter().map(decode_parameter).collect()
}

fn decode_parameter(descriptor: &ParameterDescriptor) -> ParameterDeclaration {
    let mut parameter = ParameterDeclaration::new(descriptor.name.clone(), descriptor.ty.clone());
    parameter.ref_kind = descriptor.ref_kind;
    parameter.default = descriptor.default.clone();
    parameter.markers = descriptor.markers.iter().map(decode_marker).collect();
    parameter.attributes = descriptor.attributes.clone();
    parameter
}

fn decode_marker(descriptor: &MarkerDescriptor) -> CallerInfoMarker {
    let kind = match descriptor.kind.as_str() {
        KIND_ARGUMENT_EXPRESSION => match descriptor.arguments.as_slice() {
            [target] => MarkerKind::ArgumentExpression(target.clone()),
            // Zero or surplus constructor arguments: non-conforming writer.
            _ => MarkerKind::Unknown,
        },
        KIND_MEMBER_NAME if descriptor.arguments.is_empty() => MarkerKind::MemberName,
        KIND_LINE_NUMBER if descriptor.arguments.is_empty() => MarkerKind::LineNumber,
        KIND_FILE_PATH if descriptor.arguments.is_empty() => MarkerKind::FilePath,
        _ => MarkerKind::Unknown,
    };
    if kind == MarkerKind::Unknown {
        debug!(
            kind = descriptor.kind.as_str(),
            arity = descriptor.arguments.len(),
            "tolerating malformed marker metadata"
        );
    }
    CallerInfoMarker::new(kind)
}

/// Serialize a sidecar to its JSON wire form.
pub fn serialize_sidecar(sidecar: &MemberSidecar) -> Result<String> {
    Ok(serde_json::to_string(sidecar)?)
}

/// Deserialize a sidecar from its JSON wire form. Structural JSON errors are
/// reported; marker-level malformations are tolerated during
/// [`decode_parameters`] instead.
pub fn deserialize_sidecar(payload: &str) -> Result<MemberSidecar> {
    Ok(serde_json::from_str(payload)?)
}
