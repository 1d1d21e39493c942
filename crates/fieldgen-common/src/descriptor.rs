//! Descriptor model: what the static-analysis pass tells the compiler about
//! each object-type extension.
//!
//! Descriptors are plain data. They are built once per compilation pass,
//! never mutated by the compiler, and serialize to the JSON accepted by
//! `fieldgenc`.

use serde::{Deserialize, Serialize};

use crate::location::SourceLocation;
use crate::types::TypeRef;

/// One object-type extension: the GraphQL-facing runtime type, the type
/// whose members back its fields, and those members in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeExtensionInfo {
    /// The type the generated wiring configures.
    pub runtime_type: String,
    /// The type declaring the resolver members. Often the runtime type itself.
    pub extension_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_resolver: Option<MemberInfo>,
    #[serde(default)]
    pub members: Vec<MemberInfo>,
}

impl ObjectTypeExtensionInfo {
    /// An extension whose members are declared on the runtime type itself.
    pub fn new(runtime_type: impl Into<String>) -> Self {
        let runtime_type = runtime_type.into();
        Self {
            extension_type: runtime_type.clone(),
            runtime_type,
            node_resolver: None,
            members: Vec::new(),
        }
    }

    pub fn extended_by(mut self, extension_type: impl Into<String>) -> Self {
        self.extension_type = extension_type.into();
        self
    }

    pub fn with_node_resolver(mut self, member: MemberInfo) -> Self {
        self.node_resolver = Some(member);
        self
    }

    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A resolvable member: a method or a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    /// Static members are invoked without a receiver.
    #[serde(default)]
    pub is_static: bool,
    #[serde(flatten)]
    pub kind: MemberKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MemberKind {
    Method {
        returns: ReturnType,
        #[serde(default)]
        parameters: Vec<ParameterInfo>,
    },
    Property {
        #[serde(rename = "type")]
        ty: TypeRef,
    },
}

impl MemberInfo {
    pub fn method(name: impl Into<String>, returns: ReturnType) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            kind: MemberKind::Method {
                returns,
                parameters: Vec::new(),
            },
            location: None,
        }
    }

    pub fn property(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            kind: MemberKind::Property { ty: ty.into() },
            location: None,
        }
    }

    /// Mark the member as static. Static members resolve without a parent.
    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Append a parameter. Ignored for properties, which take none.
    pub fn with_parameter(mut self, parameter: ParameterInfo) -> Self {
        if let MemberKind::Method { parameters, .. } = &mut self.kind {
            parameters.push(parameter);
        }
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    /// Declared parameters, in declaration order. Empty for properties.
    pub fn parameters(&self) -> &[ParameterInfo] {
        match &self.kind {
            MemberKind::Method { parameters, .. } => parameters,
            MemberKind::Property { .. } => &[],
        }
    }
}

/// The declared return shape of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Void,
    /// Returns a reference into the receiver; cannot be erased to a value.
    ByRef(TypeRef),
    /// A future. `None` is a bare future carrying no value.
    Future(Option<TypeRef>),
    Value(TypeRef),
}

impl ReturnType {
    pub fn value(ty: impl Into<TypeRef>) -> Self {
        ReturnType::Value(ty.into())
    }

    pub fn future(ty: impl Into<TypeRef>) -> Self {
        ReturnType::Future(Some(ty.into()))
    }

    pub fn bare_future() -> Self {
        ReturnType::Future(None)
    }
}

/// A method parameter and where its value comes from at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub source: ParameterSource,
}

impl ParameterInfo {
    /// A field argument named after the parameter.
    pub fn argument(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            source: ParameterSource::Argument { name: None },
        }
    }

    /// The parent object of the field being resolved.
    pub fn parent(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            source: ParameterSource::Parent,
        }
    }

    /// A request-scoped state entry.
    pub fn state(
        name: impl Into<String>,
        ty: impl Into<TypeRef>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            source: ParameterSource::State { key: key.into() },
        }
    }

    /// Bind to a field argument whose name differs from the parameter's.
    pub fn renamed(mut self, argument: impl Into<String>) -> Self {
        self.source = ParameterSource::Argument {
            name: Some(argument.into()),
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSource {
    Argument {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    Parent,
    State {
        key: String,
    },
}

impl Default for ParameterSource {
    fn default() -> Self {
        ParameterSource::Argument { name: None }
    }
}

/// Key of one generated dispatch function.
///
/// `arguments_count` duplicates the parameter count on purpose: slot
/// storage is sized from it before parameter types are walked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolverName {
    pub type_name: String,
    pub member_name: String,
    pub arguments_count: usize,
}

impl ResolverName {
    pub fn new(
        type_name: impl Into<String>,
        member_name: impl Into<String>,
        arguments_count: usize,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            member_name: member_name.into(),
            arguments_count,
        }
    }
}

impl std::fmt::Display for ResolverName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.type_name, self.member_name)
    }
}
