use serde::{Deserialize, Serialize};

use crate::descriptor::ResolverName;
use crate::plan::{ArgumentPlan, Receiver, ResolverKind};
use crate::types::TypeRef;

pub const MANIFEST_VERSION: &str = "0.1.0";

/// Serializable description of a compilation: which dispatch functions
/// exist, how each binds its arguments, and the order the initializer
/// wires them. Output of `fieldgenc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchManifest {
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<IrExtension>,
}

impl DispatchManifest {
    pub fn new(extensions: Vec<IrExtension>) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            extensions,
        }
    }

    /// Total number of dispatch table entries across all extensions.
    pub fn resolver_count(&self) -> usize {
        self.extensions.iter().map(|e| e.resolvers.len()).sum()
    }
}

/// One compiled object-type extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrExtension {
    pub runtime_type: String,
    pub extension_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_resolver: Option<IrResolver>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolvers: Vec<IrResolver>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<IrSkipped>,
    pub initialize: Vec<IrInitStep>,
}

/// A dispatch table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrResolver {
    /// Dense id within the manifest, in emission order. Absent for node
    /// resolvers, which are not table entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub name: ResolverName,
    pub kind: ResolverKind,
    pub receiver: Receiver,
    #[serde(default, skip_serializing_if = "ArgumentPlan::is_empty")]
    pub arguments: ArgumentPlan,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A member that produced no dispatch function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrSkipped {
    pub member: String,
    pub reason: String,
}

/// One step of the generated initializer, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IrInitStep {
    ImplementsNode,
    Field { name: String, resolver: u32 },
    Configure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_steps_serialize_with_op_tag() {
        let steps = vec![
            IrInitStep::ImplementsNode,
            IrInitStep::Field {
                name: "name".into(),
                resolver: 1,
            },
            IrInitStep::Configure,
        ];
        let json = serde_json::to_string(&steps).unwrap();
        assert_eq!(
            json,
            r#"[{"op":"implements_node"},{"op":"field","name":"name","resolver":1},{"op":"configure"}]"#
        );
    }

    #[test]
    fn empty_manifest_omits_extensions() {
        let json = serde_json::to_string(&DispatchManifest::new(vec![])).unwrap();
        assert_eq!(json, r#"{"version":"0.1.0"}"#);
    }
}
