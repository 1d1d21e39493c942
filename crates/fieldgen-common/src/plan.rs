use serde::{Deserialize, Serialize};

use crate::descriptor::{ParameterInfo, ParameterSource};
use crate::types::TypeRef;

/// How a materialized resolver produces its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    Sync,
    Async,
    Property,
}

impl std::fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolverKind::Sync => "sync",
            ResolverKind::Async => "async",
            ResolverKind::Property => "property",
        };
        f.write_str(s)
    }
}

/// What a resolver is invoked on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Receiver {
    /// Static member on the declaring type.
    Static { declaring_type: String },
    /// The parent object, which must be of exactly this runtime type.
    Parent { runtime_type: String },
}

impl Receiver {
    /// The runtime type a parent object must have, if a parent is needed.
    pub fn parent_type(&self) -> Option<&str> {
        match self {
            Receiver::Static { .. } => None,
            Receiver::Parent { runtime_type } => Some(runtime_type),
        }
    }
}

/// One binding slot of an argument plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSlot {
    pub index: usize,
    /// Parameter name as declared.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    pub source: ParameterSource,
}

impl ArgumentSlot {
    /// The field argument this slot reads, for argument-sourced slots.
    pub fn argument_name(&self) -> Option<&str> {
        match &self.source {
            ParameterSource::Argument { name } => Some(name.as_deref().unwrap_or(&self.name)),
            _ => None,
        }
    }
}

/// The ordered binding slots of one resolver.
///
/// Slots are stored in a boxed slice sized once at construction; an empty
/// plan holds no allocation. Slot `i` always has `index == i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArgumentPlan {
    slots: Box<[ArgumentSlot]>,
}

impl ArgumentPlan {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a plan from slots already in index order.
    ///
    /// Returns `None` when any slot's index does not match its position.
    pub fn from_slots(slots: Vec<ArgumentSlot>) -> Option<Self> {
        if slots.iter().enumerate().any(|(i, slot)| slot.index != i) {
            return None;
        }
        Some(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    /// One slot per parameter, indexed in declaration order.
    pub fn from_parameters(parameters: &[ParameterInfo]) -> Self {
        let slots: Vec<ArgumentSlot> = parameters
            .iter()
            .enumerate()
            .map(|(index, p)| ArgumentSlot {
                index,
                name: p.name.clone(),
                ty: p.ty.clone(),
                source: p.source.clone(),
            })
            .collect();
        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ArgumentSlot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&ArgumentSlot> {
        self.slots.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(index: usize, name: &str) -> ArgumentSlot {
        ArgumentSlot {
            index,
            name: name.to_string(),
            ty: TypeRef::new("Int"),
            source: ParameterSource::default(),
        }
    }

    #[test]
    fn rejects_out_of_order_slots() {
        assert!(ArgumentPlan::from_slots(vec![slot(1, "a"), slot(0, "b")]).is_none());
        let plan = ArgumentPlan::from_slots(vec![slot(0, "a"), slot(1, "b")]).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.get(1).map(|s| s.name.as_str()), Some("b"));
    }

    #[test]
    fn from_parameters_keeps_declaration_order() {
        let params = vec![
            ParameterInfo::argument("limit", "Int!"),
            ParameterInfo::parent("product", "Product"),
        ];
        let plan = ArgumentPlan::from_parameters(&params);
        let names: Vec<_> = plan.slots().iter().map(|s| (s.index, s.name.as_str())).collect();
        assert_eq!(names, vec![(0, "limit"), (1, "product")]);
        assert!(ArgumentPlan::from_parameters(&[]).is_empty());
    }

    #[test]
    fn argument_name_falls_back_to_parameter_name() {
        let mut s = slot(0, "limit");
        assert_eq!(s.argument_name(), Some("limit"));
        s.source = ParameterSource::Argument {
            name: Some("first".into()),
        };
        assert_eq!(s.argument_name(), Some("first"));
        s.source = ParameterSource::Parent;
        assert_eq!(s.argument_name(), None);
    }

    #[test]
    fn receiver_parent_type() {
        let r = Receiver::Parent {
            runtime_type: "Product".into(),
        };
        assert_eq!(r.parent_type(), Some("Product"));
        let r = Receiver::Static {
            declaring_type: "Query".into(),
        };
        assert_eq!(r.parent_type(), None);
    }
}
