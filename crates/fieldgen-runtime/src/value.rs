use std::any::Any;
use std::fmt;
use std::sync::Arc;

use fieldgen_common::TypeRef;

/// A type-erased field value. Every dispatch function yields one of these,
/// whatever the underlying member returned.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Ordered key-value pairs (input objects, plain records).
    Map(Vec<(String, Value)>),
    /// A host object, resolved further by its own type's dispatch functions.
    Object(ObjectValue),
}

/// A shared host object tagged with its GraphQL runtime type name.
#[derive(Clone)]
pub struct ObjectValue {
    type_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectValue {
    pub fn new<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: T) -> Self {
        Self::from_arc(type_name, Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(type_name: impl Into<Arc<str>>, value: Arc<T>) -> Self {
        Self {
            type_name: type_name.into(),
            inner: value,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).downcast::<T>().ok()
    }

    /// Whether both handles point at the same host object.
    pub fn same_object(&self, other: &ObjectValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectValue({})", self.type_name)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.type_name == b.type_name && a.same_object(b)
            }
            _ => false,
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Object(obj) => obj.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Whether this value can be bound to a parameter of type `ty`.
    ///
    /// `Int` widens to `Float` and `ID` accepts strings and integers.
    /// Other named types may be enums, custom scalars or input objects,
    /// so they take any scalar or map. Host objects must match by name.
    pub fn conforms_to(&self, ty: &TypeRef) -> bool {
        if self.is_null() {
            return !ty.is_non_null();
        }
        let ty = ty.nullable();
        if let Some(item) = ty.list_item() {
            return match self {
                Value::List(items) => items.iter().all(|v| v.conforms_to(&item)),
                _ => false,
            };
        }
        match (ty.as_str(), self) {
            ("Int", Value::Int(_)) => true,
            ("Float", Value::Float(_) | Value::Int(_)) => true,
            ("String", Value::String(_)) => true,
            ("ID", Value::String(_) | Value::Int(_)) => true,
            ("Boolean", Value::Boolean(_)) => true,
            ("Int" | "Float" | "String" | "ID" | "Boolean", _) => false,
            (name, Value::Object(obj)) => obj.type_name() == name,
            (
                _,
                Value::Map(_)
                | Value::String(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Boolean(_),
            ) => true,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<ObjectValue> for Value {
    fn from(v: ObjectValue) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Product {
        name: String,
    }

    #[test]
    fn object_downcast() {
        let obj = ObjectValue::new(
            "Product",
            Product {
                name: "Widget".into(),
            },
        );
        assert_eq!(obj.type_name(), "Product");
        assert_eq!(obj.downcast_ref::<Product>().map(|p| p.name.as_str()), Some("Widget"));
        assert!(obj.downcast_ref::<String>().is_none());
        assert!(obj.downcast_arc::<Product>().is_some());
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ObjectValue::new("Product", Product { name: "a".into() });
        let b = ObjectValue::new("Product", Product { name: "a".into() });
        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a), Value::Object(b));
    }

    #[test]
    fn scalar_conformance() {
        assert!(Value::Int(5).conforms_to(&TypeRef::new("Int!")));
        assert!(Value::Int(5).conforms_to(&TypeRef::new("Float")));
        assert!(!Value::Float(1.5).conforms_to(&TypeRef::new("Int")));
        assert!(Value::String("p1".into()).conforms_to(&TypeRef::new("ID!")));
        assert!(!Value::Boolean(true).conforms_to(&TypeRef::new("String")));
    }

    #[test]
    fn null_conforms_only_to_nullable() {
        assert!(Value::Null.conforms_to(&TypeRef::new("Int")));
        assert!(!Value::Null.conforms_to(&TypeRef::new("Int!")));
    }

    #[test]
    fn list_and_object_conformance() {
        let list = Value::from(vec![1, 2, 3]);
        assert!(list.conforms_to(&TypeRef::new("[Int!]!")));
        assert!(!list.conforms_to(&TypeRef::new("[String]")));
        assert!(!Value::Int(1).conforms_to(&TypeRef::new("[Int]")));

        let obj = Value::Object(ObjectValue::new("Product", Product { name: "x".into() }));
        assert!(obj.conforms_to(&TypeRef::new("Product!")));
        assert!(!obj.conforms_to(&TypeRef::new("Review")));
    }

    #[test]
    fn enum_and_custom_scalar_conformance() {
        assert!(Value::from("ASC").conforms_to(&TypeRef::new("SortOrder!")));
        assert!(Value::Float(9.99).conforms_to(&TypeRef::new("Decimal!")));
        assert!(Value::Int(1_700_000_000).conforms_to(&TypeRef::new("DateTime")));
        assert!(!Value::Null.conforms_to(&TypeRef::new("Decimal!")));
        assert!(!Value::from(vec![1]).conforms_to(&TypeRef::new("Decimal")));
    }

    #[test]
    fn from_json() {
        let v = Value::from(serde_json::json!({"limit": 5, "tags": ["a"], "ratio": 0.5}));
        assert_eq!(
            v,
            Value::Map(vec![
                ("limit".into(), Value::Int(5)),
                ("ratio".into(), Value::Float(0.5)),
                ("tags".into(), Value::List(vec![Value::String("a".into())])),
            ])
        );
    }
}
