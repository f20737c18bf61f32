//! Variable bag shared by sessions and node handlers.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Ordered map of variable name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vars {
    inner: Map<String, Value>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<V: Into<Value>>(
        mut self,
        name: &str,
        value: V,
    ) -> Self {
        self.set(name, value);
        self
    }

    pub fn set<V: Into<Value>>(
        &mut self,
        name: &str,
        value: V,
    ) {
        self.inner.insert(name.to_string(), value.into());
    }

    /// Typed read; `None` when missing or not convertible to `T`.
    pub fn get<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Option<T> {
        self.inner.get(name).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_value(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.inner.get(name)
    }

    pub fn remove(
        &mut self,
        name: &str,
    ) -> Option<Value> {
        self.inner.remove(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.inner.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(inner) => Self {
                inner,
            },
            _ => Self::default(),
        }
    }
}

impl From<Vars> for Value {
    fn from(vars: Vars) -> Self {
        Value::Object(vars.inner)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_vars_set_get() {
        let mut vars = Vars::new().with("name", "Ada");
        vars.set("count", 3);

        assert_eq!(vars.get::<String>("name"), Some("Ada".to_string()));
        assert_eq!(vars.get::<i64>("count"), Some(3));
        assert_eq!(vars.get::<i64>("name"), None);
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_vars_from_non_object() {
        let vars = Vars::from(json!([1, 2]));
        assert!(vars.is_empty());
    }

    #[test]
    fn test_vars_roundtrip_value() {
        let vars = Vars::new().with("a", json!({"b": 1}));
        let value: Value = vars.clone().into();
        assert_eq!(value, json!({"a": {"b": 1}}));
        assert_eq!(Vars::from(value), vars);
    }
}
