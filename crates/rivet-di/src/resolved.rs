//! Resolution results: plain data or live services, possibly nested.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::instance::ServiceInstance;

/// A fully resolved value: what a definition argument becomes before a
/// constructor sees it, and what [`Container::resolve`](crate::Container::resolve)
/// returns.
///
/// Plain data stays a JSON value; `@id` references become live service
/// handles; lists and mappings keep their shape with every element resolved
/// individually.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Plain data, passed through or pulled from the parameter store.
    Value(Value),
    /// A live service produced by an `@id` reference.
    Service(ServiceInstance),
    /// A list whose elements were resolved individually.
    List(Vec<Resolved>),
    /// A mapping whose entries were resolved individually, in order.
    Map(Vec<(String, Resolved)>),
}

impl Resolved {
    /// The plain JSON value, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The string slice of a plain string value.
    pub fn as_str(&self) -> Option<&str> {
        self.as_value()?.as_str()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value()?.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_value()?.as_u64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value()?.as_f64()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value()?.as_bool()
    }

    /// The service handle, if this is one.
    pub fn as_service(&self) -> Option<&ServiceInstance> {
        match self {
            Resolved::Service(instance) => Some(instance),
            _ => None,
        }
    }

    /// Downcasts a service handle to its concrete type.
    pub fn service_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_service()?.downcast_arc::<T>()
    }

    /// The resolved list, if this is one.
    pub fn as_list(&self) -> Option<&[Resolved]> {
        match self {
            Resolved::List(items) => Some(items),
            _ => None,
        }
    }

    /// The resolved mapping entries, if this is one.
    pub fn as_map(&self) -> Option<&[(String, Resolved)]> {
        match self {
            Resolved::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Collapses a service-free resolution back into a JSON value.
    ///
    /// Returns `None` as soon as a service handle is found anywhere in the
    /// structure, since live instances have no JSON form.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Value(value) => Some(value),
            Resolved::Service(_) => None,
            Resolved::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(item.into_value()?);
                }
                Some(Value::Array(values))
            }
            Resolved::Map(entries) => {
                let mut map = Map::new();
                for (key, entry) in entries {
                    map.insert(key, entry.into_value()?);
                }
                Some(Value::Object(map))
            }
        }
    }
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Resolved::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Resolved::Value(json!("abc")).as_str(), Some("abc"));
        assert_eq!(Resolved::Value(json!(42)).as_i64(), Some(42));
        assert_eq!(Resolved::Value(json!(2.5)).as_f64(), Some(2.5));
        assert_eq!(Resolved::Value(json!(true)).as_bool(), Some(true));
        assert_eq!(Resolved::Value(json!(42)).as_str(), None);
    }

    #[test]
    fn test_into_value_rebuilds_nested_data() {
        let resolved = Resolved::List(vec![
            Resolved::Value(json!(1)),
            Resolved::Map(vec![("k".to_string(), Resolved::Value(json!("v")))]),
        ]);
        assert_eq!(resolved.into_value(), Some(json!([1, { "k": "v" }])));
    }

    #[test]
    fn test_into_value_refuses_service_handles() {
        let service = ServiceInstance::new(Arc::new(5_u8));
        let resolved = Resolved::List(vec![
            Resolved::Value(json!(1)),
            Resolved::Service(service),
        ]);
        assert_eq!(resolved.into_value(), None);
    }

    #[test]
    fn test_service_downcast() {
        let resolved = Resolved::Service(ServiceInstance::new(Arc::new(5_u8)));
        assert_eq!(*resolved.service_as::<u8>().unwrap(), 5);
        assert!(resolved.service_as::<u16>().is_none());
    }
}
