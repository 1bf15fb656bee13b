//! Runtime values for the interpreter

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Shared, mutable list
pub type List = Arc<RwLock<Vec<Value>>>;
/// Shared, mutable map
pub type Map = Arc<RwLock<Object>>;

/// Runtime value
///
/// Lists and maps are shared by reference: cloning a `Value` clones the
/// handle, not the contents.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(List),
    Map(Map),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items)))
    }

    pub fn map(object: Object) -> Self {
        Value::Map(Arc::new(RwLock::new(object)))
    }

    /// Check if value is truthy: null, zero, "" and false are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) => true,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Try to convert to i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to convert to f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to convert to bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Snapshot of a list's items
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.read().clone()),
            _ => None,
        }
    }

    /// Map entry by key; `None` for non-maps and missing keys
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.read().get(key).cloned(),
            _ => None,
        }
    }

    /// JSON form; non-finite floats become null, and so does a container
    /// reached again through itself.
    pub fn to_json(&self) -> serde_json::Value {
        self.json_in(&mut Vec::new())
    }

    fn json_in(&self, seen: &mut Vec<*const ()>) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(n) => Json::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Str(s) => Json::String(s.to_string()),
            Value::List(_) | Value::Map(_) => {
                if !self.enter(seen) {
                    return Json::Null;
                }
                let json = match self {
                    Value::List(items) => Json::Array(items.read().iter().map(|v| v.json_in(seen)).collect()),
                    Value::Map(map) => Json::Object(
                        map.read()
                            .iter()
                            .map(|(k, v)| (k.to_string(), v.json_in(seen)))
                            .collect(),
                    ),
                    _ => Json::Null,
                };
                seen.pop();
                json
            }
        }
    }

    /// Address of the shared container behind a list or map
    fn container_id(&self) -> Option<*const ()> {
        match self {
            Value::List(items) => Some(Arc::as_ptr(items) as *const ()),
            Value::Map(map) => Some(Arc::as_ptr(map) as *const ()),
            _ => None,
        }
    }

    /// Push this container on the active path; false if it is already there.
    fn enter(&self, seen: &mut Vec<*const ()>) -> bool {
        match self.container_id() {
            Some(id) if !seen.contains(&id) => {
                seen.push(id);
                true
            }
            _ => false,
        }
    }

    fn write_in(&self, f: &mut fmt::Formatter<'_>, seen: &mut Vec<*const ()>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                if !self.enter(seen) {
                    return write!(f, "(this Collection)");
                }
                write!(f, "[")?;
                for (i, v) in items.read().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    v.write_in(f, seen)?;
                }
                seen.pop();
                write!(f, "]")
            }
            Value::Map(map) => {
                if !self.enter(seen) {
                    return write!(f, "(this Map)");
                }
                write!(f, "{{")?;
                for (i, (k, v)) in map.read().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}=")?;
                    v.write_in(f, seen)?;
                }
                seen.pop();
                write!(f, "}}")
            }
        }
    }

    /// Pairs already being compared count as equal, so cyclic values terminate.
    fn eq_in(&self, other: &Value, seen: &mut Vec<(*const (), *const ())>) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (a, b) if a.is_number() && b.is_number() => a.as_float() == b.as_float(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ());
                if seen.contains(&pair) {
                    return true;
                }
                seen.push(pair);
                let (a, b) = (a.read(), b.read());
                let equal = a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eq_in(y, seen));
                seen.pop();
                equal
            }
            (Value::Map(a), Value::Map(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ());
                if seen.contains(&pair) {
                    return true;
                }
                seen.push(pair);
                let equal = a.read().eq_in(&b.read(), seen);
                seen.pop();
                equal
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_in(f, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x:?})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(_) => write!(f, "List({self})"),
            Value::Map(_) => write!(f, "Map({self})"),
        }
    }
}

/// Numbers compare as f64 across int/float; containers compare structurally.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.eq_in(other, &mut Vec::new())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::map(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::from(s),
            Json::Array(items) => Value::list(items.into_iter().map(Value::from).collect()),
            Json::Object(entries) => Value::map(entries.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

/// Insertion-ordered string-keyed map
///
/// Script objects are small; lookups are linear.
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace; a replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Object {
    fn eq_in(&self, other: &Object, seen: &mut Vec<(*const (), *const ())>) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|w| v.eq_in(w, seen)))
    }
}

/// Equal when both hold the same keys with equal values, in any order.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.eq_in(other, &mut Vec::new())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (k, v) in iter {
            object.insert(k, v);
        }
        object
    }
}
