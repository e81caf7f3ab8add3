//! Values stored in the canonical mapping
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Directive keyword to value, for one section instance
pub type Directives = BTreeMap<String, Value>;

/// A decoded directive payload.
///
/// Integers and floats stay distinct so that `1` and `1.0` survive a
/// round trip through the emitter unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    /// Insertion-ordered occurrences of a repeatable directive
    Indexed(BTreeMap<usize, Value>),
    /// Named sub-fields, e.g. an ion descriptor or READ formats
    Record(BTreeMap<String, Value>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_indexed(&self) -> Option<&BTreeMap<usize, Value>> {
        match self {
            Self::Indexed(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field or index lookup, `None` for scalars
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Record(fields) => fields.get(key),
            Self::Indexed(items) => key.parse().ok().and_then(|i: usize| items.get(&i)),
            Self::List(items) => key.parse().ok().and_then(|i: usize| items.get(i)),
            _ => None,
        }
    }

    /// Append to an index-keyed collection, using the next free index
    pub fn push_indexed(items: &mut BTreeMap<usize, Value>, value: Value) -> usize {
        let index = items.len();
        items.insert(index, value);
        index
    }
}

/// Scalars render as legacy input text, containers as space-joined words
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => {
                let words: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", words.join(" "))
            }
            Self::Indexed(items) => {
                let words: Vec<String> = items.values().map(|v| v.to_string()).collect();
                write!(f, "{}", words.join(" "))
            }
            Self::Record(fields) => {
                let words: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{} {}", k, v))
                    .collect();
                write!(f, "{}", words.join(" "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}
