use serde::Serialize;

/// Argument and reply value exchanged with the backing store
///
/// Mirrors the reply shapes of Redis-like stores. Serializes to plain JSON:
/// `Nil` as `null`, integers as numbers, bulk and status strings as strings,
/// arrays as arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Nil,
    Int(i64),
    Bulk(String),
    Status(String),
    Array(Vec<Value>),
}

impl Value {
    /// The `OK` status reply
    pub fn ok() -> Self {
        Value::Status("OK".to_string())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Render a scalar value as store text
    ///
    /// Returns `None` for `Nil` and arrays, which have no single textual form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Int(i) => Some(i.to_string()),
            Value::Bulk(s) | Value::Status(s) => Some(s.clone()),
            Value::Nil | Value::Array(_) => None,
        }
    }

    /// Interpret the value as an integer, parsing bulk strings
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bulk(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "(nil)"),
            Value::Int(i) => write!(f, "(integer) {}", i),
            Value::Bulk(s) => write!(f, "{:?}", s),
            Value::Status(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Bulk(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bulk(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Bulk(s.clone())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}
