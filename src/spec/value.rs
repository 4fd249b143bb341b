//! Call-time values: what callers hand to `bind`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single call-time value (positional or named).
///
/// `Nil` means "not provided" everywhere downstream; only the required-option
/// check and negatable flags ever look at it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ArgValue>),
    Map(IndexMap<String, ArgValue>),
}

/// Semantic type used by `expected_type` checks and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    List,
    Map,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::List => "List",
            Self::Map => "Map",
        }
    }

    /// Join a type set for messages: `String or Integer`, `String, Integer or List`.
    pub fn describe_set(types: &[ValueType]) -> String {
        match types {
            [] => String::new(),
            [only] => only.as_str().to_string(),
            [init @ .., last] => {
                let head: Vec<&str> = init.iter().map(ValueType::as_str).collect();
                format!("{} or {}", head.join(", "), last.as_str())
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ArgValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Present = neither `Nil` nor `false`. Used by flags, conflicts and
    /// requires-one-of groups.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Nil | Self::Bool(false))
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Str(_) | Self::Int(_) | Self::Float(_))
    }

    /// Semantic type, `None` for `Nil`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Nil => None,
            Self::Bool(_) => Some(ValueType::Boolean),
            Self::Int(_) => Some(ValueType::Integer),
            Self::Float(_) => Some(ValueType::Float),
            Self::Str(_) => Some(ValueType::String),
            Self::List(_) => Some(ValueType::List),
            Self::Map(_) => Some(ValueType::Map),
        }
    }

    /// Type name for error messages (`nil` included).
    pub fn type_name(&self) -> &'static str {
        self.value_type().map_or("nil", |t| t.as_str())
    }

    /// Render a scalar (or boolean) as a single token. Lists, maps and nil
    /// have no single-token form.
    pub fn to_token(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(x) => Some(float_token(*x)),
            Self::Bool(b) => Some(b.to_string()),
            Self::Nil | Self::List(_) | Self::Map(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?} => {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for ArgValue {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<f64> for ArgValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

macro_rules! int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for ArgValue {
            fn from(i: $t) -> Self {
                Self::Int(i64::from(i))
            }
        })*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Nil, Into::into)
    }
}

impl<V: Into<ArgValue>> FromIterator<(String, V)> for ArgValue {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Whole floats keep their decimal point: `1.0`, not `1`.
fn float_token(x: f64) -> String {
    let mut token = x.to_string();
    if x.is_finite() && !token.contains('.') {
        token.push_str(".0");
    }
    token
}

/// Named call-time options in caller order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedArgs(IndexMap<String, ArgValue>);

impl NamedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for NamedArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
