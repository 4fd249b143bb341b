//! Key-value option input: mapping or pair list, normalised to one shape.

use indexmap::IndexMap;

use crate::spec::value::ArgValue;

/// The two shapes a key-value option accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValueInput {
    /// `{"Signed-off-by" => ["John", "Jane"]}`
    Mapping(IndexMap<String, ArgValue>),
    /// `[["Signed-off-by", "John"], ["Acked-by"]]`
    Pairs(Vec<(String, ArgValue)>),
}

impl KeyValueInput {
    /// Classify a call-time value. Any other shape is an error message.
    pub fn from_value(value: &ArgValue) -> Result<Self, String> {
        match value {
            ArgValue::Map(map) => Ok(Self::Mapping(map.clone())),
            ArgValue::List(items) => items
                .iter()
                .map(pair_from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Pairs),
            other => Err(format!(
                "expects a Map or a List of [key, value] pairs, got {}",
                other.type_name()
            )),
        }
    }

    /// Ordered `(key, value)` list. A list value expands into one pair per
    /// element; a nil value keeps the key with no value.
    pub fn into_pairs(self, key_separator: &str) -> Result<Vec<(String, Option<String>)>, String> {
        let entries: Vec<(String, ArgValue)> = match self {
            Self::Mapping(map) => map.into_iter().collect(),
            Self::Pairs(pairs) => pairs,
        };

        let mut pairs = Vec::new();
        for (key, value) in entries {
            if key.is_empty() {
                return Err("keys must be non-empty".to_string());
            }
            if key.contains(key_separator) {
                return Err(format!(
                    "key '{key}' must not contain the separator '{key_separator}'"
                ));
            }
            match value {
                ArgValue::List(values) => {
                    for v in values {
                        pairs.push((key.clone(), scalar_or_nil(&key, &v)?));
                    }
                }
                v => pairs.push((key.clone(), scalar_or_nil(&key, &v)?)),
            }
        }
        Ok(pairs)
    }
}

fn pair_from_value(item: &ArgValue) -> Result<(String, ArgValue), String> {
    let parts = item.as_list().ok_or_else(|| {
        format!("pair entries must be [key, value] lists, got {}", item.type_name())
    })?;
    let (key, value) = match parts {
        [key] => (key, ArgValue::Nil),
        [key, value] => (key, value.clone()),
        _ => {
            return Err(format!(
                "pair entries must have one or two elements, got {}",
                parts.len()
            ))
        }
    };
    let key = key
        .as_str()
        .ok_or_else(|| format!("pair keys must be String, got {}", key.type_name()))?;
    Ok((key.to_string(), value))
}

fn scalar_or_nil(key: &str, value: &ArgValue) -> Result<Option<String>, String> {
    if value.is_nil() {
        return Ok(None);
    }
    if !value.is_scalar() {
        return Err(format!(
            "value for key '{key}' must be a scalar, got {}",
            value.type_name()
        ));
    }
    Ok(value.to_token())
}
