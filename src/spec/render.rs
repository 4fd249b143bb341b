//! Token renderer: one pass over the entries, in declaration order.

use indexmap::IndexMap;

use crate::spec::definition::{inline_token, negate_flag, Entry, OperandDef, OptionDef, OptionKind};
use crate::spec::error::BindError;
use crate::spec::key_value::KeyValueInput;
use crate::spec::value::ArgValue;

/// Render every entry. `options` is keyed by canonical name; `operands`
/// holds one allocated value per operand entry, in entry order.
pub(crate) fn render(
    entries: &[Entry],
    options: &IndexMap<String, ArgValue>,
    operands: &[ArgValue],
) -> Result<Vec<String>, BindError> {
    let mut tokens = Vec::new();
    let mut operand_values = operands.iter();

    for entry in entries {
        match entry {
            Entry::Literal(token) => tokens.push(token.clone()),
            Entry::Option(def) => {
                let value = options.get(def.canonical()).unwrap_or(&ArgValue::Nil);
                render_option(def, value, &mut tokens)?;
            }
            Entry::Operand(def) => {
                let value = operand_values.next().unwrap_or(&ArgValue::Nil);
                render_operand(def, value, &mut tokens)?;
            }
        }
    }
    Ok(tokens)
}

/// Render a single option value. Nil renders nothing for every kind.
pub(crate) fn render_option(
    def: &OptionDef,
    value: &ArgValue,
    out: &mut Vec<String>,
) -> Result<(), BindError> {
    if value.is_nil() {
        return Ok(());
    }
    let invalid = |reason: String| BindError::InvalidValue {
        name: def.canonical().to_string(),
        reason,
    };
    let flag = def.flag.as_str();

    match &def.kind {
        OptionKind::Flag {
            negatable,
            max_times,
        } => match (value, max_times) {
            (ArgValue::Int(count), Some(max)) => {
                if *count < 0 || *count > i64::from(*max) {
                    return Err(invalid(format!(
                        "may be repeated at most {max} times, got {count}"
                    )));
                }
                for _ in 0..*count {
                    out.push(flag.to_string());
                }
            }
            (ArgValue::Bool(true), _) => out.push(flag.to_string()),
            (ArgValue::Bool(false), _) if *negatable => out.push(negate_flag(flag)),
            (ArgValue::Bool(false), _) => {}
            (other, _) if *negatable => {
                return Err(invalid(format!(
                    "must be true or false, got {}",
                    other.type_name()
                )))
            }
            (other, _) => {
                if other.is_truthy() {
                    out.push(flag.to_string());
                }
            }
        },

        OptionKind::Value {
            inline,
            repeatable,
            allow_empty,
            as_operand,
            separator,
        } => {
            let items: Vec<&ArgValue> = match value {
                ArgValue::List(items) if *repeatable => {
                    items.iter().filter(|v| !v.is_nil()).collect()
                }
                ArgValue::List(_) => {
                    return Err(invalid("does not accept multiple values".to_string()))
                }
                single => vec![single],
            };

            let mut rendered = Vec::with_capacity(items.len());
            for item in items {
                let token = item.to_token().ok_or_else(|| {
                    invalid(format!("values must be scalar, got {}", item.type_name()))
                })?;
                if token.is_empty() && !allow_empty {
                    continue;
                }
                rendered.push(token);
            }

            if *as_operand {
                if !rendered.is_empty() {
                    out.extend(separator.iter().cloned());
                }
                out.extend(rendered);
            } else {
                for token in rendered {
                    push_value(out, flag, &token, *inline);
                }
            }
        }

        OptionKind::FlagOrValue { inline, negatable } => match value {
            ArgValue::Bool(true) => out.push(flag.to_string()),
            ArgValue::Bool(false) if *negatable => out.push(negate_flag(flag)),
            ArgValue::Bool(false) => {}
            scalar if scalar.is_scalar() => {
                if let Some(token) = scalar.to_token() {
                    push_value(out, flag, &token, *inline);
                }
            }
            other => {
                return Err(invalid(format!(
                    "must be a boolean or a scalar, got {}",
                    other.type_name()
                )))
            }
        },

        OptionKind::KeyValue {
            inline,
            key_separator,
        } => {
            let pairs = KeyValueInput::from_value(value)
                .and_then(|input| input.into_pairs(key_separator))
                .map_err(invalid)?;
            for (key, val) in pairs {
                let joined = match val {
                    Some(v) => format!("{key}{key_separator}{v}"),
                    None => key,
                };
                push_value(out, flag, &joined, *inline);
            }
        }

        OptionKind::Custom(builder) => out.extend(builder(value).into_vec()),

        OptionKind::Metadata => {}
    }
    Ok(())
}

/// Separator then values; an empty allocation emits nothing at all.
fn render_operand(
    def: &OperandDef,
    value: &ArgValue,
    out: &mut Vec<String>,
) -> Result<(), BindError> {
    let invalid = |actual: &ArgValue| BindError::InvalidValue {
        name: def.name.clone(),
        reason: format!("operand values must be scalar, got {}", actual.type_name()),
    };

    let tokens: Vec<String> = match value {
        ArgValue::Nil => Vec::new(),
        ArgValue::List(items) => items
            .iter()
            .map(|item| item.to_token().ok_or_else(|| invalid(item)))
            .collect::<Result<_, _>>()?,
        other => vec![other.to_token().ok_or_else(|| invalid(other))?],
    };

    if tokens.is_empty() {
        return Ok(());
    }
    out.extend(def.separator.iter().cloned());
    out.extend(tokens);
    Ok(())
}

fn push_value(out: &mut Vec<String>, flag: &str, value: &str, inline: bool) {
    if inline {
        out.push(inline_token(flag, value));
    } else {
        out.push(flag.to_string());
        out.push(value.to_string());
    }
}
