//! Validation pipeline: named options are checked before any token exists.
//!
//! ```text
//! unknown keys → alias collisions → normalise → required → types
//!     → conflicts → requires-one-of
//! ```

use indexmap::IndexMap;

use crate::spec::error::BindError;
use crate::spec::registry::Specification;
use crate::spec::value::{ArgValue, NamedArgs, ValueType};

/// Run every check in order and return the options keyed by canonical name
/// (caller order preserved).
pub(crate) fn validate(
    spec: &Specification,
    named: &NamedArgs,
) -> Result<IndexMap<String, ArgValue>, BindError> {
    check_unknown_keys(spec, named)?;
    let normalized = normalize(spec, named)?;
    check_required(spec, &normalized)?;
    check_types(spec, &normalized)?;
    check_conflicts(spec, &normalized)?;
    check_requires_one_of(spec, &normalized)?;
    Ok(normalized)
}

fn check_unknown_keys(spec: &Specification, named: &NamedArgs) -> Result<(), BindError> {
    let unknown: Vec<String> = named
        .iter()
        .filter(|(key, _)| spec.canonical_name(key).is_none())
        .map(|(key, _)| key.to_string())
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(BindError::UnsupportedKeys { keys: unknown })
    }
}

/// Alias-collision check and rewrite to canonical names in one pass.
fn normalize(
    spec: &Specification,
    named: &NamedArgs,
) -> Result<IndexMap<String, ArgValue>, BindError> {
    let mut seen: IndexMap<&str, Vec<String>> = IndexMap::new();
    let mut normalized = IndexMap::new();

    for (key, value) in named.iter() {
        let Some(canonical) = spec.canonical_name(key) else {
            continue;
        };
        seen.entry(canonical).or_default().push(key.to_string());
        normalized.insert(canonical.to_string(), value.clone());
    }

    if let Some((canonical, aliases)) = seen.into_iter().find(|(_, aliases)| aliases.len() > 1) {
        return Err(BindError::AliasCollision {
            canonical: canonical.to_string(),
            aliases,
        });
    }
    Ok(normalized)
}

fn check_required(
    spec: &Specification,
    normalized: &IndexMap<String, ArgValue>,
) -> Result<(), BindError> {
    for def in spec.options().filter(|d| d.required) {
        match normalized.get(def.canonical()) {
            None => {
                return Err(BindError::MissingRequired {
                    what: "option",
                    name: def.canonical().to_string(),
                })
            }
            Some(ArgValue::Nil) if !def.allow_nil => {
                return Err(BindError::NilNotAllowed {
                    what: "Option",
                    name: def.canonical().to_string(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Nil always skips type and validator checks.
fn check_types(
    spec: &Specification,
    normalized: &IndexMap<String, ArgValue>,
) -> Result<(), BindError> {
    for def in spec.options() {
        let Some(value) = normalized.get(def.canonical()) else {
            continue;
        };
        if value.is_nil() {
            continue;
        }

        if let Some(types) = &def.expected_types {
            let matches = value.value_type().is_some_and(|t| types.contains(&t));
            if !matches {
                return Err(BindError::TypeMismatch {
                    name: def.canonical().to_string(),
                    expected: ValueType::describe_set(types),
                    actual: value.type_name().to_string(),
                });
            }
        }
        if let Some(validator) = &def.validator {
            if !validator(value) {
                return Err(BindError::ValidatorRejected {
                    name: def.canonical().to_string(),
                    actual: value.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_conflicts(
    spec: &Specification,
    normalized: &IndexMap<String, ArgValue>,
) -> Result<(), BindError> {
    for group in spec.conflict_groups() {
        let present: Vec<&String> = group
            .iter()
            .filter(|name| normalized.get(name.as_str()).is_some_and(ArgValue::is_truthy))
            .collect();
        if let [first, second, ..] = present.as_slice() {
            return Err(BindError::Conflict {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
    }
    Ok(())
}

fn check_requires_one_of(
    spec: &Specification,
    normalized: &IndexMap<String, ArgValue>,
) -> Result<(), BindError> {
    for group in spec.requires_one_of_groups() {
        let any_present = group
            .iter()
            .any(|name| normalized.get(name.as_str()).is_some_and(ArgValue::is_truthy));
        if !any_present {
            return Err(BindError::MissingRequired {
                what: "one of",
                name: group.join(", "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::definition::Opt;

    fn spec() -> Specification {
        Specification::builder()
            .flag(Opt::new("force").alias("f"))
            .value(Opt::new("message").alias("m").required())
            .value(Opt::new("depth").types([ValueType::Integer]))
            .flag(Opt::new("all"))
            .flag(Opt::new("patch"))
            .conflicts(["all", "patch"])
            .build()
            .unwrap()
    }

    #[test]
    fn unknown_keys_are_listed_in_caller_order() {
        let named = NamedArgs::new()
            .set("message", "x")
            .set("zzz", 1)
            .set("aaa", 2);
        let err = validate(&spec(), &named).unwrap_err();
        assert_eq!(
            err,
            BindError::UnsupportedKeys {
                keys: vec!["zzz".into(), "aaa".into()]
            }
        );
    }

    #[test]
    fn two_aliases_of_one_option_collide() {
        let named = NamedArgs::new()
            .set("message", "x")
            .set("force", true)
            .set("f", true);
        let err = validate(&spec(), &named).unwrap_err();
        assert_eq!(
            err,
            BindError::AliasCollision {
                canonical: "force".into(),
                aliases: vec!["force".into(), "f".into()]
            }
        );
    }

    #[test]
    fn aliases_normalise_to_canonical() {
        let named = NamedArgs::new().set("m", "x").set("f", true);
        let out = validate(&spec(), &named).unwrap();
        assert_eq!(out.get("message"), Some(&ArgValue::from("x")));
        assert_eq!(out.get("force"), Some(&ArgValue::Bool(true)));
    }

    #[test]
    fn missing_and_nil_required_are_distinct() {
        let missing = validate(&spec(), &NamedArgs::new()).unwrap_err();
        assert!(matches!(missing, BindError::MissingRequired { .. }));

        let nil = validate(&spec(), &NamedArgs::new().set("message", ArgValue::Nil)).unwrap_err();
        assert!(matches!(nil, BindError::NilNotAllowed { .. }));
    }

    #[test]
    fn type_mismatch_names_expected_and_actual() {
        let named = NamedArgs::new().set("message", "x").set("depth", "deep");
        let err = validate(&spec(), &named).unwrap_err();
        assert_eq!(err.to_string(), "Option 'depth' must be Integer, but was String");
    }

    #[test]
    fn nil_skips_type_check() {
        let named = NamedArgs::new()
            .set("message", "x")
            .set("depth", ArgValue::Nil);
        assert!(validate(&spec(), &named).is_ok());
    }

    #[test]
    fn false_does_not_count_as_conflicting() {
        let named = NamedArgs::new()
            .set("message", "x")
            .set("all", true)
            .set("patch", false);
        assert!(validate(&spec(), &named).is_ok());

        let named = NamedArgs::new()
            .set("message", "x")
            .set("all", true)
            .set("patch", true);
        let err = validate(&spec(), &named).unwrap_err();
        assert_eq!(
            err,
            BindError::Conflict {
                first: "all".into(),
                second: "patch".into()
            }
        );
    }
}
