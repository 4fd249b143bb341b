//! Bound result: tokens plus the values that produced them.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;

use crate::spec::definition::OptionKind;
use crate::spec::error::BindError;
use crate::spec::registry::Specification;
use crate::spec::value::ArgValue;

/// Product of a successful [`Specification::bind`].
#[derive(Debug, Clone)]
pub struct BoundArgs {
    spec: Specification,
    tokens: Vec<String>,
    options: IndexMap<String, ArgValue>,
    operands: IndexMap<String, ArgValue>,
}

impl BoundArgs {
    pub(crate) fn new(
        spec: Specification,
        tokens: Vec<String>,
        options: IndexMap<String, ArgValue>,
        operands: IndexMap<String, ArgValue>,
    ) -> Self {
        Self {
            spec,
            tokens,
            options,
            operands,
        }
    }

    /// Argument vector for the external tool, in output order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Effective option value by any alias. Unsupplied plain flags read as `false`.
    pub fn option(&self, name: &str) -> Option<&ArgValue> {
        let canonical = self.spec.canonical_name(name)?;
        self.options.get(canonical)
    }

    pub fn operand(&self, name: &str) -> Option<&ArgValue> {
        self.operands.get(name)
    }

    /// Option first, then operand.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.option(name).or_else(|| self.operand(name))
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn operands(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.operands.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Directives for the process runner, read from metadata options.
    ///
    /// `timeout` (non-negative seconds) and `chdir` (a string path) are
    /// recognised and must have those shapes; every other non-nil metadata
    /// value lands in `extra`.
    pub fn execution_options(&self) -> Result<ExecutionOptions, BindError> {
        let mut exec = ExecutionOptions::default();
        for def in self.spec.options() {
            if !matches!(def.kind, OptionKind::Metadata) {
                continue;
            }
            let name = def.canonical();
            let Some(value) = self.options.get(name).filter(|v| !v.is_nil()) else {
                continue;
            };
            match name {
                "timeout" => exec.timeout = Some(timeout_from(value)?),
                "chdir" => match value {
                    ArgValue::Str(dir) => exec.chdir = Some(PathBuf::from(dir)),
                    other => {
                        return Err(BindError::InvalidValue {
                            name: name.to_string(),
                            reason: format!("must be a String path, got {}", other.type_name()),
                        })
                    }
                },
                _ => {
                    exec.extra.insert(name.to_string(), value.clone());
                }
            }
        }
        Ok(exec)
    }
}

fn timeout_from(value: &ArgValue) -> Result<Duration, BindError> {
    let invalid = |reason: String| BindError::InvalidValue {
        name: "timeout".to_string(),
        reason,
    };
    match value {
        ArgValue::Int(secs) => u64::try_from(*secs)
            .map(Duration::from_secs)
            .map_err(|_| invalid(format!("must be a non-negative number of seconds, got {secs}"))),
        ArgValue::Float(secs) => Duration::try_from_secs_f64(*secs)
            .map_err(|e| invalid(format!("{secs} is not a usable number of seconds: {e}"))),
        other => Err(invalid(format!(
            "must be Integer or Float seconds, got {}",
            other.type_name()
        ))),
    }
}

/// Execution directives consumed by the process runner instead of being
/// passed to the external tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionOptions {
    pub timeout: Option<Duration>,
    pub chdir: Option<PathBuf>,
    pub extra: IndexMap<String, ArgValue>,
}

impl ExecutionOptions {
    pub fn is_empty(&self) -> bool {
        self.timeout.is_none() && self.chdir.is_none() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::definition::Opt;
    use crate::spec::error::BindError;
    use crate::spec::registry::Specification;
    use crate::spec::value::{ArgValue, NamedArgs, ValueType};
    use std::time::Duration;

    fn spec() -> Specification {
        Specification::builder()
            .literal("fetch")
            .flag(Opt::new("prune").alias("p"))
            .metadata(Opt::new("timeout").types([ValueType::Integer, ValueType::Float]))
            .metadata(Opt::new("chdir").types([ValueType::String]))
            .metadata(Opt::new("raise_on_failure"))
            .build()
            .unwrap()
    }

    #[test]
    fn metadata_never_renders() {
        let bound = spec()
            .bind_named(&NamedArgs::new().set("timeout", 5).set("chdir", "/tmp/repo"))
            .unwrap();
        assert_eq!(bound.tokens(), &["fetch".to_string()]);
    }

    #[test]
    fn execution_options_are_extracted() {
        let bound = spec()
            .bind_named(
                &NamedArgs::new()
                    .set("timeout", 1.5)
                    .set("chdir", "/tmp/repo")
                    .set("raise_on_failure", false),
            )
            .unwrap();
        let exec = bound.execution_options().unwrap();
        assert_eq!(exec.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(exec.chdir.as_deref(), Some(std::path::Path::new("/tmp/repo")));
        assert_eq!(exec.extra.get("raise_on_failure"), Some(&ArgValue::Bool(false)));
    }

    #[test]
    fn out_of_range_timeouts_are_rejected() {
        for value in [ArgValue::Float(1e30), ArgValue::Int(-5), ArgValue::Float(-0.5)] {
            let bound = spec()
                .bind_named(&NamedArgs::new().set("timeout", value.clone()))
                .unwrap();
            let err = bound.execution_options().unwrap_err();
            assert!(
                matches!(&err, BindError::InvalidValue { name, .. } if name == "timeout"),
                "{value}: {err}"
            );
        }
    }

    #[test]
    fn untyped_directives_must_have_the_right_shape() {
        let spec = Specification::builder()
            .metadata(Opt::new("timeout"))
            .metadata(Opt::new("chdir"))
            .build()
            .unwrap();

        let bound = spec
            .bind_named(&NamedArgs::new().set("timeout", "5"))
            .unwrap();
        assert_eq!(
            bound.execution_options().unwrap_err().to_string(),
            "Invalid value for 'timeout': must be Integer or Float seconds, got String"
        );

        let bound = spec.bind_named(&NamedArgs::new().set("chdir", 3)).unwrap();
        assert_eq!(
            bound.execution_options().unwrap_err().to_string(),
            "Invalid value for 'chdir': must be a String path, got Integer"
        );
    }

    #[test]
    fn flags_default_to_false_and_aliases_resolve() {
        let bound = spec().bind_named(&NamedArgs::new()).unwrap();
        assert_eq!(bound.option("p"), Some(&ArgValue::Bool(false)));
        assert_eq!(bound.get("prune"), Some(&ArgValue::Bool(false)));
        assert!(bound.execution_options().unwrap().is_empty());
    }
}
