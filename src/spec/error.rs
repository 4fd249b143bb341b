//! Definition-time and bind-time errors.

use thiserror::Error;

/// Errors raised while building a [`Specification`](crate::spec::Specification).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Option names must be non-empty")]
    EmptyName,

    #[error("Alias '{alias}' is already used by option '{existing}'")]
    DuplicateAlias { alias: String, existing: String },

    #[error("Operand '{name}' is declared more than once")]
    DuplicateOperand { name: String },

    #[error("Only one repeatable operand is allowed ('{first}' and '{second}')")]
    MultipleRepeatableOperands { first: String, second: String },

    #[error("Option '{name}' cannot combine expected types with a custom validator")]
    TypeAndValidator { name: String },

    #[error("Option '{name}' has contradictory modifiers: {reason}")]
    ContradictoryModifiers { name: String, reason: String },

    #[error("{group} refers to unknown option '{name}'")]
    UnknownGroupMember { group: &'static str, name: String },

    #[error("{group} needs at least two options, got {count}")]
    GroupTooSmall { group: &'static str, count: usize },
}

/// Errors raised by `bind`. No tokens are produced when any of these fire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("Unsupported options: {}", .keys.join(", "))]
    UnsupportedKeys { keys: Vec<String> },

    #[error("Option '{canonical}' given more than once via aliases: {}", .aliases.join(", "))]
    AliasCollision {
        canonical: String,
        aliases: Vec<String>,
    },

    #[error("Missing required {what}: {name}")]
    MissingRequired { what: &'static str, name: String },

    #[error("{what} '{name}' cannot be nil")]
    NilNotAllowed { what: &'static str, name: String },

    #[error("Option '{name}' must be {expected}, but was {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Option '{name}' failed validation (got {actual})")]
    ValidatorRejected { name: String, actual: String },

    #[error("Options '{first}' and '{second}' cannot be given together")]
    Conflict { first: String, second: String },

    #[error("Operand '{name}' contains nil among its values")]
    NilInRepeatable { name: String },

    #[error("Unexpected extra arguments: {}", .values.join(", "))]
    UnexpectedArguments { values: Vec<String> },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

impl BindError {
    /// Short machine-friendly tag, used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedKeys { .. } => "unsupported_keys",
            Self::AliasCollision { .. } => "alias_collision",
            Self::MissingRequired { .. } => "missing_required",
            Self::NilNotAllowed { .. } => "nil_not_allowed",
            Self::TypeMismatch { .. } | Self::ValidatorRejected { .. } => "type_mismatch",
            Self::Conflict { .. } => "conflict",
            Self::NilInRepeatable { .. } | Self::UnexpectedArguments { .. } => "allocation",
            Self::InvalidValue { .. } => "invalid_value",
        }
    }
}
