//! Definition model: literals, options and operands a specification holds.
//!
//! [`Opt`] and [`Operand`] are the modifier builders callers hand to
//! [`SpecBuilder`](crate::spec::SpecBuilder); the builder turns them into the
//! frozen [`OptionDef`] / [`OperandDef`] stored in a specification.

use std::fmt;
use std::sync::Arc;

use crate::spec::error::DefinitionError;
use crate::spec::value::{ArgValue, ValueType};

/// Custom predicate applied to non-nil values.
pub type Validator = Arc<dyn Fn(&ArgValue) -> bool + Send + Sync>;

/// User-supplied token builder for custom options.
pub type TokenBuilder = Arc<dyn Fn(&ArgValue) -> CustomTokens + Send + Sync>;

/// What a custom token builder hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomTokens {
    None,
    One(String),
    Many(Vec<String>),
}

impl CustomTokens {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::One(token) => vec![token],
            Self::Many(tokens) => tokens,
        }
    }
}

impl From<String> for CustomTokens {
    fn from(token: String) -> Self {
        Self::One(token)
    }
}

impl From<&str> for CustomTokens {
    fn from(token: &str) -> Self {
        Self::One(token.to_string())
    }
}

impl From<Vec<String>> for CustomTokens {
    fn from(tokens: Vec<String>) -> Self {
        Self::Many(tokens)
    }
}

impl From<Option<String>> for CustomTokens {
    fn from(token: Option<String>) -> Self {
        token.map_or(Self::None, Self::One)
    }
}

/// Rendering behavior of an option. One variant per kind; the renderer
/// matches exhaustively on it.
#[derive(Clone)]
pub enum OptionKind {
    /// `--flag` when truthy. Negatable flags require a strict boolean and
    /// render `false` as `--no-flag`.
    Flag {
        negatable: bool,
        max_times: Option<u32>,
    },
    /// `--flag value`, `--flag=value`, or a bare value when `as_operand`.
    Value {
        inline: bool,
        repeatable: bool,
        allow_empty: bool,
        as_operand: bool,
        separator: Option<String>,
    },
    /// Bare flag for `true`, flag plus value for a scalar.
    FlagOrValue { inline: bool, negatable: bool },
    /// One `--flag key=value` pair per entry of a mapping or pair list.
    KeyValue { inline: bool, key_separator: String },
    Custom(TokenBuilder),
    /// Validated but never rendered; read back as an execution directive.
    Metadata,
}

impl OptionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flag {
                negatable: true, ..
            } => "negatable flag",
            Self::Flag { .. } => "flag",
            Self::Value { inline: true, .. } => "inline value",
            Self::Value {
                as_operand: true, ..
            } => "value (as operand)",
            Self::Value { .. } => "value",
            Self::FlagOrValue {
                negatable: true, ..
            } => "negatable flag-or-value",
            Self::FlagOrValue { .. } => "flag-or-value",
            Self::KeyValue { .. } => "key-value",
            Self::Custom(_) => "custom",
            Self::Metadata => "metadata",
        }
    }
}

impl fmt::Debug for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag {
                negatable,
                max_times,
            } => f
                .debug_struct("Flag")
                .field("negatable", negatable)
                .field("max_times", max_times)
                .finish(),
            Self::Value {
                inline,
                repeatable,
                allow_empty,
                as_operand,
                separator,
            } => f
                .debug_struct("Value")
                .field("inline", inline)
                .field("repeatable", repeatable)
                .field("allow_empty", allow_empty)
                .field("as_operand", as_operand)
                .field("separator", separator)
                .finish(),
            Self::FlagOrValue { inline, negatable } => f
                .debug_struct("FlagOrValue")
                .field("inline", inline)
                .field("negatable", negatable)
                .finish(),
            Self::KeyValue {
                inline,
                key_separator,
            } => f
                .debug_struct("KeyValue")
                .field("inline", inline)
                .field("key_separator", key_separator)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Metadata => f.write_str("Metadata"),
        }
    }
}

/// A frozen option definition.
#[derive(Clone)]
pub struct OptionDef {
    /// Aliases, canonical first.
    pub names: Vec<String>,
    /// Rendered flag (derived from the canonical name unless overridden).
    pub flag: String,
    pub required: bool,
    pub allow_nil: bool,
    pub expected_types: Option<Vec<ValueType>>,
    pub validator: Option<Validator>,
    pub kind: OptionKind,
}

impl OptionDef {
    pub fn canonical(&self) -> &str {
        &self.names[0]
    }

    /// Resolved value when the caller did not supply one. Plain flags
    /// default to `false`; everything else to nil.
    pub fn default_value(&self) -> ArgValue {
        match self.kind {
            OptionKind::Flag {
                negatable: false, ..
            } => ArgValue::Bool(false),
            _ => ArgValue::Nil,
        }
    }
}

impl fmt::Debug for OptionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDef")
            .field("names", &self.names)
            .field("flag", &self.flag)
            .field("required", &self.required)
            .field("allow_nil", &self.allow_nil)
            .field("expected_types", &self.expected_types)
            .field("validator", &self.validator.as_ref().map(|_| ".."))
            .field("kind", &self.kind)
            .finish()
    }
}

/// A frozen positional slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OperandDef {
    pub name: String,
    pub required: bool,
    pub repeatable: bool,
    pub default: Option<ArgValue>,
    /// Literal emitted right before the operand's value(s), e.g. `--`.
    pub separator: Option<String>,
    /// A nil value may occupy this slot (and satisfy `required`) without output.
    pub allow_nil: bool,
}

impl OperandDef {
    /// Required with no default: must be fed from the positional values.
    pub(crate) fn needs_value(&self) -> bool {
        self.required && self.default.is_none()
    }
}

/// One entry of a specification, in declaration order.
#[derive(Debug, Clone)]
pub enum Entry {
    Literal(String),
    Option(OptionDef),
    Operand(OperandDef),
}

/// Modifier builder for an option definition.
#[derive(Clone, Default)]
pub struct Opt {
    names: Vec<String>,
    flag: Option<String>,
    required: bool,
    allow_nil: bool,
    expected_types: Option<Vec<ValueType>>,
    validator: Option<Validator>,
    negatable: bool,
    max_times: Option<u32>,
    inline: bool,
    repeatable: bool,
    allow_empty: bool,
    as_operand: bool,
    separator: Option<String>,
    key_separator: Option<String>,
}

/// Which option kind an [`Opt`] is being turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KindTag {
    Flag,
    Value,
    FlagOrValue,
    KeyValue,
    Custom,
    Metadata,
}

impl Opt {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            ..Self::default()
        }
    }

    /// Add an alias. The first name stays canonical.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Override the derived flag, e.g. `--trailer` for an option named `trailers`.
    pub fn as_flag(mut self, flag: impl Into<String>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    pub fn types(mut self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.expected_types = Some(types.into_iter().collect());
        self
    }

    pub fn validator(mut self, f: impl Fn(&ArgValue) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(f));
        self
    }

    pub fn negatable(mut self) -> Self {
        self.negatable = true;
        self
    }

    pub fn max_times(mut self, n: u32) -> Self {
        self.max_times = Some(n);
        self
    }

    pub fn inline(mut self) -> Self {
        self.inline = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn as_operand(mut self) -> Self {
        self.as_operand = true;
        self
    }

    pub fn separator(mut self, literal: impl Into<String>) -> Self {
        self.separator = Some(literal.into());
        self
    }

    pub fn key_separator(mut self, sep: impl Into<String>) -> Self {
        self.key_separator = Some(sep.into());
        self
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    /// Freeze into an [`OptionDef`] of the given kind, rejecting modifiers
    /// that make no sense together or for that kind.
    pub(crate) fn into_def(
        self,
        tag: KindTag,
        custom: Option<TokenBuilder>,
    ) -> Result<OptionDef, DefinitionError> {
        let canonical = match self.names.first() {
            Some(name) if !name.is_empty() => name.clone(),
            _ => return Err(DefinitionError::EmptyName),
        };
        if self.names.iter().any(String::is_empty) {
            return Err(DefinitionError::EmptyName);
        }
        if self.expected_types.is_some() && self.validator.is_some() {
            return Err(DefinitionError::TypeAndValidator { name: canonical });
        }
        let contradiction = |reason: &str| DefinitionError::ContradictoryModifiers {
            name: canonical.clone(),
            reason: reason.to_string(),
        };
        if self.inline && self.as_operand {
            return Err(contradiction("inline cannot be combined with as_operand"));
        }
        if self.separator.is_some() && !self.as_operand {
            return Err(contradiction("separator requires as_operand"));
        }
        if self.as_operand && self.flag.is_some() {
            return Err(contradiction("as_operand options render no flag to override"));
        }

        let accepts = |modifier: &str, set: bool, allowed: &[KindTag]| {
            if set && !allowed.contains(&tag) {
                Err(contradiction(&format!("{modifier} does not apply to {tag:?} options")))
            } else {
                Ok(())
            }
        };
        use KindTag::*;
        accepts("negatable", self.negatable, &[Flag, FlagOrValue])?;
        accepts("max_times", self.max_times.is_some(), &[Flag])?;
        accepts("inline", self.inline, &[Value, FlagOrValue, KeyValue])?;
        accepts("repeatable", self.repeatable, &[Value])?;
        accepts("allow_empty", self.allow_empty, &[Value])?;
        accepts("as_operand", self.as_operand, &[Value])?;
        accepts("key_separator", self.key_separator.is_some(), &[KeyValue])?;
        accepts("as_flag", self.flag.is_some(), &[Flag, Value, FlagOrValue, KeyValue, Custom])?;

        let kind = match tag {
            Flag => OptionKind::Flag {
                negatable: self.negatable,
                max_times: self.max_times,
            },
            Value => OptionKind::Value {
                inline: self.inline,
                repeatable: self.repeatable,
                allow_empty: self.allow_empty,
                as_operand: self.as_operand,
                separator: self.separator,
            },
            FlagOrValue => OptionKind::FlagOrValue {
                inline: self.inline,
                negatable: self.negatable,
            },
            KeyValue => {
                let key_separator = self.key_separator.unwrap_or_else(|| "=".to_string());
                if key_separator.is_empty() {
                    return Err(contradiction("key_separator must be non-empty"));
                }
                OptionKind::KeyValue {
                    inline: self.inline,
                    key_separator,
                }
            }
            Custom => match custom {
                Some(builder) => OptionKind::Custom(builder),
                None => return Err(contradiction("custom options need a token builder")),
            },
            Metadata => OptionKind::Metadata,
        };

        let flag = self.flag.unwrap_or_else(|| derive_flag(&canonical));
        Ok(OptionDef {
            names: self.names,
            flag,
            required: self.required,
            allow_nil: self.allow_nil,
            expected_types: self.expected_types,
            validator: self.validator,
            kind,
        })
    }
}

/// Modifier builder for a positional slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand(OperandDef);

impl Operand {
    pub fn new(name: impl Into<String>) -> Self {
        Self(OperandDef {
            name: name.into(),
            required: false,
            repeatable: false,
            default: None,
            separator: None,
            allow_nil: false,
        })
    }

    pub fn required(mut self) -> Self {
        self.0.required = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.0.repeatable = true;
        self
    }

    pub fn default(mut self, value: impl Into<ArgValue>) -> Self {
        self.0.default = Some(value.into());
        self
    }

    pub fn separator(mut self, literal: impl Into<String>) -> Self {
        self.0.separator = Some(literal.into());
        self
    }

    pub fn allow_nil(mut self) -> Self {
        self.0.allow_nil = true;
        self
    }

    pub(crate) fn into_def(self) -> Result<OperandDef, DefinitionError> {
        if self.0.name.is_empty() {
            return Err(DefinitionError::EmptyName);
        }
        Ok(self.0)
    }
}

/// `force` → `--force`, `f` → `-f`, `dry_run` → `--dry-run`.
pub fn derive_flag(name: &str) -> String {
    let dashed = name.replace('_', "-");
    if dashed.chars().count() == 1 {
        format!("-{dashed}")
    } else {
        format!("--{dashed}")
    }
}

/// Single dash followed by exactly one character.
pub fn is_short_flag(flag: &str) -> bool {
    match flag.strip_prefix('-') {
        Some(rest) => !rest.starts_with('-') && rest.chars().count() == 1,
        None => false,
    }
}

/// `-f` → `--no-f`, `--force` → `--no-force`.
pub fn negate_flag(flag: &str) -> String {
    if let Some(rest) = flag.strip_prefix("--") {
        format!("--no-{rest}")
    } else {
        format!("--no-{}", flag.trim_start_matches('-'))
    }
}

/// `-m` + `msg` → `-mmsg`, `--branch` + `main` → `--branch=main`.
pub fn inline_token(flag: &str, value: &str) -> String {
    if is_short_flag(flag) {
        format!("{flag}{value}")
    } else {
        format!("{flag}={value}")
    }
}
