//! Spec manifests: specifications declared in TOML.
//!
//! ```toml
//! description = "git commit"
//! conflicts = [["all", "patch"]]
//!
//! [[entry]]
//! kind = "literal"
//! value = "commit"
//!
//! [[entry]]
//! kind = "flag"
//! name = "all"
//! aliases = ["a"]
//!
//! [[entry]]
//! kind = "operand"
//! name = "paths"
//! repeatable = true
//! separator = "--"
//! ```
//!
//! Every manifest goes through [`SpecBuilder`], so definition-time checks
//! are identical to specifications built in code. Custom options need a
//! token-builder function and cannot be declared here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::{ArgValue, DefinitionError, Operand, Opt, SpecBuilder, Specification, ValueType};

/// Errors that can occur when loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read spec file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse spec file: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid specification: {0}")]
    Definition(#[from] DefinitionError),

    #[error("Entry '{name}' of kind '{kind}' cannot be declared in a manifest")]
    Unsupported { kind: &'static str, name: String },
}

/// Root of a manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecManifest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    #[serde(default)]
    pub requires_one_of: Vec<Vec<String>>,
    #[serde(default, rename = "entry")]
    pub entries: Vec<EntryDecl>,
}

/// One `[[entry]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryDecl {
    Literal { value: String },
    Flag(OptionDecl),
    Value(OptionDecl),
    FlagOrValue(OptionDecl),
    KeyValue(OptionDecl),
    Metadata(OptionDecl),
    Custom(OptionDecl),
    Operand(OperandDecl),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionDecl {
    pub name: String,
    pub aliases: Vec<String>,
    /// Explicit flag, e.g. `--trailer`.
    pub flag: Option<String>,
    pub required: bool,
    pub allow_nil: bool,
    pub types: Option<Vec<ValueType>>,
    pub negatable: bool,
    pub max_times: Option<u32>,
    pub inline: bool,
    pub repeatable: bool,
    pub allow_empty: bool,
    pub as_operand: bool,
    pub separator: Option<String>,
    pub key_separator: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OperandDecl {
    pub name: String,
    pub required: bool,
    pub repeatable: bool,
    pub default: Option<ArgValue>,
    pub separator: Option<String>,
    pub allow_nil: bool,
}

impl SpecManifest {
    /// Parse manifest text.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        toml::from_str(content).map_err(|e| ManifestError::ParseError { source: e })
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path).map_err(|e| ManifestError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let manifest = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            entries = manifest.entries.len(),
            "loaded spec manifest"
        );
        Ok(manifest)
    }

    /// Build the specification through [`SpecBuilder`].
    pub fn into_specification(self) -> Result<Specification, ManifestError> {
        let mut builder = SpecBuilder::new();
        for entry in self.entries {
            builder = match entry {
                EntryDecl::Literal { value } => builder.literal(value),
                EntryDecl::Flag(decl) => builder.flag(decl.into_opt()),
                EntryDecl::Value(decl) => builder.value(decl.into_opt()),
                EntryDecl::FlagOrValue(decl) => builder.flag_or_value(decl.into_opt()),
                EntryDecl::KeyValue(decl) => builder.key_value(decl.into_opt()),
                EntryDecl::Metadata(decl) => builder.metadata(decl.into_opt()),
                EntryDecl::Custom(decl) => {
                    return Err(ManifestError::Unsupported {
                        kind: "custom",
                        name: decl.name,
                    })
                }
                EntryDecl::Operand(decl) => builder.operand(decl.into_operand()),
            };
        }
        for group in self.conflicts {
            builder = builder.conflicts(group);
        }
        for group in self.requires_one_of {
            builder = builder.requires_one_of(group);
        }
        Ok(builder.build()?)
    }
}

/// Load a manifest file straight into a specification.
pub fn load_specification(path: &Path) -> Result<Specification, ManifestError> {
    SpecManifest::load(path)?.into_specification()
}

impl OptionDecl {
    fn into_opt(self) -> Opt {
        let mut opt = Opt::new(self.name);
        for alias in self.aliases {
            opt = opt.alias(alias);
        }
        if let Some(flag) = self.flag {
            opt = opt.as_flag(flag);
        }
        if let Some(types) = self.types {
            opt = opt.types(types);
        }
        if let Some(n) = self.max_times {
            opt = opt.max_times(n);
        }
        if let Some(sep) = self.separator {
            opt = opt.separator(sep);
        }
        if let Some(sep) = self.key_separator {
            opt = opt.key_separator(sep);
        }
        let switches: [(bool, fn(Opt) -> Opt); 7] = [
            (self.required, Opt::required),
            (self.allow_nil, Opt::allow_nil),
            (self.negatable, Opt::negatable),
            (self.inline, Opt::inline),
            (self.repeatable, Opt::repeatable),
            (self.allow_empty, Opt::allow_empty),
            (self.as_operand, Opt::as_operand),
        ];
        for (on, apply) in switches {
            if on {
                opt = apply(opt);
            }
        }
        opt
    }
}

impl OperandDecl {
    fn into_operand(self) -> Operand {
        let mut operand = Operand::new(self.name);
        if self.required {
            operand = operand.required();
        }
        if self.repeatable {
            operand = operand.repeatable();
        }
        if let Some(default) = self.default {
            operand = operand.default(default);
        }
        if let Some(sep) = self.separator {
            operand = operand.separator(sep);
        }
        if self.allow_nil {
            operand = operand.allow_nil();
        }
        operand
    }
}
