//! Specification registry: declarations in order, frozen on `build()`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::spec::bound::BoundArgs;
use crate::spec::definition::{
    CustomTokens, Entry, KindTag, Operand, OperandDef, Opt, OptionDef, TokenBuilder,
};
use crate::spec::error::{BindError, DefinitionError};
use crate::spec::value::{ArgValue, NamedArgs};
use crate::spec::{allocator, render, validate};

/// Builder for a [`Specification`]. One method per definition kind; entries
/// keep the order they are declared in.
///
/// The first definition error is remembered and returned from [`build`](Self::build),
/// so declarations can be chained without intermediate `?`.
#[derive(Default)]
pub struct SpecBuilder {
    entries: Vec<Entry>,
    alias_index: HashMap<String, String>,
    conflicts: Vec<Vec<String>>,
    requires_one_of: Vec<Vec<String>>,
    error: Option<DefinitionError>,
}

impl SpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed token, always emitted at this position.
    pub fn literal(mut self, token: impl Into<String>) -> Self {
        self.entries.push(Entry::Literal(token.into()));
        self
    }

    pub fn flag(self, opt: Opt) -> Self {
        self.option(opt, KindTag::Flag, None)
    }

    pub fn value(self, opt: Opt) -> Self {
        self.option(opt, KindTag::Value, None)
    }

    pub fn flag_or_value(self, opt: Opt) -> Self {
        self.option(opt, KindTag::FlagOrValue, None)
    }

    pub fn key_value(self, opt: Opt) -> Self {
        self.option(opt, KindTag::KeyValue, None)
    }

    /// Option rendered by `builder`; its output may be one token or many.
    pub fn custom<F, T>(self, opt: Opt, builder: F) -> Self
    where
        F: Fn(&ArgValue) -> T + Send + Sync + 'static,
        T: Into<CustomTokens>,
    {
        let builder: TokenBuilder =
            Arc::new(move |value: &ArgValue| -> CustomTokens { builder(value).into() });
        self.option(opt, KindTag::Custom, Some(builder))
    }

    /// Validated like any option, never rendered.
    pub fn metadata(self, opt: Opt) -> Self {
        self.option(opt, KindTag::Metadata, None)
    }

    pub fn operand(mut self, operand: Operand) -> Self {
        if self.error.is_some() {
            return self;
        }
        match operand.into_def().and_then(|def| self.check_operand(&def).map(|()| def)) {
            Ok(def) => self.entries.push(Entry::Operand(def)),
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Mutually exclusive options. Any alias may be used to name a member.
    pub fn conflicts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.resolve_group("conflicts", names) {
            Ok(group) => self.conflicts.push(group),
            Err(e) => self.error = self.error.take().or(Some(e)),
        }
        self
    }

    /// At least one member must be present at bind time.
    pub fn requires_one_of<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.resolve_group("requires_one_of", names) {
            Ok(group) => self.requires_one_of.push(group),
            Err(e) => self.error = self.error.take().or(Some(e)),
        }
        self
    }

    pub fn build(self) -> Result<Specification, DefinitionError> {
        if let Some(e) = self.error {
            tracing::debug!(error = %e, "specification rejected");
            return Err(e);
        }

        let spec = Specification {
            inner: Arc::new(SpecInner {
                entries: self.entries,
                alias_index: self.alias_index,
                conflicts: self.conflicts,
                requires_one_of: self.requires_one_of,
            }),
        };
        tracing::debug!(
            entries = spec.inner.entries.len(),
            options = spec.options().count(),
            operands = spec.operands().count(),
            "specification built"
        );
        Ok(spec)
    }

    fn option(mut self, opt: Opt, tag: KindTag, custom: Option<TokenBuilder>) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(e) = self.check_aliases(opt.names()) {
            self.error = Some(e);
            return self;
        }
        match opt.into_def(tag, custom) {
            Ok(def) => {
                for name in &def.names {
                    self.alias_index.insert(name.clone(), def.canonical().to_string());
                }
                self.entries.push(Entry::Option(def));
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    fn check_aliases(&self, names: &[String]) -> Result<(), DefinitionError> {
        let mut seen = Vec::new();
        for name in names {
            if let Some(existing) = self.alias_index.get(name) {
                return Err(DefinitionError::DuplicateAlias {
                    alias: name.clone(),
                    existing: existing.clone(),
                });
            }
            if self.operand_defs().any(|o| &o.name == name) || seen.contains(&name) {
                return Err(DefinitionError::DuplicateAlias {
                    alias: name.clone(),
                    existing: names[0].clone(),
                });
            }
            seen.push(name);
        }
        Ok(())
    }

    fn check_operand(&self, def: &OperandDef) -> Result<(), DefinitionError> {
        if self.operand_defs().any(|o| o.name == def.name)
            || self.alias_index.contains_key(&def.name)
        {
            return Err(DefinitionError::DuplicateOperand {
                name: def.name.clone(),
            });
        }
        if def.repeatable {
            if let Some(first) = self.operand_defs().find(|o| o.repeatable) {
                return Err(DefinitionError::MultipleRepeatableOperands {
                    first: first.name.clone(),
                    second: def.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn operand_defs(&self) -> impl Iterator<Item = &OperandDef> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Operand(def) => Some(def),
            _ => None,
        })
    }

    fn resolve_group<I, S>(
        &self,
        group: &'static str,
        names: I,
    ) -> Result<Vec<String>, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resolved: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            let canonical = self
                .alias_index
                .get(&name)
                .ok_or(DefinitionError::UnknownGroupMember { group, name: name.clone() })?;
            if !resolved.contains(canonical) {
                resolved.push(canonical.clone());
            }
        }
        if resolved.len() < 2 && group == "conflicts" {
            return Err(DefinitionError::GroupTooSmall {
                group,
                count: resolved.len(),
            });
        }
        Ok(resolved)
    }
}

#[derive(Debug)]
struct SpecInner {
    entries: Vec<Entry>,
    alias_index: HashMap<String, String>,
    conflicts: Vec<Vec<String>>,
    requires_one_of: Vec<Vec<String>>,
}

/// The frozen calling convention of one external command.
///
/// Cheap to clone and safe to share across threads; `bind` never mutates it.
#[derive(Debug, Clone)]
pub struct Specification {
    inner: Arc<SpecInner>,
}

impl Specification {
    pub fn builder() -> SpecBuilder {
        SpecBuilder::new()
    }

    /// Entries in declaration order (the output order).
    pub fn entries(&self) -> &[Entry] {
        &self.inner.entries
    }

    pub fn options(&self) -> impl Iterator<Item = &OptionDef> {
        self.inner.entries.iter().filter_map(|e| match e {
            Entry::Option(def) => Some(def),
            _ => None,
        })
    }

    pub fn operands(&self) -> impl Iterator<Item = &OperandDef> {
        self.inner.entries.iter().filter_map(|e| match e {
            Entry::Operand(def) => Some(def),
            _ => None,
        })
    }

    /// Canonical name for any alias.
    pub fn canonical_name(&self, alias: &str) -> Option<&str> {
        self.inner.alias_index.get(alias).map(String::as_str)
    }

    /// Option definition by any alias.
    pub fn option(&self, alias: &str) -> Option<&OptionDef> {
        let canonical = self.canonical_name(alias)?;
        self.options().find(|d| d.canonical() == canonical)
    }

    pub fn conflict_groups(&self) -> &[Vec<String>] {
        &self.inner.conflicts
    }

    pub fn requires_one_of_groups(&self) -> &[Vec<String>] {
        &self.inner.requires_one_of
    }

    /// Resolve call values into tokens.
    ///
    /// Validation runs first, then operand allocation, then rendering in
    /// entry order. Any failure aborts the whole bind.
    pub fn bind(
        &self,
        positionals: &[ArgValue],
        named: &NamedArgs,
    ) -> Result<BoundArgs, BindError> {
        let result = self.bind_inner(positionals, named);
        match &result {
            Ok(bound) => tracing::debug!(tokens = bound.tokens().len(), "bind succeeded"),
            Err(e) => tracing::debug!(kind = e.kind(), error = %e, "bind failed"),
        }
        result
    }

    /// Shorthand for binding named options only.
    pub fn bind_named(&self, named: &NamedArgs) -> Result<BoundArgs, BindError> {
        self.bind(&[], named)
    }

    fn bind_inner(
        &self,
        positionals: &[ArgValue],
        named: &NamedArgs,
    ) -> Result<BoundArgs, BindError> {
        let normalized = validate::validate(self, named)?;

        let slots: Vec<&OperandDef> = self.operands().collect();
        let allocated = allocator::allocate(&slots, positionals)?;

        let tokens = render::render(self.entries(), &normalized, &allocated)?;

        let options = self
            .options()
            .map(|def| {
                let value = normalized
                    .get(def.canonical())
                    .cloned()
                    .unwrap_or_else(|| def.default_value());
                (def.canonical().to_string(), value)
            })
            .collect();
        let operands = slots
            .iter()
            .zip(allocated)
            .map(|(slot, value)| (slot.name.clone(), value))
            .collect();

        Ok(BoundArgs::new(self.clone(), tokens, options, operands))
    }
}
