//! Argument specification and binding engine.
//!
//! A [`Specification`] describes the calling convention of one external
//! command: literals, options and operands in output order. Binding call
//! values against it runs a fixed pipeline:
//!
//! ```text
//! NamedArgs ──► validate ──┐
//!                          ├──► render (entry order) ──► BoundArgs
//! positionals ─► allocate ─┘
//! ```
//!
//! Each stage is a pure function over the frozen specification, so one
//! specification can be bound from many threads at once.
//!
//! ```
//! use argbind::spec::{NamedArgs, Opt, Specification};
//!
//! let spec = Specification::builder()
//!     .literal("commit")
//!     .flag(Opt::new("force"))
//!     .value(Opt::new("branch").inline())
//!     .build()
//!     .unwrap();
//!
//! let bound = spec
//!     .bind_named(&NamedArgs::new().set("force", true).set("branch", "main"))
//!     .unwrap();
//! assert_eq!(bound.tokens(), ["commit", "--force", "--branch=main"]);
//! ```

mod allocator;
mod bound;
mod definition;
mod error;
mod key_value;
mod registry;
mod render;
mod validate;
mod value;

pub use bound::{BoundArgs, ExecutionOptions};
pub use definition::{
    derive_flag, inline_token, is_short_flag, negate_flag, CustomTokens, Entry, Operand,
    OperandDef, Opt, OptionDef, OptionKind, TokenBuilder, Validator,
};
pub use error::{BindError, DefinitionError};
pub use key_value::KeyValueInput;
pub use registry::{SpecBuilder, Specification};
pub use value::{ArgValue, NamedArgs, ValueType};
