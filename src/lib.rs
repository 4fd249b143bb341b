//! Declarative calling conventions for external command-line tools.
//!
//! Define a command's literals, options and operands once as a
//! [`spec::Specification`], then bind call values against it to get an
//! ordered, validated argument vector plus execution directives.

pub mod config;
pub mod logging;
pub mod manifest;
pub mod spec;
