//! Go interface generation.
//!
//! - [`typeparser`] turns syntax-tree type expressions into the [`types`] model.
//! - [`types`] renders the model back to canonical Go type syntax.
//! - [`generator`] collects a struct's exported methods and prints the interface.
//! - [`gomodule`] finds a package's sources in `GOPATH` or the module cache.

pub mod cli;
pub mod error;
pub mod generator;
pub mod gomodule;
pub mod typeparser;
pub mod types;

pub use error::{Construct, Error, ModuleError, Result, TypeError};
pub use generator::{find_source_files, generate, Options};
pub use typeparser::TypeParser;
pub use types::{ChanDir, FuncType, Param, QualifierKind, Type, TypeKind};
