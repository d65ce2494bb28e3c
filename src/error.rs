use goiface_syntax::ast::Span;
use goiface_syntax::Diag;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Type-expression shapes that have no counterpart in the type model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    NonEmptyInterface,
    NonEmptyStruct,
    TypeArguments,
    GenericReceiver,
    /// `[...]T` outside a composite literal.
    ImplicitArrayLength,
    /// `...T` anywhere but a parameter list.
    MisplacedVariadic,
    /// A node left behind by parser error recovery.
    Malformed,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Construct::NonEmptyInterface => "interface with methods or embedded types",
            Construct::NonEmptyStruct => "struct with fields",
            Construct::TypeArguments => "generic type instantiation",
            Construct::GenericReceiver => "method on a generic type",
            Construct::ImplicitArrayLength => "array type with `...` length",
            Construct::MisplacedVariadic => "variadic type outside a parameter list",
            Construct::Malformed => "malformed type",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unsupported {construct}")]
    Unsupported { construct: Construct, span: Span },

    #[error("can only use ... with final parameter in list")]
    VariadicNotLast { span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match *self {
            TypeError::Unsupported { span, .. } | TypeError::VariadicNotLast { span } => span,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("empty source package path")]
    EmptyPath,

    #[error("invalid module version {0:?} (expected something like v1.9.0)")]
    InvalidVersion(String),

    #[error("cannot locate the module cache: set GOMODCACHE, GOPATH or HOME")]
    NoModCache,

    #[error("module {module} not found (looked in {})", .searched.display())]
    NotFound { module: String, searched: PathBuf },

    #[error("reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("reading {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}:{column}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
        diags: Vec<Diag>,
    },

    #[error("{}:{line}:{column}: {source}", .path.display())]
    Type {
        path: PathBuf,
        line: usize,
        column: usize,
        #[source]
        source: TypeError,
    },

    #[error("no Go source files to read")]
    NoSourceFiles,

    #[error("type {0} is not declared in the source package")]
    StructNotFound(String),

    #[error("type {0} has no exported methods")]
    NoMethods(String),

    #[error(transparent)]
    Module(#[from] ModuleError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
