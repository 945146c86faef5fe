//! Error types for the generator.

/// Malformed directive payloads. Produced by the signature parser and the
/// directive scanner; never carries location information by itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing function name before '('")]
    MissingName,

    #[error("invalid function name {0:?}")]
    InvalidName(String),

    #[error("missing '(' after function name")]
    MissingParen,

    #[error("unbalanced parentheses")]
    UnbalancedParen,

    #[error("trailing garbage {0:?}")]
    TrailingGarbage(String),

    #[error("invalid field {0:?}: expected `name type`")]
    FieldFormat(String),

    #[error("variadic parameter {0:?} is not supported")]
    Variadic(String),

    #[error("only a trailing error is allowed as the second return")]
    NonErrorSecondReturn,

    #[error("too many return values")]
    TooManyReturns,

    #[error("unrecognized directive {0:?}")]
    UnknownDirective(String),

    #[error("invalid import {0:?}: expected `\"path\"` or `alias \"path\"`")]
    ImportFormat(String),

    #[error("invalid convert {0:?}: expected `typeName converterName`")]
    ConvertFormat(String),
}

/// Errors that can occur while generating wrappers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A directive line could not be parsed.
    #[error("{origin}:{line}: {kind}: {text}")]
    Directive {
        origin: String,
        line: usize,
        text: String,
        kind: ParseError,
    },

    /// A parameter type has no registered converter.
    #[error("{function}: no converter for {type_name:?} (parameter {param:?})")]
    UnknownConverter {
        function: String,
        param: String,
        type_name: String,
    },

    /// The same import path was registered under two different aliases.
    #[error("import {path:?} registered with alias {existing:?} and {requested:?}")]
    ImportConflict {
        path: String,
        existing: Option<String>,
        requested: Option<String>,
    },

    /// Two functions resolve to the same name with different signatures.
    #[error("duplicate function {name:?}: `{first}` and `{second}`")]
    DuplicateFunction {
        name: String,
        first: String,
        second: String,
    },

    /// The package clause of a source could not be read.
    #[error("{origin}: {detail}")]
    PackageClause { origin: String, detail: String },

    /// Sources of one run declare different packages.
    #[error("{origin}: package {found:?} does not match {expected:?}")]
    PackageMismatch {
        origin: String,
        expected: String,
        found: String,
    },

    /// Nothing declared the package of the generated file.
    #[error("no package clause found in any source")]
    MissingPackage,

    /// The rendered text was rejected by the formatter.
    #[error("formatting generated source failed: {message}\n{raw}")]
    Format { message: String, raw: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walking source directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, Error>;
