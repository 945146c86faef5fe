//! # wrapgen
//!
//! Go code generator for `ugo` callables. This crate scans Go sources for
//! `//ugo:callable` directives and emits adapters turning plain Go functions
//! into functions the `ugo` runtime can call.
//!
//! ## Usage
//!
//! ### 1. Annotate your Go package
//!
//! ```go
//! package mathx
//!
//! //ugo:callable Add(a int, b int) (int)
//! //ugo:callable func(s string) (ret ugo.Object, err error)
//! ```
//!
//! ### 2. Generate the wrappers
//!
//! ```rust,ignore
//! use wrapgen::{CodeGenerator, Gofmt};
//!
//! fn main() -> wrapgen::Result<()> {
//!     CodeGenerator::new()
//!         .add_source_dir("mathx/")?
//!         .set_formatter(Gofmt::default())
//!         .write_to_file("mathx/zcallables.go")
//! }
//! ```
//!
//! Every signature yields a positional wrapper `Add(fn) ugo.CallableFunc` and
//! a call-cursor wrapper `AddEx(fn) ugo.CallableExFunc`. A signature named
//! `func` gets a name derived from its types, e.g. `funcPsROe`.
//!
//! ## Directives
//!
//! | Directive | Effect |
//! |-----------|--------|
//! | `//ugo:callable Name(p T, ...) (R, error)` | wrap a function signature |
//! | `//ugo:callable:import "path"` | add an import to the generated file |
//! | `//ugo:callable:import alias "path"` | add an aliased import |
//! | `//ugo:callable:convert T Conv` | extract parameters of type `T` with `Conv(arg) (T, bool)` |

mod error;
mod extractor;
mod format;
mod generator;
mod imports;
mod loader;
mod naming;
mod package;
mod parser;
mod registry;
mod template;
mod types;

pub use error::{Error, ParseError, Result};
pub use extractor::DIRECTIVE_PREFIX;
pub use format::{Gofmt, Passthrough, SourceFormatter};
pub use generator::CodeGenerator;
pub use imports::{Import, ImportSet};
pub use loader::{ModuleLoader, Preprocess, strip_shebang};
pub use naming::{PLACEHOLDER, allocate_names, avoid_package_names, synthesize_name};
pub use package::package_name;
pub use parser::parse_signature;
pub use registry::{ConvertRule, Converter, ConverterRegistry, Extraction, result_wrapper};
pub use template::ordinal;
pub use types::{
    FunctionDescriptor, InternalNames, Param, RUNTIME_IMPORT_PATH, RUNTIME_NAMESPACE, Returns,
};
