//! Converter registry mapping Go parameter types to extraction strategies.
//!
//! The registry tells the emitter how to turn one incoming runtime argument
//! into a value of the wrapped function's parameter type. Builtin mappings for
//! Go scalars and the runtime's own value types are registered automatically;
//! `//ugo:callable:convert` directives add or replace entries for the rest of
//! the run.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::{FunctionDescriptor, Param, RUNTIME_NAMESPACE};

/// Everything a [`ConvertRule`] needs to emit one extraction statement.
#[derive(Debug, Clone, Copy)]
pub struct Extraction<'a> {
    /// Zero-based argument position.
    pub position: usize,
    /// Name of the arguments container in the wrapper body.
    pub args: &'a str,
    /// The parameter being extracted.
    pub param: &'a Param,
    /// Whether the container is a call cursor (`args.Get(i)`) rather than a slice.
    pub cursor: bool,
}

impl Extraction<'_> {
    /// Expression reading the argument at this position.
    pub fn arg_expr(&self) -> String {
        if self.cursor {
            format!("{}.Get({})", self.args, self.position)
        } else {
            format!("{}[{}]", self.args, self.position)
        }
    }
}

/// Custom emission logic for a parameter type.
pub type ConvertRule = fn(&Extraction<'_>) -> String;

/// How a parameter type is extracted from a runtime argument.
#[derive(Debug, Clone)]
pub enum Converter {
    /// Call a conversion routine returning `(value, ok)`.
    Named {
        func: String,
        /// The routine lives in the runtime package and is qualified on emission.
        runtime: bool,
    },
    /// Emit the statement text produced by a rule.
    Rule(ConvertRule),
}

impl PartialEq for Converter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Converter::Named { func, runtime },
                Converter::Named {
                    func: other_func,
                    runtime: other_runtime,
                },
            ) => func == other_func && runtime == other_runtime,
            (Converter::Rule(rule), Converter::Rule(other_rule)) => {
                std::ptr::fn_addr_eq(*rule, *other_rule)
            }
            _ => false,
        }
    }
}

impl Eq for Converter {}

impl Converter {
    /// A user-supplied routine, emitted verbatim.
    pub fn named(func: impl Into<String>) -> Self {
        Converter::Named {
            func: func.into(),
            runtime: false,
        }
    }

    /// A routine exported by the runtime package.
    pub fn runtime(func: impl Into<String>) -> Self {
        Converter::Named {
            func: func.into(),
            runtime: true,
        }
    }

    /// The routine name as it appears in generated code.
    pub fn func_name(&self, qualifier: &str) -> Option<String> {
        match self {
            Converter::Named { func, runtime: true } => Some(format!("{qualifier}{func}")),
            Converter::Named {
                func,
                runtime: false,
            } => Some(func.clone()),
            Converter::Rule(_) => None,
        }
    }
}

/// Passes the runtime value through untouched.
fn passthrough(x: &Extraction<'_>) -> String {
    format!("{} := {}", x.param.name, x.arg_expr())
}

/// Go scalar types whose results are wrapped into runtime values, and the
/// runtime constructor doing it.
const RESULT_WRAPPERS: &[(&str, &str)] = &[
    ("int", "Int"),
    ("int8", "Int"),
    ("int16", "Int"),
    ("int32", "Int"),
    ("int64", "Int"),
    ("uint", "Uint"),
    ("uint8", "Uint"),
    ("uint16", "Uint"),
    ("uint32", "Uint"),
    ("uint64", "Uint"),
    ("uintptr", "Uint"),
    ("float32", "Float"),
    ("float64", "Float"),
    ("bool", "Bool"),
    ("rune", "Char"),
    ("string", "String"),
    ("[]byte", "Bytes"),
];

/// Runtime constructor wrapping a returned value of `type_name`, if any.
///
/// Types without a wrapper are assigned to the result as-is.
pub fn result_wrapper(type_name: &str) -> Option<&'static str> {
    RESULT_WRAPPERS
        .iter()
        .find(|(ty, _)| *ty == type_name)
        .map(|(_, ctor)| *ctor)
}

/// A registry of Go type token -> [`Converter`] associations.
///
/// # Built-in mappings
///
/// | Go type | Converter |
/// |---------|-----------|
/// | `int` | `ugo.ToGoInt` |
/// | `int64` | `ugo.ToGoInt64` |
/// | `uint64` | `ugo.ToGoUint64` |
/// | `float64` | `ugo.ToGoFloat64` |
/// | `rune` | `ugo.ToGoRune` |
/// | `bool` | `ugo.ToGoBool` |
/// | `string` | `ugo.ToGoString` |
/// | `[]byte` | `ugo.ToGoByteSlice` |
/// | `ugo.Int`, `ugo.Uint`, `ugo.Float`, `ugo.Char`, `ugo.Bool` | `ugo.ToInt`, ... |
/// | `ugo.String`, `ugo.Bytes`, `ugo.Array`, `ugo.Map` | `ugo.ToString`, ... |
/// | `ugo.Object` | positional extraction, no conversion |
#[derive(Debug, Clone)]
pub struct ConverterRegistry {
    mappings: HashMap<String, Converter>,
}

impl ConverterRegistry {
    /// Create an empty registry with no mappings.
    pub fn new() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with the builtin mappings.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    pub fn register_builtins(&mut self) {
        // Go scalars
        self.register("int", Converter::runtime("ToGoInt"));
        self.register("int64", Converter::runtime("ToGoInt64"));
        self.register("uint64", Converter::runtime("ToGoUint64"));
        self.register("float64", Converter::runtime("ToGoFloat64"));
        self.register("rune", Converter::runtime("ToGoRune"));
        self.register("bool", Converter::runtime("ToGoBool"));
        self.register("string", Converter::runtime("ToGoString"));
        self.register("[]byte", Converter::runtime("ToGoByteSlice"));

        // Runtime value types
        for ty in ["Int", "Uint", "Float", "Char", "Bool", "String", "Bytes", "Array", "Map"] {
            self.register(
                format!("{RUNTIME_NAMESPACE}.{ty}"),
                Converter::runtime(format!("To{ty}")),
            );
        }

        // The dynamic value itself needs no conversion.
        self.register(
            format!("{RUNTIME_NAMESPACE}.Object"),
            Converter::Rule(passthrough),
        );
    }

    /// Register a converter for a type token, replacing any existing entry.
    pub fn register(&mut self, type_name: impl Into<String>, converter: Converter) {
        self.mappings.insert(type_name.into(), converter);
    }

    /// Exact lookup, without namespace fallback.
    pub fn get(&self, type_name: &str) -> Option<&Converter> {
        self.mappings.get(type_name)
    }

    /// Look up a converter, retrying with the runtime namespace prefix so bare
    /// names like `Object` resolve to `ugo.Object`.
    pub fn lookup(&self, type_name: &str) -> Option<&Converter> {
        self.mappings.get(type_name).or_else(|| {
            self.mappings
                .get(&format!("{RUNTIME_NAMESPACE}.{type_name}"))
        })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    /// Remove a type mapping.
    pub fn unregister(&mut self, type_name: &str) -> Option<Converter> {
        self.mappings.remove(type_name)
    }

    /// Check that every parameter of every function has a converter.
    ///
    /// Fails on the first unresolved parameter, in function then parameter order.
    pub fn validate<'a>(
        &self,
        functions: impl IntoIterator<Item = &'a FunctionDescriptor>,
    ) -> Result<()> {
        for function in functions {
            if let Some(param) = function.params.iter().find(|p| !self.contains(&p.type_name)) {
                return Err(Error::UnknownConverter {
                    function: function.source.clone(),
                    param: param.name.clone(),
                    type_name: param.type_name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
