//! Signature descriptors shared by the parser, the naming passes and the emitter.

use std::fmt;

/// Namespace of the scripting runtime's Go package.
pub const RUNTIME_NAMESPACE: &str = "ugo";

/// Import path of the scripting runtime's Go package.
pub const RUNTIME_IMPORT_PATH: &str = "github.com/ozanh/ugo";

/// The return type that marks a slot as carrying failure information.
pub const ERROR_TYPE: &str = "error";

/// Whether generated code lives inside the runtime package itself, in which
/// case runtime names must not be qualified.
pub fn is_runtime_package(package: &str) -> bool {
    package == RUNTIME_NAMESPACE
}

/// Prefix to put in front of runtime names when emitting into `package`.
pub fn runtime_qualifier(package: &str) -> String {
    if is_runtime_package(package) {
        String::new()
    } else {
        format!("{RUNTIME_NAMESPACE}.")
    }
}

/// A single parameter or return entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared name. Empty for unnamed return entries such as `(int)`.
    pub name: String,
    /// The Go type token, e.g. `int`, `*time.Location`, `ugo.Object`.
    pub type_name: String,
    /// Zero-based index among its siblings.
    pub position: usize,
}

impl Param {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            position,
        }
    }

    /// Whether the type token is a pointer.
    pub fn is_pointer(&self) -> bool {
        self.type_name.starts_with('*')
    }
}

/// The shape of a function's return list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returns {
    /// No return value; the wrapper yields the runtime's undefined value.
    None,
    /// A lone `error` return.
    Error(Param),
    /// A single value.
    Value(Param),
    /// A value followed by an `error`.
    ValueError(Param, Param),
}

impl Returns {
    /// The value entry, if any.
    pub fn value(&self) -> Option<&Param> {
        match self {
            Returns::Value(v) | Returns::ValueError(v, _) => Some(v),
            Returns::None | Returns::Error(_) => None,
        }
    }

    /// The error entry, if any.
    pub fn error(&self) -> Option<&Param> {
        match self {
            Returns::Error(e) | Returns::ValueError(_, e) => Some(e),
            Returns::None | Returns::Value(_) => None,
        }
    }

    /// Return entries in declaration order.
    pub fn entries(&self) -> Vec<&Param> {
        self.value().into_iter().chain(self.error()).collect()
    }
}

/// Identifiers used inside one generated wrapper body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNames {
    /// The wrapped function value.
    pub callee: String,
    /// The incoming arguments (slice or call cursor).
    pub args: String,
    /// The named result.
    pub result: String,
    /// The named error result.
    pub error: String,
    /// The conversion success flag.
    pub ok: String,
    /// Temporary holding a value that must be wrapped before it is returned.
    pub value: String,
}

/// A parsed directive signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    /// Public wrapper name; rewritten once when it is the synthesis placeholder.
    pub name: String,
    pub params: Vec<Param>,
    pub returns: Returns,
    /// The trimmed directive payload, echoed into the generated comment.
    pub source: String,
}

impl FunctionDescriptor {
    /// Type tokens of parameters and returns; equal shapes produce identical wrappers.
    pub fn shape(&self) -> (Vec<&str>, Vec<&str>) {
        (
            self.params.iter().map(|p| p.type_name.as_str()).collect(),
            self.returns
                .entries()
                .into_iter()
                .map(|p| p.type_name.as_str())
                .collect(),
        )
    }

    /// Go type of the wrapped function, e.g. `func(int, string) (ugo.Object, error)`.
    pub fn go_func_type(&self) -> String {
        let params: Vec<_> = self.params.iter().map(|p| p.type_name.as_str()).collect();
        let results = match &self.returns {
            Returns::None => String::new(),
            Returns::Error(e) => format!(" {}", e.type_name),
            Returns::Value(v) => format!(" {}", v.type_name),
            Returns::ValueError(v, e) => format!(" ({}, {})", v.type_name, e.type_name),
        };
        format!("func({}){}", params.join(", "), results)
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(params: &[(&str, &str)], returns: Returns) -> FunctionDescriptor {
        FunctionDescriptor {
            name: "F".to_string(),
            params: params
                .iter()
                .enumerate()
                .map(|(i, (n, t))| Param::new(*n, *t, i))
                .collect(),
            returns,
            source: String::new(),
        }
    }

    #[test]
    fn test_go_func_type() {
        let d = descriptor(&[("a", "int"), ("b", "string")], Returns::None);
        assert_eq!(d.go_func_type(), "func(int, string)");

        let d = descriptor(&[], Returns::Value(Param::new("", "ugo.Object", 0)));
        assert_eq!(d.go_func_type(), "func() ugo.Object");

        let d = descriptor(
            &[("p", "*time.Location")],
            Returns::ValueError(Param::new("v", "int", 0), Param::new("err", "error", 1)),
        );
        assert_eq!(d.go_func_type(), "func(*time.Location) (int, error)");
    }

    #[test]
    fn test_returns_entries() {
        let r = Returns::ValueError(Param::new("v", "int", 0), Param::new("e", "error", 1));
        let types: Vec<_> = r.entries().iter().map(|p| p.type_name.as_str()).collect();
        assert_eq!(types, ["int", "error"]);
        assert!(Returns::None.entries().is_empty());
    }

    #[test]
    fn test_runtime_qualifier() {
        assert_eq!(runtime_qualifier("mypkg"), "ugo.");
        assert_eq!(runtime_qualifier("ugo"), "");
    }

    #[test]
    fn test_display_is_source() {
        let mut d = descriptor(&[("a", "int")], Returns::None);
        d.source = "F(a int)".to_string();
        assert_eq!(d.to_string(), "F(a int)");
    }
}
