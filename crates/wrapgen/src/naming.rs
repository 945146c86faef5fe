//! Internal identifier allocation and wrapper name synthesis.

use std::collections::BTreeSet;

use crate::types::{FunctionDescriptor, InternalNames, Param, RUNTIME_NAMESPACE};

/// Declared name asking for a synthesized wrapper name.
pub const PLACEHOLDER: &str = "func";

const EXPORTED_PREFIX: &str = "FuncP";
const UNEXPORTED_PREFIX: &str = "funcP";
const POINTER_MARKER: char = 'p';
const RETURNS_SEPARATOR: char = 'R';
const UNKNOWN_MARKER: char = '_';

/// Short codes for well-known type tokens.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("int", "i"),
    ("int64", "i64"),
    ("uint", "u"),
    ("uint64", "u64"),
    ("float32", "f32"),
    ("float64", "f64"),
    ("bool", "b"),
    ("rune", "r"),
    ("string", "s"),
    ("[]byte", "y"),
    ("[]string", "ss"),
    ("error", "e"),
    ("time.Duration", "d"),
    ("ugo.Object", "O"),
    ("ugo.Int", "I"),
    ("ugo.Uint", "U"),
    ("ugo.Float", "F"),
    ("ugo.Bool", "B"),
    ("ugo.Char", "C"),
    ("ugo.String", "S"),
    ("ugo.Bytes", "Y"),
    ("ugo.Array", "A"),
    ("ugo.Map", "M"),
];

/// Pick a name for each internal identifier that no parameter already uses.
///
/// A taken base name is replaced by the first free `base0`, `base1`, ...
pub fn allocate_names(function: &FunctionDescriptor) -> InternalNames {
    let taken = |candidate: &str| function.params.iter().any(|p| p.name == candidate);
    let pick = |base: &str| {
        if !taken(base) {
            return base.to_string();
        }
        (0..)
            .map(|i| format!("{base}{i}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    };

    InternalNames {
        callee: pick("fn"),
        args: pick("args"),
        result: pick("ret"),
        error: pick("err"),
        ok: pick("ok"),
        value: pick("val"),
    }
}

/// Rename parameters that would shadow one of `packages` inside the wrapper.
///
/// A clashing name is replaced by the first free `name0`, `name1`, ...
pub fn avoid_package_names(function: &mut FunctionDescriptor, packages: &BTreeSet<String>) {
    for index in 0..function.params.len() {
        let base = function.params[index].name.clone();
        if !packages.contains(&base) {
            continue;
        }
        let params = &function.params;
        let renamed = (0..)
            .map(|i| format!("{base}{i}"))
            .find(|candidate| {
                !packages.contains(candidate) && !params.iter().any(|p| p.name == *candidate)
            })
            .unwrap_or_else(|| base.clone());
        tracing::debug!(source = %function.source, from = %base, to = %renamed, "renamed parameter");
        function.params[index].name = renamed;
    }
}

/// Replace the placeholder name with one derived from the signature shape.
///
/// Names other than [`PLACEHOLDER`] are left untouched.
pub fn synthesize_name(function: &mut FunctionDescriptor, exported: bool) {
    if function.name != PLACEHOLDER {
        return;
    }

    let mut name = String::from(if exported {
        EXPORTED_PREFIX
    } else {
        UNEXPORTED_PREFIX
    });
    for param in &function.params {
        name.push_str(&type_code(param));
    }
    name.push(RETURNS_SEPARATOR);
    for entry in function.returns.entries() {
        name.push_str(&type_code(entry));
    }

    tracing::debug!(source = %function.source, %name, "synthesized wrapper name");
    function.name = name;
}

fn alias(token: &str) -> Option<&'static str> {
    let find = |key: &str| {
        TYPE_ALIASES
            .iter()
            .find(|(ty, _)| *ty == key)
            .map(|(_, code)| *code)
    };
    find(token).or_else(|| find(&format!("{RUNTIME_NAMESPACE}.{token}")))
}

/// Short code of a single type token.
fn type_code(param: &Param) -> String {
    let type_name = param.type_name.as_str();
    let mut code = String::new();
    if param.is_pointer() {
        code.push(POINTER_MARKER);
    }
    if let Some(short) = alias(type_name) {
        code.push_str(short);
        return code;
    }

    let bare = type_name.trim_start_matches('*');
    let tail = bare.rsplit('.').next().unwrap_or(bare);
    match alias(tail) {
        Some(short) => code.push_str(short),
        None => {
            code.push_str(tail);
            code.push(UNKNOWN_MARKER);
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_signature;

    #[test]
    fn test_allocate_default_names() {
        let f = parse_signature("F(a int, b string)").unwrap();
        let names = allocate_names(&f);
        assert_eq!(names.callee, "fn");
        assert_eq!(names.args, "args");
        assert_eq!(names.result, "ret");
        assert_eq!(names.error, "err");
    }

    #[test]
    fn test_allocate_avoids_args_param() {
        let f = parse_signature("F(args ugo.Object)").unwrap();
        assert_eq!(allocate_names(&f).args, "args0");
    }

    #[test]
    fn test_allocate_all_colliding() {
        let f = parse_signature("F(fn int, args int, ret int, err int, args0 int)").unwrap();
        let names = allocate_names(&f);
        assert_eq!(names.callee, "fn0");
        assert_eq!(names.args, "args1");
        assert_eq!(names.result, "ret0");
        assert_eq!(names.error, "err0");
        for p in &f.params {
            assert_ne!(p.name, names.callee);
            assert_ne!(p.name, names.args);
            assert_ne!(p.name, names.result);
            assert_ne!(p.name, names.error);
        }
    }

    #[test]
    fn test_synthesize_exported() {
        let mut f = parse_signature("func(a int, b string) (error)").unwrap();
        synthesize_name(&mut f, true);
        assert_eq!(f.name, "FuncPisRe");
    }

    #[test]
    fn test_synthesize_unexported_with_value_and_error() {
        let mut f = parse_signature("func(o ugo.Object) (ret ugo.Object, err error)").unwrap();
        synthesize_name(&mut f, false);
        assert_eq!(f.name, "funcPOROe");
    }

    #[test]
    fn test_synthesize_pointer_and_unknown() {
        let mut f = parse_signature("func(loc *time.Location, m *ugo.Map, s String)").unwrap();
        synthesize_name(&mut f, true);
        assert_eq!(f.name, "FuncPpLocation_pMSR");
    }

    #[test]
    fn test_synthesize_skips_named() {
        let mut f = parse_signature("Add(a int, b int) (int)").unwrap();
        synthesize_name(&mut f, true);
        assert_eq!(f.name, "Add");
    }

    #[test]
    fn test_synthesize_distinguishes_shapes() {
        let mut a = parse_signature("func(a int) (string)").unwrap();
        let mut b = parse_signature("func(a string) (int)").unwrap();
        synthesize_name(&mut a, false);
        synthesize_name(&mut b, false);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn test_avoid_package_names() {
        let mut f = parse_signature("F(ugo int, ugo0 int, time string, a int)").unwrap();
        let packages: BTreeSet<String> = ["ugo", "time"].map(String::from).into();
        avoid_package_names(&mut f, &packages);
        let names: Vec<_> = f.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["ugo1", "ugo0", "time0", "a"]);
    }
}
