//! Source scanner that extracts `//ugo:callable` directives from Go files.
//!
//! Each source is scanned line by line. Recognized directives are:
//!
//! - `//ugo:callable Name(a int, b string) (ret ugo.Object, err error)`
//! - `//ugo:callable:import "path"` or `//ugo:callable:import alias "path"`
//! - `//ugo:callable:convert typeName converterName`
//!
//! Directives take effect in scan order, so a `:convert` only needs to precede
//! generation, not the signatures using it.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::CodeGenerator;
use crate::error::{Error, ParseError, Result};
use crate::imports::Import;
use crate::package::package_name;
use crate::parser::parse_signature;
use crate::registry::Converter;
use crate::types::FunctionDescriptor;

/// Marker starting every directive line.
pub const DIRECTIVE_PREFIX: &str = "//ugo:callable";

/// A single recognized directive.
#[derive(Debug, Clone, PartialEq)]
enum Directive {
    Signature(FunctionDescriptor),
    Import(Import),
    Convert {
        type_name: String,
        converter: String,
    },
    /// A sub-directive with a blank payload.
    Blank,
}

/// Classify the text following [`DIRECTIVE_PREFIX`].
fn parse_directive(rest: &str) -> std::result::Result<Directive, ParseError> {
    if rest.starts_with([' ', '\t']) {
        return parse_signature(rest).map(Directive::Signature);
    }

    let body = rest
        .strip_prefix(':')
        .ok_or_else(|| ParseError::UnknownDirective(rest.to_string()))?;
    let (keyword, payload) = body
        .split_once([' ', '\t'])
        .unwrap_or((body, ""));

    match keyword {
        "import" => parse_import(payload.trim()),
        "convert" => parse_convert(payload.trim()),
        _ => Err(ParseError::UnknownDirective(rest.to_string())),
    }
}

/// Strip one pair of Go string quotes. The quote must not appear inside.
fn unquote(token: &str) -> Option<&str> {
    ['"', '`'].into_iter().find_map(|quote| {
        token
            .strip_prefix(quote)
            .and_then(|t| t.strip_suffix(quote))
            .filter(|inner| !inner.contains(quote))
    })
}

/// A Go identifier, or the blank and dot import names.
fn is_import_alias(alias: &str) -> bool {
    if matches!(alias, "_" | ".") {
        return true;
    }
    let mut chars = alias.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

fn parse_import(payload: &str) -> std::result::Result<Directive, ParseError> {
    if payload.is_empty() {
        return Ok(Directive::Blank);
    }
    if let Some(path) = unquote(payload) {
        return Ok(Directive::Import(Import::new(path)));
    }

    let tokens: Vec<&str> = payload.split_whitespace().collect();
    match tokens.as_slice() {
        [alias, quoted] if is_import_alias(alias) => unquote(quoted)
            .map(|path| Directive::Import(Import::aliased(*alias, path)))
            .ok_or_else(|| ParseError::ImportFormat(payload.to_string())),
        _ => Err(ParseError::ImportFormat(payload.to_string())),
    }
}

fn parse_convert(payload: &str) -> std::result::Result<Directive, ParseError> {
    let tokens: Vec<&str> = payload.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Ok(Directive::Blank),
        [type_name, converter] => Ok(Directive::Convert {
            type_name: type_name.to_string(),
            converter: converter.to_string(),
        }),
        _ => Err(ParseError::ConvertFormat(payload.to_string())),
    }
}

/// Scan one source, feeding its directives into the generator.
fn scan_source(codegen: &mut CodeGenerator, origin: &str, source: &str) -> Result<()> {
    let mut found = 0usize;

    for (index, line) in source.lines().enumerate() {
        let text = line.trim();
        let Some(rest) = text.strip_prefix(DIRECTIVE_PREFIX) else {
            continue;
        };
        tracing::trace!(origin, line = index + 1, text, "directive line");

        let directive = parse_directive(rest).map_err(|kind| Error::Directive {
            origin: origin.to_string(),
            line: index + 1,
            text: text.to_string(),
            kind,
        })?;
        found += 1;

        match directive {
            Directive::Signature(function) => {
                tracing::debug!(origin, name = %function.name, signature = %function, "signature");
                codegen.functions.push(function);
            }
            Directive::Import(import) => {
                tracing::debug!(origin, path = %import.path, alias = ?import.alias, "import");
                codegen.add_import(import)?;
            }
            Directive::Convert {
                type_name,
                converter,
            } => {
                tracing::debug!(origin, %type_name, %converter, "converter");
                codegen.register_converter(type_name, Converter::named(converter));
            }
            Directive::Blank => {}
        }
    }

    let package = package_name(source).map_err(|detail| Error::PackageClause {
        origin: origin.to_string(),
        detail,
    })?;
    tracing::debug!(origin, %package, directives = found, "scanned source");
    codegen.declare_package(origin, package)
}

impl CodeGenerator {
    /// Scan a single Go source file for directives.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut generator = CodeGenerator::new();
    /// generator.add_source_file("time.go")?;
    /// generator.write_to_file("time_callables.go")?;
    /// ```
    pub fn add_source_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        scan_source(self, &path.display().to_string(), &source)?;
        Ok(self)
    }

    /// Scan Go source from a string. `origin` labels its diagnostics.
    pub fn add_source_str(&mut self, origin: &str, source: &str) -> Result<&mut Self> {
        scan_source(self, origin, source)?;
        Ok(self)
    }

    /// Recursively scan a directory for `.go` files, in sorted path order.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut generator = CodeGenerator::new();
    /// generator.add_source_dir("stdlib/time/")?;
    /// generator.write_to_file("stdlib/time/zfuncs.go")?;
    /// ```
    pub fn add_source_dir(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "go") {
                self.add_source_file(path)?;
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Result<CodeGenerator> {
        let mut codegen = CodeGenerator::new();
        codegen.add_source_str("test.go", source)?;
        Ok(codegen)
    }

    #[test]
    fn test_extract_signatures() {
        let codegen = scan(
            "package mathx\n\
             \n\
             //ugo:callable Add(a int, b int) (int)\n\
             \t//ugo:callable\tNeg(a int) (int)\n\
             // ugo:callable Ignored(a int)\n\
             func Add(a, b int) int { return a + b }\n",
        )
        .unwrap();
        let names: Vec<_> = codegen.functions().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Add", "Neg"]);
        assert_eq!(codegen.package(), Some("mathx"));
    }

    #[test]
    fn test_import_directives() {
        let codegen = scan(
            "package x\n\
             //ugo:callable:import \"time\"\n\
             //ugo:callable:import ugotime \"github.com/ozanh/ugo/stdlib/time\"\n\
             //ugo:callable:import\n\
             //ugo:callable:import   \n\
             //ugo:callable F(d time.Duration)\n\
             //ugo:callable:convert time.Duration ugotime.ToGoDuration\n",
        )
        .unwrap();
        let code = codegen.generate().unwrap();
        assert!(code.contains("\t\"time\"\n"));
        assert!(code.contains("\tugotime \"github.com/ozanh/ugo/stdlib/time\"\n"));
        assert!(code.contains("d, ok := ugotime.ToGoDuration(args[0])"));
    }

    #[test]
    fn test_import_format_error() {
        for bad in [
            "time",
            "a b c",
            "alias time",
            "\"a\" \"b\" \"c\"",
            "\"x\" \"y\"",
            "1t \"time\"",
            "t-x \"time\"",
        ] {
            let source = format!("package x\n//ugo:callable:import {bad}\n");
            match scan(&source) {
                Err(Error::Directive { line, kind, .. }) => {
                    assert_eq!(line, 2);
                    assert!(matches!(kind, ParseError::ImportFormat(_)), "{bad}: {kind:?}");
                }
                other => panic!("{bad}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_convert_format_error() {
        let err = scan("package x\n//ugo:callable:convert onlyone\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Directive {
                kind: ParseError::ConvertFormat(_),
                ..
            }
        ));
        assert!(scan("package x\n//ugo:callable:convert\n").is_ok());
    }

    #[test]
    fn test_unknown_directive() {
        for bad in ["//ugo:callable:export x", "//ugo:callableFoo()", "//ugo:callable"] {
            let source = format!("package x\n\n{bad}\n");
            match scan(&source) {
                Err(Error::Directive {
                    origin,
                    line,
                    text,
                    kind: ParseError::UnknownDirective(_),
                }) => {
                    assert_eq!(origin, "test.go");
                    assert_eq!(line, 3);
                    assert_eq!(text, bad);
                }
                other => panic!("{bad}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_signature_error_location() {
        let err = scan("package x\n//ugo:callable F(a int, b ...int)\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "test.go:2: variadic parameter \"b ...int\" is not supported: //ugo:callable F(a int, b ...int)"
        );
    }

    #[test]
    fn test_missing_package_clause() {
        let err = scan("//ugo:callable F()\n").unwrap_err();
        assert!(matches!(err, Error::PackageClause { .. }));
    }

    #[test]
    fn test_package_mismatch() {
        let mut codegen = CodeGenerator::new();
        codegen.add_source_str("a.go", "package a\n").unwrap();
        match codegen.add_source_str("b.go", "package b\n") {
            Err(Error::PackageMismatch {
                origin,
                expected,
                found,
            }) => {
                assert_eq!(origin, "b.go");
                assert_eq!(expected, "a");
                assert_eq!(found, "b");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_convert_overrides_builtin() {
        let codegen = scan(
            "package x\n\
             //ugo:callable:convert int myconv.ToInt\n\
             //ugo:callable F(a int)\n",
        )
        .unwrap();
        let code = codegen.generate().unwrap();
        assert!(code.contains("a, ok := myconv.ToInt(args[0])"));
        assert!(!code.contains("ToGoInt"));
    }

    #[test]
    fn test_blank_and_dot_import_aliases() {
        let codegen = scan(
            "package x\n\
             //ugo:callable:import _ \"embed\"\n\
             //ugo:callable:import . \"math\"\n\
             //ugo:callable F()\n",
        )
        .unwrap();
        let code = codegen.generate().unwrap();
        assert!(code.contains("\t_ \"embed\"\n"));
        assert!(code.contains("\t. \"math\"\n"));
    }
}
