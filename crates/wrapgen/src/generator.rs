//! Go wrapper generator for `ugo` callables.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::format::{Passthrough, SourceFormatter};
use crate::imports::{Import, ImportSet};
use crate::naming::{allocate_names, avoid_package_names, synthesize_name};
use crate::parser::parse_signature;
use crate::registry::{Converter, ConverterRegistry, Extraction, result_wrapper};
use crate::template::{
    CURSOR_GUARD, CURSOR_HEADER, FOOTER, NAMED_EXTRACTION, POSITIONAL_GUARD, POSITIONAL_HEADER,
    ordinal, render,
};
use crate::types::{
    FunctionDescriptor, InternalNames, Param, RUNTIME_IMPORT_PATH, Returns, is_runtime_package,
    runtime_qualifier,
};

const DEFAULT_HEADER: &str = "Code generated by wrapgen. DO NOT EDIT.";

/// Suffix of the cursor-convention variant's name.
const CURSOR_SUFFIX: &str = "Ex";

/// Collects directive signatures, imports and converters for one run, and
/// renders the Go file wrapping them.
///
/// Every generator is an independent run: nothing is shared between
/// instances, so separate runs may proceed in parallel.
///
/// # Example
///
/// ```
/// use wrapgen::CodeGenerator;
///
/// let mut generator = CodeGenerator::new();
/// generator
///     .add_source_str("mathx.go", "package mathx\n\n//ugo:callable Add(a int, b int) (int)\n")
///     .unwrap();
/// let code = generator.generate().unwrap();
/// assert!(code.contains("func Add(fn func(int, int) int) ugo.CallableFunc {"));
/// assert!(code.contains("func AddEx(fn func(int, int) int) ugo.CallableExFunc {"));
/// ```
#[derive(Debug)]
pub struct CodeGenerator {
    /// Parsed signatures in scan order.
    pub(crate) functions: Vec<FunctionDescriptor>,

    /// Imports requested by directives.
    imports: ImportSet,

    /// Package of the generated file.
    package: Option<String>,

    /// Custom header comment
    header: Option<String>,

    /// Whether synthesized names are exported (`FuncP...`) or not (`funcP...`).
    export: bool,

    /// Emit only the cursor-convention variant.
    extended_only: bool,

    /// Applied to the rendered text before it is returned or written.
    formatter: Box<dyn SourceFormatter>,

    /// Converter registry for parameter types
    pub(crate) registry: ConverterRegistry,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            functions: Vec::new(),
            imports: ImportSet::new(),
            package: None,
            header: None,
            export: false,
            extended_only: false,
            formatter: Box::new(Passthrough),
            registry: ConverterRegistry::with_builtins(),
        }
    }
}

impl CodeGenerator {
    /// Create a new generator with the builtin converters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom header comment for the generated file.
    pub fn set_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.header = Some(header.into());
        self
    }

    /// Choose exported (`FuncP...`) or unexported (`funcP...`) synthesized names.
    pub fn export(&mut self, enabled: bool) -> &mut Self {
        self.export = enabled;
        self
    }

    /// Emit only the cursor-convention (`...Ex`) wrappers.
    pub fn extended_only(&mut self, enabled: bool) -> &mut Self {
        self.extended_only = enabled;
        self
    }

    /// Set the formatter run over the rendered text.
    pub fn set_formatter(&mut self, formatter: impl SourceFormatter + 'static) -> &mut Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Set the package of the generated file, overriding any package clause seen so far.
    pub fn set_package(&mut self, package: impl Into<String>) -> &mut Self {
        self.package = Some(package.into());
        self
    }

    /// Package of the generated file, once known.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Record the package clause of a scanned source. All sources must agree.
    pub(crate) fn declare_package(&mut self, origin: &str, found: String) -> Result<()> {
        match &self.package {
            Some(expected) if *expected != found => Err(Error::PackageMismatch {
                origin: origin.to_string(),
                expected: expected.clone(),
                found,
            }),
            _ => {
                self.package = Some(found);
                Ok(())
            }
        }
    }

    /// Register a converter for a parameter type, replacing any existing one.
    ///
    /// # Example
    ///
    /// ```
    /// use wrapgen::{CodeGenerator, Converter};
    ///
    /// let mut generator = CodeGenerator::new();
    /// generator.register_converter("*time.Location", Converter::named("ToLocation"));
    /// assert!(generator.registry().contains("*time.Location"));
    /// ```
    pub fn register_converter(
        &mut self,
        type_name: impl Into<String>,
        converter: Converter,
    ) -> &mut Self {
        self.registry.register(type_name, converter);
        self
    }

    /// Remove a converter from the registry.
    ///
    /// This can be used to disable a builtin mapping.
    pub fn unregister_converter(&mut self, type_name: &str) -> &mut Self {
        self.registry.unregister(type_name);
        self
    }

    /// Get a reference to the converter registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Add an import to the generated file.
    pub fn add_import(&mut self, import: Import) -> Result<&mut Self> {
        self.imports.add(import)?;
        Ok(self)
    }

    /// Add a signature such as `Add(a int, b int) (int)`.
    pub fn add_signature(&mut self, signature: &str) -> Result<&mut Self> {
        let function = parse_signature(signature).map_err(|kind| Error::Directive {
            origin: "<signature>".to_string(),
            line: 1,
            text: signature.trim().to_string(),
            kind,
        })?;
        self.functions.push(function);
        Ok(self)
    }

    /// Signatures collected so far, in scan order, with their declared names.
    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    /// Validate the whole batch, then settle names and drop duplicates.
    ///
    /// Functions come back sorted by final name.
    fn prepare(&self) -> Result<Vec<FunctionDescriptor>> {
        self.registry.validate(&self.functions)?;

        let mut by_name: BTreeMap<String, FunctionDescriptor> = BTreeMap::new();
        for function in &self.functions {
            let mut function = function.clone();
            synthesize_name(&mut function, self.export);
            match by_name.entry(function.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(function);
                }
                Entry::Occupied(slot) if slot.get().shape() == function.shape() => {
                    tracing::debug!(name = %function.name, "skipping duplicate signature");
                }
                Entry::Occupied(slot) => {
                    return Err(Error::DuplicateFunction {
                        name: function.name.clone(),
                        first: slot.get().source.clone(),
                        second: function.source,
                    });
                }
            }
        }

        // `Name` also emits `NameEx`, which must not be a function of its own.
        if !self.extended_only {
            for function in by_name.values() {
                let cursor_name = format!("{}{CURSOR_SUFFIX}", function.name);
                if let Some(other) = by_name.get(&cursor_name) {
                    return Err(Error::DuplicateFunction {
                        name: cursor_name,
                        first: function.source.clone(),
                        second: other.source.clone(),
                    });
                }
            }
        }

        Ok(by_name.into_values().collect())
    }

    /// Render the Go source without running the formatter.
    ///
    /// Fails before producing any text if a parameter type has no converter.
    pub fn generate_raw(&self) -> Result<String> {
        let package = self.package.as_deref().ok_or(Error::MissingPackage)?;
        let functions = self.prepare()?;
        let rt = runtime_qualifier(package);

        let mut imports = self.imports.clone();
        if !functions.is_empty() {
            if !self.extended_only {
                imports.add(Import::new("strconv"))?;
            }
            if !is_runtime_package(package) {
                imports.add(Import::new(RUNTIME_IMPORT_PATH))?;
            }
        }

        // Parameters must not shadow a package the wrapper body refers to.
        let packages = imports.identifiers();
        let functions: Vec<(FunctionDescriptor, InternalNames)> = functions
            .into_iter()
            .map(|mut function| {
                avoid_package_names(&mut function, &packages);
                let names = allocate_names(&function);
                (function, names)
            })
            .collect();

        let mut output = String::new();

        // Header
        let header = self.header.as_deref().unwrap_or(DEFAULT_HEADER);
        for line in header.lines() {
            output.push_str("// ");
            output.push_str(line);
            output.push('\n');
        }
        output.push('\n');

        output.push_str(&format!("package {package}\n\n"));

        let import_block = imports.to_go();
        if !import_block.is_empty() {
            output.push_str(&import_block);
            output.push_str("\n\n");
        }

        for (function, names) in &functions {
            if !self.extended_only {
                output.push_str(&self.generate_wrapper(function, names, &rt, false)?);
                output.push('\n');
            }
            output.push_str(&self.generate_wrapper(function, names, &rt, true)?);
            output.push('\n');
        }

        tracing::debug!(
            package,
            functions = functions.len(),
            extended_only = self.extended_only,
            "rendered wrappers"
        );
        Ok(output.trim_end().to_string() + "\n")
    }

    /// Render the Go source and run it through `formatter`.
    ///
    /// A formatter failure is reported together with the unformatted text.
    pub fn render(&self, formatter: &dyn SourceFormatter) -> Result<String> {
        let raw = self.generate_raw()?;
        formatter
            .format(&raw)
            .map_err(|message| Error::Format { message, raw })
    }

    /// Render the Go source with the configured formatter.
    pub fn generate(&self) -> Result<String> {
        self.render(self.formatter.as_ref())
    }

    /// Write the generated code to a file. Nothing is written on failure.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let code = self.generate()?;
        fs::write(path, code)?;
        Ok(())
    }

    /// Write the generated code to a writer.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let code = self.generate()?;
        writer.write_all(code.as_bytes())?;
        Ok(())
    }

    fn generate_wrapper(
        &self,
        function: &FunctionDescriptor,
        names: &InternalNames,
        rt: &str,
        cursor: bool,
    ) -> Result<String> {
        let (name, header, guard) = if cursor {
            (
                format!("{}{CURSOR_SUFFIX}", function.name),
                CURSOR_HEADER,
                CURSOR_GUARD,
            )
        } else {
            (function.name.clone(), POSITIONAL_HEADER, POSITIONAL_GUARD)
        };
        let func_type = function.go_func_type();
        let count = function.params.len().to_string();
        let vars = [
            ("name", name.as_str()),
            ("rt", rt),
            ("source", function.source.as_str()),
            ("callee", names.callee.as_str()),
            ("func_type", func_type.as_str()),
            ("args", names.args.as_str()),
            ("result", names.result.as_str()),
            ("error", names.error.as_str()),
            ("count", count.as_str()),
        ];

        let mut output = render(header, &vars);
        output.push_str(&render(guard, &vars));
        for param in &function.params {
            output.push_str(&self.generate_extraction(function, param, names, rt, cursor)?);
        }
        output.push_str(&generate_call(function, names, rt));
        output.push_str(FOOTER);
        Ok(output)
    }

    fn generate_extraction(
        &self,
        function: &FunctionDescriptor,
        param: &Param,
        names: &InternalNames,
        rt: &str,
        cursor: bool,
    ) -> Result<String> {
        let converter =
            self.registry
                .lookup(&param.type_name)
                .ok_or_else(|| Error::UnknownConverter {
                    function: function.source.clone(),
                    param: param.name.clone(),
                    type_name: param.type_name.clone(),
                })?;
        let extraction = Extraction {
            position: param.position,
            args: &names.args,
            param,
            cursor,
        };

        Ok(match converter {
            Converter::Named { .. } => {
                let convert = converter.func_name(rt).unwrap_or_default();
                let arg = extraction.arg_expr();
                let ordinal = ordinal(param.position + 1);
                render(
                    NAMED_EXTRACTION,
                    &[
                        ("param", param.name.as_str()),
                        ("ok", names.ok.as_str()),
                        ("convert", convert.as_str()),
                        ("arg", arg.as_str()),
                        ("rt", rt),
                        ("ordinal", ordinal.as_str()),
                        ("type", param.type_name.as_str()),
                    ],
                )
            }
            Converter::Rule(rule) => format!("\t\t{}\n", rule(&extraction)),
        })
    }
}

/// The call of the wrapped function and the binding of its results.
fn generate_call(function: &FunctionDescriptor, names: &InternalNames, rt: &str) -> String {
    let call_args: Vec<&str> = function.params.iter().map(|p| p.name.as_str()).collect();
    let call = format!("{}({})", names.callee, call_args.join(", "));
    let InternalNames {
        result,
        error,
        value,
        ..
    } = names;

    let lines = match &function.returns {
        Returns::None => vec![call, format!("{result} = {rt}Undefined")],
        Returns::Error(_) => vec![
            format!("{error} = {call}"),
            format!("{result} = {rt}Undefined"),
        ],
        Returns::Value(v) => match result_wrapper(&v.type_name) {
            Some(ctor) => vec![format!("{result} = {rt}{ctor}({call})")],
            None => vec![format!("{result} = {call}")],
        },
        Returns::ValueError(v, _) => match result_wrapper(&v.type_name) {
            Some(ctor) => vec![
                format!("var {value} {}", v.type_name),
                format!("{value}, {error} = {call}"),
                format!("{result} = {rt}{ctor}({value})"),
            ],
            None => vec![format!("{result}, {error} = {call}")],
        },
    };

    lines.iter().map(|line| format!("\t\t{line}\n")).collect()
}
