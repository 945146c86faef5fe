//! wrapgen CLI: generates `ugo` callable wrappers from `//ugo:callable` directives.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use wrapgen::{CodeGenerator, Gofmt};

#[derive(Parser, Debug)]
#[command(name = "wrapgen", version, about = "Generate ugo callable wrappers for Go functions")]
struct Cli {
    /// Go files or directories to scan for directives
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export synthesized names (FuncP... instead of funcP...)
    #[arg(long)]
    export: bool,

    /// Only generate the call-cursor (...Ex) wrappers
    #[arg(long)]
    extended_only: bool,

    /// Formatter program the generated source is piped through
    #[arg(long, default_value = "gofmt")]
    gofmt: PathBuf,

    /// Write the generated source unformatted
    #[arg(long, conflicts_with = "gofmt")]
    no_format: bool,
}

fn main() {
    let cli = Cli::parse();

    // WRAPGEN_LOG, then RUST_LOG, then warn
    let filter = EnvFilter::try_from_env("WRAPGEN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let code = generate(cli)?;

    match &cli.output {
        Some(path) => fs::write(path, &code)
            .with_context(|| format!("writing {}", path.display()))?,
        None => io::stdout().lock().write_all(code.as_bytes())?,
    }
    Ok(())
}

fn generate(cli: &Cli) -> anyhow::Result<String> {
    let mut generator = CodeGenerator::new();
    generator.export(cli.export).extended_only(cli.extended_only);
    if !cli.no_format {
        generator.set_formatter(Gofmt::new(&cli.gofmt));
    }

    for input in &cli.inputs {
        let scanned = if input.is_dir() {
            generator.add_source_dir(input)
        } else {
            generator.add_source_file(input)
        };
        scanned.with_context(|| format!("scanning {}", input.display()))?;
    }

    tracing::info!(functions = generator.functions().len(), "scanned inputs");
    Ok(generator.generate()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("wrapgen").chain(args.iter().copied()))
    }

    #[test]
    fn test_generate_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("mathx.go");
        let output = dir.path().join("zcallables.go");
        fs::write(
            &input,
            "package mathx\n\n//ugo:callable Add(a int, b int) (int)\n",
        )
        .unwrap();

        let cli = cli(&[
            input.to_str().unwrap(),
            "--no-format",
            "--extended-only",
            "-o",
            output.to_str().unwrap(),
        ]);
        run(&cli).unwrap();

        let code = fs::read_to_string(&output).unwrap();
        assert!(code.contains("package mathx"));
        assert!(code.contains("func AddEx("));
        assert!(!code.contains("func Add("));
    }

    #[test]
    fn test_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("x.go");
        let output = dir.path().join("out.go");
        fs::write(&input, "package x\n//ugo:callable F(t *CustomThing)\n").unwrap();

        let cli = cli(&[
            input.to_str().unwrap(),
            "--no-format",
            "-o",
            output.to_str().unwrap(),
        ]);
        let err = run(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("*CustomThing"));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_formatter_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("x.go");
        fs::write(&input, "package x\n//ugo:callable F()\n").unwrap();

        let cli = cli(&[input.to_str().unwrap(), "--gofmt", "/nonexistent/gofmt"]);
        let err = generate(&cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<wrapgen::Error>(),
            Some(wrapgen::Error::Format { .. })
        ));
    }

    #[test]
    fn test_requires_inputs() {
        assert!(Cli::try_parse_from(["wrapgen"]).is_err());
    }
}
