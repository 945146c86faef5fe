//! Source formatters applied to the rendered text.

use std::fmt::Debug;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Canonicalizes generated Go source, rejecting text that is not well formed.
pub trait SourceFormatter: Debug {
    /// Return the formatted text, or a diagnostic if `raw` does not parse.
    fn format(&self, raw: &str) -> Result<String, String>;
}

/// Returns the text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SourceFormatter for Passthrough {
    fn format(&self, raw: &str) -> Result<String, String> {
        Ok(raw.to_string())
    }
}

/// Pipes the text through a `gofmt` process.
#[derive(Debug, Clone)]
pub struct Gofmt {
    program: PathBuf,
}

impl Gofmt {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Gofmt {
    fn default() -> Self {
        Self::new("gofmt")
    }
}

impl SourceFormatter for Gofmt {
    fn format(&self, raw: &str) -> Result<String, String> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("running {}: {e}", self.program.display()))?;

        // Dropping the handle closes stdin so gofmt sees EOF.
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(raw.as_bytes())
                .map_err(|e| format!("writing to {}: {e}", self.program.display()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| format!("waiting for {}: {e}", self.program.display()))?;
        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }
        String::from_utf8(output.stdout).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(Passthrough.format("package x\n").unwrap(), "package x\n");
    }

    #[test]
    fn test_gofmt_missing_program() {
        let err = Gofmt::new("/nonexistent/wrapgen-gofmt")
            .format("package x\n")
            .unwrap_err();
        assert!(err.contains("/nonexistent/wrapgen-gofmt"));
    }
}
