//! Filesystem loader for script modules.
//!
//! Resolves module names against a base directory and caches file contents by
//! resolved path, so a module imported from several places is read once.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Hook applied to the bytes of every successful read.
pub type Preprocess = fn(Vec<u8>) -> Vec<u8>;

/// Blank out a leading `#!` interpreter line, keeping its newline so line
/// numbers are unchanged.
pub fn strip_shebang(mut source: Vec<u8>) -> Vec<u8> {
    if source.starts_with(b"#!") {
        let end = source
            .iter()
            .position(|&b| b == b'\n')
            .unwrap_or(source.len());
        source.drain(..end);
    }
    source
}

/// Loads module sources relative to a base directory.
#[derive(Debug, Clone)]
pub struct ModuleLoader {
    base: PathBuf,
    preprocess: Option<Preprocess>,
    cache: HashMap<PathBuf, Vec<u8>>,
}

impl ModuleLoader {
    /// Create a loader rooted at `base`. Relative bases are taken from the
    /// current directory.
    pub fn new(base: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            base: normalize(&std::path::absolute(base)?),
            preprocess: None,
            cache: HashMap::new(),
        })
    }

    /// Set the hook run over every file read.
    pub fn with_preprocess(mut self, preprocess: Preprocess) -> Self {
        self.preprocess = Some(preprocess);
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Absolute, lexically normalized path of a module name.
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        normalize(&self.base.join(name))
    }

    /// Read a resolved path, applying the preprocess hook.
    pub fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = fs::read(path)?;
        Ok(match self.preprocess {
            Some(preprocess) => preprocess(bytes),
            None => bytes,
        })
    }

    /// A loader for modules imported from `path`, rooted at its directory.
    ///
    /// The child keeps the preprocess hook but starts with an empty cache.
    pub fn child(&self, path: &Path) -> ModuleLoader {
        let path = self.resolve(path);
        let base = path.parent().map(Path::to_path_buf).unwrap_or(path);
        ModuleLoader {
            base,
            preprocess: self.preprocess,
            cache: HashMap::new(),
        }
    }

    /// Resolve and read a module, reusing earlier reads of the same path.
    pub fn load(&mut self, name: impl AsRef<Path>) -> io::Result<&[u8]> {
        let path = self.resolve(name);
        if !self.cache.contains_key(&path) {
            let bytes = self.read(&path)?;
            tracing::debug!(path = %path.display(), len = bytes.len(), "loaded module");
            self.cache.insert(path.clone(), bytes);
        }
        Ok(self.cache.get(&path).map(Vec::as_slice).unwrap_or_default())
    }
}

/// Remove `.` and resolve `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
