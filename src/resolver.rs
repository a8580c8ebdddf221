//! Module resolution: how `import` statements find and compile other
//! sources.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::compiler::compile_module;
use crate::module::Module;

/// The collaborator the compiler asks for imported modules. Implementations
/// typically locate a source text and compile it recursively with
/// themselves as the resolver.
///
/// Import cycles are not detected at this layer; a cycle through a resolver
/// will recurse without bound, so resolvers (or their callers) must ensure
/// the import graph is acyclic.
pub trait Resolve {
    /// Resolves an `@scope/path` import.
    fn resolve_scoped(&self, scope: &str, path: &str) -> Result<Module, String>;

    /// Resolves a relative or absolute path import.
    fn resolve_local(&self, path: &str, absolute: bool) -> Result<Module, String>;
}

/// Resolves local imports against a base directory, appending the `.lang`
/// extension. Scoped imports are out of its reach.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    base_path: PathBuf,
}

impl FileSystemResolver {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        FileSystemResolver {
            base_path: base_path.into(),
        }
    }
}

impl Resolve for FileSystemResolver {
    fn resolve_scoped(&self, scope: &str, path: &str) -> Result<Module, String> {
        Err(format!(
            "Cannot resolve `@{scope}/{path}` from the filesystem. Try a different resolver."
        ))
    }

    fn resolve_local(&self, path: &str, absolute: bool) -> Result<Module, String> {
        let mut file = if absolute {
            PathBuf::from(path)
        } else {
            self.base_path.join(path)
        };
        file.set_extension("lang");

        let name = file.to_string_lossy().into_owned();
        match fs::read_to_string(&file) {
            Ok(source) => Ok(compile_module(&source, &name, self)),
            Err(_) => Err(format!("Failed to resolve path `{name}`")),
        }
    }
}

/// An in-memory resolver for tests and embedding: a map from import paths
/// (`@scope/path` or plain local paths) to source texts, compiled on
/// demand.
#[derive(Debug, Clone, Default)]
pub struct MockResolver {
    sources: HashMap<String, String>,
}

impl MockResolver {
    pub fn new(sources: HashMap<String, String>) -> Self {
        MockResolver { sources }
    }

    fn compile(&self, key: &str) -> Result<Module, String> {
        match self.sources.get(key) {
            Some(source) => Ok(compile_module(source, key, self)),
            None => Err(format!("Failed to resolve path `{key}`")),
        }
    }
}

impl Resolve for MockResolver {
    fn resolve_scoped(&self, scope: &str, path: &str) -> Result<Module, String> {
        self.compile(&format!("@{scope}/{path}"))
    }

    fn resolve_local(&self, path: &str, _absolute: bool) -> Result<Module, String> {
        self.compile(path)
    }
}
