//! Process-wide compile cache
//!
//! Maps full source text to its parsed program. Entries never expire; the
//! table is cleared only when a keyword dictionary is (re)registered.

use crate::ast::Program;
use crate::error::Result;
use crate::parser;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::{Arc, LazyLock};

static GLOBAL_CACHE: LazyLock<CompileCache> = LazyLock::new(CompileCache::new);

/// Source text → compiled program
#[derive(Debug, Default)]
pub struct CompileCache {
    entries: RwLock<FxHashMap<Arc<str>, Arc<Program>>>,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every interpreter in the process.
    pub fn global() -> &'static CompileCache {
        &GLOBAL_CACHE
    }

    pub fn get(&self, source: &str) -> Option<Arc<Program>> {
        self.entries.read().get(source).cloned()
    }

    pub fn insert(&self, source: &str, program: Arc<Program>) {
        self.entries.write().insert(Arc::from(source), program);
    }

    /// Compile `source`, consulting and filling the cache when `use_cache` is set.
    pub fn compile(&self, source: &str, use_cache: bool) -> Result<Arc<Program>> {
        if use_cache {
            if let Some(program) = self.get(source) {
                tracing::debug!(bytes = source.len(), "compile cache hit");
                return Ok(program);
            }
        }

        let program = Arc::new(parser::parse(source)?);
        if use_cache {
            tracing::debug!(bytes = source.len(), "compile cache miss");
            self.insert(source, Arc::clone(&program));
        }
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Compile through the process-wide cache.
pub fn compile(source: &str, use_cache: bool) -> Result<Arc<Program>> {
    CompileCache::global().compile(source, use_cache)
}
