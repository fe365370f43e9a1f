use crate::error::{EvalError, LexError, RegistryError};
use crate::expression::{tokenize, Evaluator, Registry, Token, VariableStore};
use crate::functions::register_functions;
use log::{debug, trace};
use lru::LruCache;
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// A registry, a variable store and a cache of tokenized expressions.
///
/// The registry is frozen once the calculator is built, so cached token
/// streams never go stale.
pub struct Calculator {
    registry: Arc<Registry>,
    store: Arc<VariableStore>,
    cache: Option<LruCache<String, Arc<[Token]>>>,
}

impl Calculator {
    /// Creates a calculator with every bundled library loaded and an empty
    /// store, caching up to `max_cache_size` tokenized expressions (0
    /// disables the cache).
    pub fn new(max_cache_size: usize) -> Result<Self, RegistryError> {
        let mut registry = Registry::new();
        register_functions(&mut registry)?;
        Ok(Self::with_parts(
            Arc::new(registry),
            Arc::new(VariableStore::new()),
            max_cache_size,
        ))
    }

    pub fn with_parts(
        registry: Arc<Registry>,
        store: Arc<VariableStore>,
        max_cache_size: usize,
    ) -> Self {
        debug!(
            "Calculator with {} operations, cache size {}",
            registry.len(),
            max_cache_size
        );
        Self {
            registry,
            store,
            cache: NonZeroUsize::new(max_cache_size).map(LruCache::new),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Number of tokenized expressions currently cached.
    pub fn cached_expressions(&self) -> usize {
        self.cache.as_ref().map_or(0, LruCache::len)
    }

    pub fn tokenize(&mut self, expression: &str) -> Result<Arc<[Token]>, LexError> {
        if let Some(tokens) = self.cache.as_mut().and_then(|cache| cache.get(expression)) {
            trace!("Token cache hit for {:?}", expression);
            return Ok(Arc::clone(tokens));
        }

        let tokens: Arc<[Token]> = tokenize(&self.registry, expression)?.into();
        if let Some(cache) = self.cache.as_mut() {
            cache.put(expression.to_string(), Arc::clone(&tokens));
        }
        Ok(tokens)
    }

    pub fn evaluate(&mut self, expression: &str) -> Result<f64, EvalError> {
        let tokens = self.tokenize(expression)?;
        Evaluator::new(&self.registry, &self.store).evaluate_tokens(&tokens)
    }

    /// Evaluates independent expressions in parallel against the shared
    /// store. Results are returned in input order.
    pub fn evaluate_batch(&self, expressions: &[&str]) -> Vec<Result<f64, EvalError>> {
        let evaluator = Evaluator::new(&self.registry, &self.store);
        expressions
            .par_iter()
            .map(|expression| evaluator.evaluate(expression))
            .collect()
    }
}
