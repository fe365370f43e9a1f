use crate::error::StoreError;
use crate::expression::{is_valid_variable_name, Bindings, Registry};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-wide variable values that persist between evaluations.
///
/// Reads take a shared lock; a commit writes all bindings of one
/// evaluation under a single exclusive section.
#[derive(Debug, Default)]
pub struct VariableStore {
    variables: RwLock<HashMap<String, f64>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.variables.read().get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.read().contains_key(name)
    }

    /// Defines or overwrites a variable from outside an expression.
    ///
    /// The name must be a valid variable name and must not shadow an
    /// operation known to `registry`.
    pub fn set(&self, name: &str, value: f64, registry: &Registry) -> Result<(), StoreError> {
        if !is_valid_variable_name(name) || registry.contains(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        self.insert_unchecked(name, value);
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Option<f64> {
        self.variables.write().remove(name)
    }

    pub fn clear(&self) {
        self.variables.write().clear();
    }

    pub fn len(&self) -> usize {
        self.variables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.read().is_empty()
    }

    /// All stored variables, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        let mut variables: Vec<(String, f64)> = self
            .variables
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        variables.sort_by(|a, b| a.0.cmp(&b.0));
        variables
    }

    /// Writes back every initialized binding of a successful evaluation.
    pub fn commit(&self, bindings: &Bindings) {
        let mut variables = self.variables.write();
        for (name, value) in bindings.iter() {
            if let Some(value) = value {
                debug!("Commit {name} = {value}");
                variables.insert(name.to_string(), value);
            }
        }
    }

    pub(crate) fn insert_unchecked(&self, name: &str, value: f64) {
        self.variables.write().insert(name.to_string(), value);
    }
}
