use crate::error::EvalError;
use crate::expression::VariableStore;
use log::trace;
use std::collections::HashMap;

/// Index of a variable slot inside the [`Bindings`] of one evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VarId(usize);

/// A value on the operand stack.
///
/// Variables are referenced by slot so that every occurrence of a name in
/// one expression observes the same binding.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Operand {
    Literal(f64),
    Variable(VarId),
}

impl Operand {
    pub fn as_variable(&self) -> Option<VarId> {
        match self {
            Operand::Variable(id) => Some(*id),
            Operand::Literal(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    value: Option<f64>,
}

/// Expression-scoped variable arena.
///
/// Slots are seeded lazily from the persistent store the first time a name
/// is seen and are written back only once the whole expression succeeded.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    slots: Vec<Slot>,
    by_name: HashMap<String, VarId>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `name`, creating it from the store (or
    /// uninitialized) on first use.
    pub fn resolve(&mut self, name: &str, store: &VariableStore) -> VarId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        let value = store.get(name);
        trace!("Binding variable {name} (stored value: {value:?})");
        let id = VarId(self.slots.len());
        self.slots.push(Slot {
            name: name.to_string(),
            value,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Reads the numeric value of an operand.
    pub fn value(&self, operand: Operand) -> Result<f64, EvalError> {
        match operand {
            Operand::Literal(value) => Ok(value),
            Operand::Variable(id) => {
                let slot = &self.slots[id.0];
                slot.value
                    .ok_or_else(|| EvalError::UninitializedVariable(slot.name.clone()))
            }
        }
    }

    pub fn set(&mut self, id: VarId, value: f64) {
        self.slots[id.0].value = Some(value);
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.slots[id.0].name
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every binding touched by the evaluation, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.slots.iter().map(|slot| (slot.name.as_str(), slot.value))
    }
}
