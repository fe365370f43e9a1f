use crate::error::RegistryError;
use crate::expression::{Operation, Registry};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(Operation::binary_right("^", 4, f64::powf))
}
