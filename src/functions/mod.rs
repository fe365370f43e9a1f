pub mod base;
pub mod logarithms;
pub mod power;
pub mod trigonometry;

use crate::error::RegistryError;
use crate::expression::Registry;

/// Loads every bundled operation library.
pub fn register_functions(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.load(&base::register)?;
    registry.load(&power::register)?;
    registry.load(&trigonometry::register)?;
    registry.load(&logarithms::register)?;
    Ok(())
}
