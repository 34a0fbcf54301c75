//! Built-in item catalogs for the four vectors.

pub mod interactive;
pub mod narrative;
pub mod temporal;
pub mod visual;

use super::{VectorError, VectorKind, VectorModule};

/// Builds the built-in module for a vector.
pub fn module_for(kind: VectorKind) -> Result<VectorModule, VectorError> {
    match kind {
        VectorKind::Visual => visual::module(),
        VectorKind::Narrative => narrative::module(),
        VectorKind::Interactive => interactive::module(),
        VectorKind::Temporal => temporal::module(),
    }
}

/// Builds all four built-in modules in phase order.
pub fn standard_modules() -> Result<Vec<VectorModule>, VectorError> {
    VectorKind::all().iter().map(|k| module_for(*k)).collect()
}
