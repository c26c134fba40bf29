//! Opaque tensor attachment.
//!
//! The hypergraph never does tensor math. An atom may carry a handle into an
//! external tensor backend; only the shape is inspected, to reject a
//! replacement that would change it.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorHandle {
    /// Backend-assigned identifier.
    pub tensor_id: u64,
    /// Dimensions, outermost first.
    pub shape: Vec<usize>,
}

impl TensorHandle {
    pub fn new(tensor_id: u64, shape: impl Into<Vec<usize>>) -> Self {
        Self {
            tensor_id,
            shape: shape.into(),
        }
    }

    /// Number of elements described by the shape.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}
