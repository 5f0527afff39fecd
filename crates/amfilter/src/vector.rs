//! Index-addressable scalar fields exchanged with the optimizer.

/// A mesh scalar field, one value per node.
pub trait OptimizationVector {
    /// Value at `index`.
    fn get_value(&self, index: usize) -> f64;

    /// Overwrite the value at `index`.
    fn set_value(&mut self, index: usize, value: f64);

    /// Number of values.
    fn get_length(&self) -> usize;
}

impl OptimizationVector for [f64] {
    fn get_value(&self, index: usize) -> f64 {
        self[index]
    }

    fn set_value(&mut self, index: usize, value: f64) {
        self[index] = value;
    }

    fn get_length(&self) -> usize {
        self.len()
    }
}

impl OptimizationVector for Vec<f64> {
    fn get_value(&self, index: usize) -> f64 {
        self[index]
    }

    fn set_value(&mut self, index: usize, value: f64) {
        self[index] = value;
    }

    fn get_length(&self) -> usize {
        self.len()
    }
}
