//! Multi-layer perceptron built from nested `Linear` modules.

use ndarray::Array2;

use fp_core::{register_module, MethodScope, Result};

use crate::layers::Linear;
use crate::module::Module;

/// A stack of [`Linear`] layers with ReLU between them (none after the
/// last).
///
/// `Mlp` exists to exercise nesting: its inner layers run inside the `Mlp`
/// instance's method scope, so their parameters land under paths like
/// `~/Mlp_0/forward/Linear_0/forward/W`.
pub struct Mlp {
    name: String,
    layers: Vec<Linear>,
}

impl Mlp {
    /// Declare an MLP with one `Linear` per entry of `widths`.
    pub fn new(widths: &[usize]) -> Result<Self> {
        let name = register_module("Mlp")?;
        log::debug!("declared `{}` with widths {:?}", name, widths);
        let layers = widths
            .iter()
            .map(|&width| Linear::new(width))
            .collect::<Result<Vec<_>>>()?;
        Ok(Mlp { name, layers })
    }
}

impl Module for Mlp {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&self, input: &Array2<f32>) -> Result<Array2<f32>> {
        let _scope = MethodScope::enter(&self.name, "forward")?;
        let last = self.layers.len().saturating_sub(1);
        let mut hidden = input.clone();
        for (index, layer) in self.layers.iter().enumerate() {
            hidden = layer.forward(&hidden)?;
            if index < last {
                hidden.mapv_inplace(|v| v.max(0.0));
            }
        }
        Ok(hidden)
    }
}
