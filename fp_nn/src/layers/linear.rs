//! Linear (fully connected) layer.

use ndarray::{Array2, Ix1, Ix2};

use fp_core::{get_param, register_module, MethodScope, Result};

use crate::module::Module;

/// A linear (affine) layer: `y = x · W + b`.
///
/// The input width is read off the input at call time, so the layer is
/// declared by its output width alone. `W` has shape `(in, width)` and `b`
/// has shape `(width,)`, stored under this instance's scope, e.g.
/// `~/Linear_0/forward/W`.
#[derive(Debug)]
pub struct Linear {
    name: String,
    width: usize,
}

impl Linear {
    /// Declare a linear layer with the given output width.
    ///
    /// Registers the instance with the current frame; constructing a layer
    /// outside of an `init`/`apply` trace is an error.
    pub fn new(width: usize) -> Result<Self> {
        let name = register_module("Linear")?;
        log::debug!("declared `{}` with width {}", name, width);
        Ok(Linear { name, width })
    }

    /// Output width of this layer.
    pub fn width(&self) -> usize {
        self.width
    }
}

impl Module for Linear {
    fn name(&self) -> &str {
        &self.name
    }

    /// Forward pass: `y = x · W + b`.
    ///
    /// Input has shape `(batch, in)`; output has shape `(batch, width)`.
    fn forward(&self, input: &Array2<f32>) -> Result<Array2<f32>> {
        let _scope = MethodScope::enter(&self.name, "forward")?;
        let (_, in_dim) = input.dim();
        let w = get_param::<Ix2>("W", &[in_dim, self.width])?;
        let b = get_param::<Ix1>("b", &[self.width])?;
        Ok(input.dot(&w) + &b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::{transform, Error};
    use ndarray::array;

    #[test]
    fn test_linear_registers_w_and_b() {
        let traced = transform(|x: &Array2<f32>| Linear::new(4)?.forward(x));
        let x = array![[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let params = traced.init(0, &x).unwrap();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec!["~/Linear_0/forward/W", "~/Linear_0/forward/b"],
        );
        assert_eq!(params["~/Linear_0/forward/W"].shape(), &[3, 4]);
        assert_eq!(params["~/Linear_0/forward/b"].shape(), &[4]);
    }

    #[test]
    fn test_linear_forward_is_x_dot_w_plus_b() {
        let traced = transform(|x: &Array2<f32>| Linear::new(4)?.forward(x));
        let x = array![[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0]];

        let params = traced.init(7, &x).unwrap();
        let y = traced.apply(&params, &x).unwrap();
        assert_eq!(y.dim(), (2, 4));

        let w = params["~/Linear_0/forward/W"]
            .clone()
            .into_dimensionality::<Ix2>()
            .unwrap();
        let b = params["~/Linear_0/forward/b"]
            .clone()
            .into_dimensionality::<Ix1>()
            .unwrap();
        assert_eq!(y, x.dot(&w) + &b);
    }

    #[test]
    fn test_sibling_linears_get_distinct_names() {
        let traced = transform(|x: &Array2<f32>| {
            let first = Linear::new(4)?;
            let second = Linear::new(2)?;
            second.forward(&first.forward(x)?)
        });
        let x = array![[1.0_f32, 2.0, 3.0]];

        let params = traced.init(0, &x).unwrap();
        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec![
                "~/Linear_0/forward/W",
                "~/Linear_0/forward/b",
                "~/Linear_1/forward/W",
                "~/Linear_1/forward/b",
            ],
        );

        let y = traced.apply(&params, &x).unwrap();
        assert_eq!(y.dim(), (1, 2));
    }

    #[test]
    fn test_linear_outside_a_trace_is_an_error() {
        let err = Linear::new(4).unwrap_err();
        assert_eq!(
            err,
            Error::NoActiveFrame {
                op: "register_module"
            }
        );
    }
}
