//! # fp_nn - Neural Network Modules for fp_core
//!
//! This crate provides module-structured model building blocks on top of the
//! fp_core frame/transform mechanism:
//!
//! - **[`Module`]**: the trait tying a registered instance name to a
//!   `forward` method that runs inside its own call-stack scope
//! - **[`Linear`]**: a single affine transform `y = x · W + b`
//! - **[`Mlp`]**: nested composition of `Linear` layers
//!
//! ## Example
//!
//! ```
//! use fp_core::transform;
//! use fp_nn::{Linear, Module};
//! use ndarray::array;
//!
//! let model = transform(|x: &ndarray::Array2<f32>| Linear::new(4)?.forward(x));
//!
//! let x = array![[1.0_f32, 2.0, 3.0]];
//! let params = model.init(42, &x)?;
//! assert_eq!(params["~/Linear_0/forward/W"].shape(), &[3, 4]);
//!
//! let y = model.apply(&params, &x)?;
//! assert_eq!(y.dim(), (1, 4));
//! # Ok::<(), fp_core::Error>(())
//! ```

pub mod layers;
pub mod module;

// Re-exports for convenience
pub use layers::{Linear, Mlp};
pub use module::Module;
