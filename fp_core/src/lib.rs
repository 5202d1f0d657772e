//! # fp_core - Functional Parameter Management
//!
//! This crate separates network *definition* from parameter *storage*: a
//! model is written as an ordinary function that declares its parameters
//! inline, and [`transform`] turns that function into a pair of pure
//! functions - one that returns a freshly initialized parameter mapping, and
//! one that computes outputs from a previously produced mapping.
//!
//! ## Overview
//!
//! The trick is an implicit "current frame" context. Each call into a
//! transformed function pushes a frame onto a thread-local stack; while that
//! frame is current, [`get_param`] resolves parameter requests against it. During an `init` trace, unseen parameters are
//! sampled fresh; during an `apply` trace they are looked up from the
//! caller's mapping, and a missing path is a hard error.
//!
//! Parameter keys are hierarchical paths derived from the call structure
//! ([`MethodScope`]), so the same identifier used at different nesting
//! positions names different parameters, and re-tracing with the same
//! module construction and call order reproduces the same paths.
//!
//! ## Quick Start
//!
//! ```
//! use fp_core::{transform, get_param};
//! use ndarray::{array, Array2, Ix1, Ix2};
//!
//! // An affine layer written as an ordinary function that declares its
//! // parameters inline.
//! let affine = transform(|x: &Array2<f32>| {
//!     let (_, in_dim) = x.dim();
//!     let w = get_param::<Ix2>("w", &[in_dim, 4])?;
//!     let b = get_param::<Ix1>("b", &[4])?;
//!     Ok(x.dot(&w) + &b)
//! });
//!
//! let x = array![[1.0_f32, 2.0, 3.0]];
//!
//! // `init` traces the function and returns freshly sampled parameters...
//! let params = affine.init(42, &x)?;
//! assert_eq!(params["~/w"].shape(), &[3, 4]);
//! assert_eq!(params["~/b"].shape(), &[4]);
//!
//! // ...and `apply` recomputes the function against that mapping.
//! let y = affine.apply(&params, &x)?;
//! assert_eq!(y.dim(), (1, 4));
//! # Ok::<(), fp_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - **[`transform`] / [`Transformed`]**: wrap a function into the
//!   `init`/`apply` pair. Frames are pushed and popped by RAII guards, so
//!   the stack stays clean even when a trace fails.
//! - **[`get_param`]**: path-aware parameter lookup; insert-if-absent
//!   sampling during `init`, strict lookup during `apply`.
//! - **[`register_module`] / [`MethodScope`]**: the naming registry and
//!   call-stack instrumentation that give nested, module-structured models
//!   unique, stable parameter paths.
//!
//! ## Concurrency
//!
//! The frame stack is thread-local. Concurrent top-level `init`/`apply`
//! calls on different threads are fully isolated; on one thread, nested
//! transformed calls bracket in strict LIFO order. No operation suspends or
//! yields mid-trace.

mod error;
mod frame;
mod params;
mod transform;

pub use error::{Error, Result};
pub use frame::{register_module, MethodScope, PATH_ROOT, PATH_SEP};
pub use params::{get_param, Param, Params};
pub use transform::{transform, Transformed};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::frame::{register_module, MethodScope};
    pub use crate::params::{get_param, Param, Params};
    pub use crate::transform::{transform, Transformed};
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, Ix1, Ix2};

    /// A module-structured model built against the public API only.
    struct Affine {
        name: String,
        width: usize,
    }

    impl Affine {
        fn new(width: usize) -> Result<Self> {
            Ok(Affine {
                name: register_module("Affine")?,
                width,
            })
        }

        fn forward(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
            let _scope = MethodScope::enter(&self.name, "forward")?;
            let (_, in_dim) = x.dim();
            let w = get_param::<Ix2>("w", &[in_dim, self.width])?;
            let b = get_param::<Ix1>("b", &[self.width])?;
            Ok(x.dot(&w) + &b)
        }
    }

    #[test]
    fn test_module_structured_trace_end_to_end() {
        let traced = transform(|x: &Array2<f32>| {
            let first = Affine::new(4)?;
            let second = Affine::new(2)?;
            second.forward(&first.forward(x)?)
        });

        let x = array![[1.0_f32, 2.0, 3.0]];
        let params = traced.init(0, &x).unwrap();

        assert_eq!(
            params.keys().collect::<Vec<_>>(),
            vec![
                "~/Affine_0/forward/b",
                "~/Affine_0/forward/w",
                "~/Affine_1/forward/b",
                "~/Affine_1/forward/w",
            ],
        );

        let y = traced.apply(&params, &x).unwrap();
        assert_eq!(y.dim(), (1, 2));
    }

    #[test]
    fn test_same_identifier_at_different_positions_names_different_params() {
        let traced = transform(|_: &()| {
            let a = Affine::new(3)?;
            let b = Affine::new(3)?;
            let x = array![[1.0_f32, 2.0]];
            a.forward(&x)?;
            b.forward(&x)?;
            Ok(())
        });

        let params = traced.init(9, &()).unwrap();
        // Both modules request "w", but their paths never collide.
        assert!(params.contains_key("~/Affine_0/forward/w"));
        assert!(params.contains_key("~/Affine_1/forward/w"));
        assert_eq!(params.len(), 4);
    }
}
