//! Parameter storage and the path-aware `get_param` lookup.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use ndarray::{ArcArray, ArrayD, Dimension, IxDyn};
use ndarray_rand::RandomExt;
use rand_distr::StandardNormal;

use crate::error::{Error, Result};
use crate::frame::{with_current, Frame, Mode};

/// A single parameter value.
///
/// Parameters are reference-counted ndarray handles, so cloning one out of
/// the store (or sharing a whole mapping into an `apply` frame) bumps an Arc
/// instead of copying data.
pub type Param = ArcArray<f32, IxDyn>;

/// A parameter mapping, keyed by path.
///
/// This is the sole artifact passed between `init` and `apply`. The key
/// format (`~/<module>/<method>/<identifier>`) is a contract: a mapping is
/// only valid for the identical module construction and call order that
/// produced it. A `BTreeMap` keeps iteration order deterministic.
pub type Params = BTreeMap<String, Param>;

/// Get the parameter identified by `identifier` at the current nesting
/// position, initializing it with `shape` if necessary.
///
/// The full path is derived from the current frame's call stack (see
/// [`MethodScope`](crate::MethodScope)), so the same identifier requested
/// from different nesting positions names different parameters.
///
/// During an `init` trace, a path absent from the store is populated with a
/// standard-normal sample of the requested shape, drawn from the frame's
/// seeded rng; the insert happens in the same map operation as the lookup,
/// and the first access wins. During `apply` (or when the path is already
/// present) the stored array is returned unchanged; a path missing from the
/// supplied mapping is [`Error::MissingParam`].
///
/// The stored shape is always checked against `shape`, and `D` must agree
/// with it, so a mapping produced by a differently shaped `init` fails here
/// with [`Error::ShapeMismatch`] instead of somewhere downstream in the
/// arithmetic.
///
/// ```
/// use fp_core::{transform, get_param};
/// use ndarray::Ix2;
///
/// let traced = transform(|_: &()| get_param::<Ix2>("W", &[3, 4]));
///
/// let params = traced.init(0, &())?;
/// assert_eq!(params["~/W"].shape(), &[3, 4]);
///
/// let w = traced.apply(&params, &())?;
/// assert_eq!(w.dim(), (3, 4));
/// # Ok::<(), fp_core::Error>(())
/// ```
pub fn get_param<D: Dimension>(identifier: &str, shape: &[usize]) -> Result<ArcArray<f32, D>> {
    with_current("get_param", |frame| {
        let path = frame.param_path(identifier);
        let Frame { params, mode, .. } = frame;

        let param = match mode {
            Mode::Init(rng) => match params.entry(path.clone()) {
                Entry::Occupied(slot) => slot.get().clone(),
                Entry::Vacant(slot) => {
                    let fresh: Param =
                        ArrayD::random_using(IxDyn(shape), StandardNormal, rng).into_shared();
                    log::debug!("initialized parameter `{}` with shape {:?}", path, shape);
                    slot.insert(fresh).clone()
                }
            },
            Mode::Apply => params
                .get(&path)
                .cloned()
                .ok_or_else(|| Error::MissingParam { path: path.clone() })?,
        };

        if param.shape() != shape {
            return Err(Error::ShapeMismatch {
                path,
                requested: shape.to_vec(),
                stored: param.shape().to_vec(),
            });
        }
        // The shape was just checked, so this can only fail when the call
        // site's `D` disagrees with its own `shape` argument.
        Ok(param
            .into_dimensionality::<D>()
            .expect("requested dimensionality does not match the requested shape"))
    })
}
