//! Turning a parameter-declaring function into an init/apply pair.

use std::marker::PhantomData;

use crate::error::Result;
use crate::frame::{Frame, FrameGuard};
use crate::params::Params;

/// The pair of pure functions produced by [`transform`].
///
/// `init` traces the wrapped function to discover and sample its parameters;
/// `apply` re-traces it against a previously produced mapping to compute
/// outputs. The pair holds no mutable state of its own: all per-call state
/// lives in the frame pushed for the duration of each trace.
pub struct Transformed<F, I, O> {
    f: F,
    _io: PhantomData<fn(&I) -> O>,
}

/// Wrap a function that declares parameters inline (via
/// [`get_param`](crate::get_param)) into a [`Transformed`] init/apply pair.
///
/// The wrapped function is re-run on every `init` and every `apply` call, so
/// any modules it constructs are re-registered each time; parameter paths
/// stay stable as long as construction and call order stay deterministic.
pub fn transform<I, O, F>(f: F) -> Transformed<F, I, O>
where
    F: Fn(&I) -> Result<O>,
{
    Transformed {
        f,
        _io: PhantomData,
    }
}

impl<I, O, F> Transformed<F, I, O>
where
    F: Fn(&I) -> Result<O>,
{
    /// Run an initialization trace and return the populated parameter
    /// mapping.
    ///
    /// Pushes a fresh frame whose sampler is seeded with `seed`, runs the
    /// wrapped function for its registration side effects (its output value
    /// is discarded), pops the frame, and hands back the parameters it
    /// collected. The same seed always produces the same mapping.
    ///
    /// The frame is popped before any error from the wrapped function is
    /// propagated, so a failed trace never leaks a frame onto the stack.
    pub fn init(&self, seed: u64, input: &I) -> Result<Params> {
        let guard = FrameGuard::push(Frame::for_init(seed));
        let traced = (self.f)(input);
        let frame = guard.finish();
        traced?;
        Ok(frame.params)
    }

    /// Run an application trace against a previously produced mapping and
    /// return the wrapped function's output.
    ///
    /// The mapping must contain every path the function requests; a missing
    /// path fails with [`Error::MissingParam`](crate::Error::MissingParam)
    /// rather than being silently defaulted. Sharing the mapping into the
    /// frame costs one Arc bump per parameter, not a copy.
    pub fn apply(&self, params: &Params, input: &I) -> Result<O> {
        let guard = FrameGuard::push(Frame::for_apply(params.clone()));
        let output = (self.f)(input);
        guard.finish();
        output
    }
}
