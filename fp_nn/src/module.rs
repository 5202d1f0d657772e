//! The module abstraction layered on the frame mechanism.

use ndarray::Array2;

use fp_core::Result;

/// A named, composable model component.
///
/// A module is an ordinary struct that registers itself with the current
/// frame at construction time (via
/// [`register_module`](fp_core::register_module)) and keeps the unique name
/// it was assigned. Its `forward` method opens a
/// [`MethodScope`](fp_core::MethodScope) for the duration of the call, so
/// every parameter it requests - directly or through nested modules - gets a
/// path rooted at this instance.
///
/// Modules are re-constructed on every trace, because `init` and `apply`
/// both re-run the defining function. Their names depend only on
/// construction order within a frame, which keeps paths stable across
/// traces.
pub trait Module {
    /// The unique instance name assigned at construction, e.g. `"Linear_0"`.
    fn name(&self) -> &str;

    /// Run the module on a batch of inputs.
    fn forward(&self, input: &Array2<f32>) -> Result<Array2<f32>>;
}
