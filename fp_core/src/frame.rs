//! The frame stack: the dynamic-scoping substrate of the mechanism.
//!
//! Every call into a transformed function pushes one [`Frame`] onto a
//! thread-local stack and pops it on exit. While that frame is current,
//! nested code can request parameters by name ([`crate::get_param`]),
//! register module instances ([`register_module`]), and enter method scopes
//! ([`MethodScope`]) without threading a parameter store through every call.
//!
//! The stack is thread-local: concurrent top-level calls on different
//! threads get fully isolated stacks, and two transformed calls nested on
//! one thread bracket correctly in LIFO order. Push and pop happen only
//! through RAII guards, so a frame never outlives the call that created it,
//! even when the traced function panics.

use std::cell::RefCell;
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::params::Params;

/// Root marker of every parameter path.
pub const PATH_ROOT: &str = "~";

/// Separator between parameter path segments.
pub const PATH_SEP: &str = "/";

thread_local! {
    static FRAME_STACK: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
}

/// Current frame-stack depth, for stack-hygiene assertions in tests.
#[cfg(test)]
pub(crate) fn stack_depth() -> usize {
    FRAME_STACK.with(|stack| stack.borrow().len())
}

/// Whether a frame is tracing an initialization or an application pass.
///
/// An init frame owns the sampler used to populate fresh parameters; an
/// apply frame never samples, so it carries none.
pub(crate) enum Mode {
    Init(StdRng),
    Apply,
}

/// Tracks mechanism state during one call of a transformed function.
pub(crate) struct Frame {
    /// The live parameter store for this call.
    pub(crate) params: Params,
    /// Initialization vs application pass.
    pub(crate) mode: Mode,
    /// How many modules of each kind this frame has named so far.
    /// Scoped to the frame, never shared across calls.
    module_counts: HashMap<String, usize>,
    /// The nested (module-name, method-name) segments currently active,
    /// flattened. Used to build parameter paths.
    call_stack: Vec<String>,
}

impl Frame {
    /// Frame for an initialization pass, with an empty store and a sampler
    /// seeded by the caller.
    pub(crate) fn for_init(seed: u64) -> Self {
        Frame {
            params: Params::new(),
            mode: Mode::Init(StdRng::seed_from_u64(seed)),
            module_counts: HashMap::new(),
            call_stack: Vec::new(),
        }
    }

    /// Frame for an application pass over a caller-supplied store.
    pub(crate) fn for_apply(params: Params) -> Self {
        Frame {
            params,
            mode: Mode::Apply,
            module_counts: HashMap::new(),
            call_stack: Vec::new(),
        }
    }

    /// Unique path for the parameter identified by `identifier` at the
    /// current nesting position: root marker, every call-stack segment, then
    /// the identifier, joined by [`PATH_SEP`].
    pub(crate) fn param_path(&self, identifier: &str) -> String {
        let mut segments = Vec::with_capacity(self.call_stack.len() + 2);
        segments.push(PATH_ROOT);
        segments.extend(self.call_stack.iter().map(String::as_str));
        segments.push(identifier);
        segments.join(PATH_SEP)
    }

    /// Unique instance name for a module of the given kind:
    /// `"<kind>_<n>"` with `n` counting prior instances of that kind in
    /// this frame.
    pub(crate) fn unique_module_name(&mut self, kind: &str) -> String {
        let count = self.module_counts.entry(kind.to_string()).or_insert(0);
        let name = format!("{}_{}", kind, count);
        *count += 1;
        name
    }
}

/// Run `f` against the current (topmost) frame.
///
/// Fails with [`Error::NoActiveFrame`] when called outside of any
/// `init`/`apply` trace. `f` must not re-enter the frame stack.
pub(crate) fn with_current<T>(
    op: &'static str,
    f: impl FnOnce(&mut Frame) -> Result<T>,
) -> Result<T> {
    FRAME_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let frame = stack.last_mut().ok_or(Error::NoActiveFrame { op })?;
        f(frame)
    })
}

/// RAII handle for one pushed frame.
///
/// `finish` pops the frame and hands it back for inspection; if the guard is
/// instead dropped (the traced function panicked), the frame is popped and
/// discarded so the stack stays clean for unrelated later calls.
pub(crate) struct FrameGuard {
    armed: bool,
}

impl FrameGuard {
    pub(crate) fn push(frame: Frame) -> Self {
        FRAME_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            log::trace!("pushing frame (depth {} -> {})", stack.len(), stack.len() + 1);
            stack.push(frame);
        });
        FrameGuard { armed: true }
    }

    /// Pop the frame this guard owns and return it.
    pub(crate) fn finish(mut self) -> Frame {
        self.armed = false;
        FRAME_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            log::trace!("popping frame (depth {} -> {})", stack.len(), stack.len().saturating_sub(1));
            stack.pop().expect("frame stack underflow: guard outlived its frame")
        })
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.armed {
            FRAME_STACK.with(|stack| {
                stack.borrow_mut().pop();
            });
        }
    }
}

/// Register a module instance of the given kind with the current frame and
/// return its unique name (`"Linear_0"`, `"Linear_1"`, ...).
///
/// Instance numbers count construction order within one frame, so names are
/// deterministic as long as construction order is. Constructing a module
/// outside of any `init`/`apply` call is an error.
///
/// Call this exactly once per module instance, at construction time, and
/// keep the returned name for the lifetime of the instance.
pub fn register_module(kind: &str) -> Result<String> {
    with_current("register_module", |frame| {
        let name = frame.unique_module_name(kind);
        log::debug!("registered module `{}`", name);
        Ok(name)
    })
}

/// Scoped entry in the current frame's call stack.
///
/// Entering pushes the owning module's unique name and then the method name;
/// dropping pops exactly those two entries in reverse order and verifies
/// they match what was pushed. A mismatch means the nesting invariant was
/// corrupted (e.g. by overlapping scopes) and panics rather than silently
/// producing wrong parameter paths for later calls.
///
/// The guard pops on every exit path, so a method that returns early or
/// panics still leaves the call stack exactly as it found it. The mismatch
/// check is suppressed while a panic is already unwinding, because a double
/// panic would abort and mask the original error.
///
/// ```
/// use fp_core::{transform, get_param, register_module, MethodScope};
/// use ndarray::IxDyn;
///
/// let traced = transform(|_: &()| {
///     let name = register_module("Counter")?;
///     let _scope = MethodScope::enter(&name, "forward")?;
///     get_param::<IxDyn>("state", &[1])
/// });
/// let params = traced.init(0, &())?;
/// assert!(params.contains_key("~/Counter_0/forward/state"));
/// # Ok::<(), fp_core::Error>(())
/// ```
#[must_use = "the scope ends when this guard is dropped"]
#[derive(Debug)]
pub struct MethodScope {
    module: String,
    method: &'static str,
}

impl MethodScope {
    /// Push `module` then `method` onto the current frame's call stack.
    pub fn enter(module: &str, method: &'static str) -> Result<MethodScope> {
        with_current("MethodScope::enter", |frame| {
            frame.call_stack.push(module.to_string());
            frame.call_stack.push(method.to_string());
            log::trace!("entered scope {}/{}", module, method);
            Ok(())
        })?;
        Ok(MethodScope {
            module: module.to_string(),
            method,
        })
    }
}

impl Drop for MethodScope {
    fn drop(&mut self) {
        let (method, module) = FRAME_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            match stack.last_mut() {
                Some(frame) => (frame.call_stack.pop(), frame.call_stack.pop()),
                None => (None, None),
            }
        });
        if std::thread::panicking() {
            return;
        }
        assert_eq!(
            method.as_deref(),
            Some(self.method),
            "call stack corrupted: expected to pop method `{}`",
            self.method
        );
        assert_eq!(
            module.as_deref(),
            Some(self.module.as_str()),
            "call stack corrupted: expected to pop module `{}`",
            self.module
        );
    }
}
