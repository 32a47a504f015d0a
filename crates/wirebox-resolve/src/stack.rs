//! Circular-reference detection over the active resolution stack.
//!
//! Every definition whose type is being resolved is pushed on entry and popped
//! when its [`StackGuard`] is dropped, which happens on every exit path: normal
//! return, early return through `?`, and unwinding.

use std::cell::RefCell;
use std::rc::Rc;

use wirebox_model::DefinitionId;

use crate::error::ResolveError;

#[derive(Debug, Clone)]
struct Frame {
    id: DefinitionId,
    label: String,
}

/// The definitions currently being resolved, outermost first.
#[derive(Debug, Default, Clone)]
pub struct ResolutionStack {
    frames: Rc<RefCell<Vec<Frame>>>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `id`, failing with a circular reference if it is already on the stack.
    ///
    /// The error lists every definition on the stack, outermost first.
    pub fn enter(&self, id: DefinitionId, label: &str) -> Result<StackGuard, ResolveError> {
        let mut frames = self.frames.borrow_mut();
        if frames.iter().any(|frame| frame.id == id) {
            let services = frames.iter().map(|frame| frame.label.clone()).collect();
            return Err(ResolveError::circular(services));
        }
        frames.push(Frame { id, label: label.to_string() });
        Ok(StackGuard { frames: Rc::clone(&self.frames), id })
    }

    pub fn contains(&self, id: DefinitionId) -> bool {
        self.frames.borrow().iter().any(|frame| frame.id == id)
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}

/// Keeps a definition on the stack until dropped.
#[must_use = "the definition leaves the stack as soon as the guard is dropped"]
pub struct StackGuard {
    frames: Rc<RefCell<Vec<Frame>>>,
    id: DefinitionId,
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        let mut frames = self.frames.borrow_mut();
        debug_assert_eq!(frames.last().map(|frame| frame.id), Some(self.id));
        frames.pop();
    }
}
