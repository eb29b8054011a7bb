//! Pointer cursor affordance.
//!
//! The cursor style is window-wide state, but it is only ever changed through
//! a [`CursorLease`]. Whoever acquired the lease last owns the cursor; when
//! the owner's lease is released or dropped the style returns to
//! [`CursorStyle::Default`]. A stale lease from a torn-down view has no
//! effect once someone else owns the cursor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Default)]
struct CursorState {
    style: CursorStyle,
    owner: Option<u64>,
    next_lease: u64,
}

/// Shared handle to one window's cursor.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    state: Rc<RefCell<CursorState>>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(&self) -> CursorStyle {
        self.state.borrow().style
    }

    /// Takes ownership of the cursor and applies `style`.
    pub fn acquire(&self, style: CursorStyle) -> CursorLease {
        let mut state = self.state.borrow_mut();
        let id = state.next_lease;
        state.next_lease += 1;
        state.owner = Some(id);
        state.style = style;
        CursorLease {
            id,
            state: Rc::downgrade(&self.state),
        }
    }

    pub fn is_owned(&self) -> bool {
        self.state.borrow().owner.is_some()
    }
}

/// Scoped ownership of the cursor style. Dropping it restores the default.
#[derive(Debug)]
#[must_use = "dropping the lease immediately restores the default cursor"]
pub struct CursorLease {
    id: u64,
    state: Weak<RefCell<CursorState>>,
}

impl CursorLease {
    pub fn release(self) {}
}

impl Drop for CursorLease {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = state.borrow_mut();
        if state.owner == Some(self.id) {
            state.owner = None;
            state.style = CursorStyle::Default;
        }
    }
}
