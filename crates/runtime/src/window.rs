use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Pointer position in window pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Drawable area of a view in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Pixel coordinates to normalized device coordinates in `[-1, 1]`, y up.
    pub fn to_ndc(&self, pos: ScreenPos) -> (f64, f64) {
        (
            (pos.x / self.width) * 2.0 - 1.0,
            1.0 - (pos.y / self.height) * 2.0,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

type PointerListener = Box<dyn FnMut(ScreenPos)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, PointerListener)>,
    dispatching: bool,
    removed: Vec<u64>,
}

/// Window-level pointer-move listener registry.
///
/// Listeners are registered for the lifetime of a [`ListenerGuard`]; dropping
/// the guard unregisters, including from inside a dispatch.
#[derive(Clone, Default)]
pub struct Window {
    listeners: Rc<RefCell<Listeners>>,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("pointer_listeners", &self.pointer_listener_count())
            .finish()
    }
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pointer_listener(&self, listener: impl FnMut(ScreenPos) + 'static) -> ListenerGuard {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Box::new(listener)));
        ListenerGuard {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn pointer_listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Delivers a pointer move to every registered listener in registration order.
    pub fn dispatch_pointer_move(&self, pos: ScreenPos) {
        let mut taken = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.dispatching = true;
            std::mem::take(&mut listeners.entries)
        };

        for (_, listener) in taken.iter_mut() {
            listener(pos);
        }

        let mut listeners = self.listeners.borrow_mut();
        listeners.dispatching = false;
        let removed = std::mem::take(&mut listeners.removed);
        taken.retain(|(id, _)| !removed.contains(id));
        taken.append(&mut listeners.entries);
        listeners.entries = taken;
    }
}

/// Registration of one pointer listener. Unregisters on drop.
#[must_use = "dropping the guard immediately unregisters the listener"]
pub struct ListenerGuard {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut listeners = listeners.borrow_mut();
        if listeners.dispatching {
            listeners.removed.push(self.id);
        }
        let id = self.id;
        listeners.entries.retain(|(entry, _)| *entry != id);
    }
}
