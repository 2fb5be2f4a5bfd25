//! Handler tree
//!
//! A handler reacts to an event and exposes an ordered list of children the
//! engine forwards the event to afterwards. Handlers are shared (`Rc`) and
//! take `&self`; handlers that keep state use interior mutability, which is
//! sound because dispatch is single-threaded.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::Event;

/// Ordered child sequence; call [`Handler::children`] again to restart it
pub type Children<'a> = Box<dyn Iterator<Item = Rc<dyn Handler>> + 'a>;

pub trait Handler {
    /// React to an event
    ///
    /// Return a [`DispatchError`](crate::DispatchError) (converted into
    /// `anyhow::Error`) to fail with a structured error; any other error is
    /// wrapped by the engine.
    fn handle(&self, event: &mut Event) -> anyhow::Result<()>;

    /// Number of events this handler received but did not act on
    fn unhandled(&self) -> u64;

    fn children(&self) -> Children<'_> {
        Box::new(std::iter::empty())
    }

    /// Name used in diagnostics and errors
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Whether two handles point at the same handler instance
#[inline]
pub fn same_handler(a: &Rc<dyn Handler>, b: &Rc<dyn Handler>) -> bool {
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// Fan-out node of a handler tree
///
/// Acts on nothing itself: every event it receives is counted as unhandled
/// and then forwarded to its children in insertion order.
#[derive(Default)]
pub struct BaseHandler {
    children: RefCell<Vec<Rc<dyn Handler>>>,
    unhandled: Cell<u64>,
}

impl BaseHandler {
    pub fn new() -> Self {
        BaseHandler::default()
    }

    pub fn with_children(children: impl IntoIterator<Item = Rc<dyn Handler>>) -> Self {
        let handler = BaseHandler::new();
        for child in children {
            handler.add(child);
        }
        handler
    }

    /// Append a child
    ///
    /// Returns `false` if this instance is already a child.
    pub fn add(&self, child: Rc<dyn Handler>) -> bool {
        let mut children = self.children.borrow_mut();
        if children.iter().any(|existing| same_handler(existing, &child)) {
            return false;
        }
        children.push(child);
        true
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    pub fn mark_unhandled(&self) {
        self.unhandled.set(self.unhandled.get() + 1);
    }
}

impl Handler for BaseHandler {
    fn handle(&self, _event: &mut Event) -> anyhow::Result<()> {
        self.mark_unhandled();
        Ok(())
    }

    fn unhandled(&self) -> u64 {
        self.unhandled.get()
    }

    fn children(&self) -> Children<'_> {
        // snapshot, so children may be added while the event is in flight
        let children = self.children.borrow().clone();
        Box::new(children.into_iter())
    }
}
