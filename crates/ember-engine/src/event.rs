//! Event record
//!
//! An event names what changed (its kind) and where (its context), and
//! carries an attachment record for extension data. Records are meant to be
//! reused: a driver calls [`Event::initialize`] for each notification and
//! [`Event::reset`] when the record goes back to its pool.

use std::fmt;
use std::rc::Rc;

use ember_core::{
    Connection, Context, Delivery, EventKind, Link, Reactor, Selectable, Session, Task, Transport,
    Type,
};

use crate::error::kind_label;
use crate::{
    Attachments, Diagnostic, DispatchConfig, DispatchError, DispatchObserver, Handler, HandlerRef,
    Key, TracingObserver,
};

/// Attachment slot holding the root of the handler tree for an event
pub const ROOT_HANDLER: Key<Rc<dyn Handler>> = Key::new("ember.root_handler");

/// Notification routed through a handler tree
pub struct Event {
    pub(crate) kind: Option<EventKind>,
    context: Option<Context>,
    attachments: Attachments,
    pub(crate) nesting: usize,
    pub(crate) delegated: Option<Rc<dyn Handler>>,
    config: DispatchConfig,
    observer: Rc<dyn DispatchObserver>,
}

impl Event {
    /// Create an empty record reporting to `tracing`
    pub fn new() -> Self {
        Event {
            kind: None,
            context: None,
            attachments: Attachments::new(),
            nesting: 0,
            delegated: None,
            config: DispatchConfig::default(),
            observer: Rc::new(TracingObserver::new()),
        }
    }

    /// Create a record already initialized for `kind` on `context`
    pub fn of(kind: impl Into<EventKind>, context: impl Into<Context>) -> Self {
        let mut event = Event::new();
        event.initialize(kind, Some(context.into()));
        event
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_observer(mut self, observer: Rc<dyn DispatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Assign kind and context, dropping all attachments
    pub fn initialize(&mut self, kind: impl Into<EventKind>, context: Option<Context>) {
        self.kind = Some(kind.into());
        self.context = context;
        self.attachments.clear();
    }

    /// Return to the empty state
    pub fn reset(&mut self) {
        self.kind = None;
        self.context = None;
        self.attachments.clear();
        self.nesting = 0;
    }

    /// Independent copy with the same kind, context and an attachment snapshot
    ///
    /// The copy shares configuration and observer but starts outside any
    /// dispatch.
    pub fn duplicate(&self) -> Event {
        Event {
            kind: self.kind,
            context: self.context.clone(),
            attachments: self.attachments.snapshot(),
            nesting: 0,
            delegated: None,
            config: self.config.clone(),
            observer: Rc::clone(&self.observer),
        }
    }

    /// Raw kind, `None` until initialized
    pub fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    /// Core type, or [`Type::NonCoreEvent`] for anything else
    pub fn event_type(&self) -> Type {
        self.kind.map_or(Type::NonCoreEvent, EventKind::core_type)
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }

    /// Depth of dispatch calls currently active on this record
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn root_handler(&self) -> Option<Rc<dyn Handler>> {
        self.attachments
            .get(&ROOT_HANDLER)
            .map(|handler| Rc::clone(&*handler))
    }

    pub fn set_root_handler(&mut self, handler: Rc<dyn Handler>) {
        self.attachments.set(&ROOT_HANDLER, handler);
    }

    /// Build a structured failure for `handler` against the current kind
    ///
    /// Returned from [`Handler::handle`] (via `?` or `.into()`), it reaches
    /// the caller of `dispatch` unchanged.
    pub fn failure<H: Handler + ?Sized>(
        &self,
        handler: &H,
        reason: impl Into<String>,
    ) -> DispatchError {
        DispatchError::HandlerFailure {
            kind: self.kind,
            handler: HandlerRef::of(handler),
            reason: reason.into(),
        }
    }

    pub(crate) fn observe(&self, diagnostic: &Diagnostic<'_>) {
        self.observer.observe(diagnostic);
    }

    // =========================================================================
    // Relationship queries
    // =========================================================================

    pub fn connection(&self) -> Option<Connection> {
        self.context.as_ref().and_then(Context::connection)
    }

    pub fn session(&self) -> Option<Session> {
        self.context.as_ref().and_then(Context::session)
    }

    pub fn link(&self) -> Option<Link> {
        self.context.as_ref().and_then(Context::link)
    }

    pub fn sender(&self) -> Option<Link> {
        self.context.as_ref().and_then(Context::sender)
    }

    pub fn receiver(&self) -> Option<Link> {
        self.context.as_ref().and_then(Context::receiver)
    }

    pub fn delivery(&self) -> Option<Delivery> {
        self.context.as_ref().and_then(Context::delivery)
    }

    pub fn transport(&self) -> Option<Transport> {
        self.context.as_ref().and_then(Context::transport)
    }

    pub fn reactor(&self) -> Option<Reactor> {
        self.context.as_ref().and_then(Context::reactor)
    }

    pub fn task(&self) -> Option<Task> {
        self.context.as_ref().and_then(Context::task)
    }

    pub fn selectable(&self) -> Option<Selectable> {
        self.context.as_ref().and_then(Context::selectable)
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event{{type={}, context=", kind_label(&self.kind))?;
        match &self.context {
            Some(context) => write!(f, "{}}}", context),
            None => f.write_str("<none>}"),
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("context", &self.context)
            .field("attachments", &self.attachments)
            .field("nesting", &self.nesting)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
