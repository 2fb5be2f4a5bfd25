//! Instrumented handlers and observers

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ember_core::EventKind;
use ember_engine::{Children, Diagnostic, DispatchObserver, Event, Handler, HandlerRef};

/// Install a `tracing` subscriber honouring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
/// Run with: `RUST_LOG=ember::dispatch=debug cargo test -- --nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ============================================================================
// CALL LOG
// ============================================================================

/// One `handle` invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub label: String,
    pub kind: Option<EventKind>,
    pub nesting: usize,
}

/// Shared, ordered record of handler invocations
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        CallLog::default()
    }

    pub fn record(&self, label: &str, event: &Event) {
        self.0.borrow_mut().push(Call {
            label: label.to_string(),
            kind: event.kind(),
            nesting: event.nesting(),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.borrow().iter().map(|call| call.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

// ============================================================================
// RECORDING HANDLER
// ============================================================================

/// Handler that logs every event it receives
///
/// An acting handler leaves its unhandled counter alone; a passive one bumps
/// it for every event.
pub struct RecordingHandler {
    label: String,
    log: CallLog,
    acts: bool,
    calls: Cell<usize>,
    unhandled: Cell<u64>,
    children: RefCell<Vec<Rc<dyn Handler>>>,
}

impl RecordingHandler {
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        RecordingHandler {
            label: label.into(),
            log: log.clone(),
            acts: true,
            calls: Cell::new(0),
            unhandled: Cell::new(0),
            children: RefCell::new(Vec::new()),
        }
    }

    pub fn passive(label: impl Into<String>, log: &CallLog) -> Self {
        RecordingHandler {
            acts: false,
            ..Self::new(label, log)
        }
    }

    pub fn with_child(self, child: Rc<dyn Handler>) -> Self {
        self.children.borrow_mut().push(child);
        self
    }

    pub fn add(&self, child: Rc<dyn Handler>) {
        self.children.borrow_mut().push(child);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of `handle` invocations
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Handler for RecordingHandler {
    fn handle(&self, event: &mut Event) -> anyhow::Result<()> {
        self.calls.set(self.calls.get() + 1);
        self.log.record(&self.label, event);
        if !self.acts {
            self.unhandled.set(self.unhandled.get() + 1);
        }
        Ok(())
    }

    fn unhandled(&self) -> u64 {
        self.unhandled.get()
    }

    fn children(&self) -> Children<'_> {
        let children = self.children.borrow().clone();
        Box::new(children.into_iter())
    }
}

// ============================================================================
// FAILING HANDLER
// ============================================================================

/// How a [`FailingHandler`] fails
#[derive(Clone, Debug)]
pub enum Failure {
    /// Return a structured `DispatchError::HandlerFailure`
    Structured(String),
    /// Return a plain error the engine has to wrap
    Unexpected(String),
}

pub struct FailingHandler {
    failure: Failure,
    calls: Cell<usize>,
}

impl FailingHandler {
    pub fn structured(reason: impl Into<String>) -> Self {
        FailingHandler {
            failure: Failure::Structured(reason.into()),
            calls: Cell::new(0),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        FailingHandler {
            failure: Failure::Unexpected(message.into()),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Handler for FailingHandler {
    fn handle(&self, event: &mut Event) -> anyhow::Result<()> {
        self.calls.set(self.calls.get() + 1);
        match &self.failure {
            Failure::Structured(reason) => Err(event.failure(self, reason.clone()).into()),
            Failure::Unexpected(message) => Err(anyhow::anyhow!(message.clone())),
        }
    }

    fn unhandled(&self) -> u64 {
        0
    }
}

// ============================================================================
// RE-ENTRANT HANDLER
// ============================================================================

/// What a [`ReentrantHandler`] does with the event it receives
#[derive(Clone, Copy, Debug)]
pub enum Reentry {
    /// Dispatch the nested handler on the same record
    Dispatch,
    /// Redispatch the same record under another kind
    Redispatch(EventKind),
}

/// Handler that routes the event it is handling to another handler
pub struct ReentrantHandler {
    label: String,
    log: CallLog,
    nested: Rc<dyn Handler>,
    reentry: Reentry,
    children: Vec<Rc<dyn Handler>>,
}

impl ReentrantHandler {
    pub fn new(
        label: impl Into<String>,
        log: &CallLog,
        nested: Rc<dyn Handler>,
        reentry: Reentry,
    ) -> Self {
        ReentrantHandler {
            label: label.into(),
            log: log.clone(),
            nested,
            reentry,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Rc<dyn Handler>) -> Self {
        self.children.push(child);
        self
    }
}

impl Handler for ReentrantHandler {
    fn handle(&self, event: &mut Event) -> anyhow::Result<()> {
        self.log.record(&self.label, event);
        match self.reentry {
            Reentry::Dispatch => event.dispatch(&self.nested)?,
            Reentry::Redispatch(kind) => event.redispatch(kind, &self.nested)?,
        }
        Ok(())
    }

    fn unhandled(&self) -> u64 {
        0
    }

    fn children(&self) -> Children<'_> {
        Box::new(self.children.iter().cloned())
    }
}

// ============================================================================
// RECORDING OBSERVER
// ============================================================================

/// Owned copy of a [`Diagnostic`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observed {
    Unhandled {
        kind: Option<EventKind>,
        handler: HandlerRef,
        nesting: usize,
    },
    Delegated {
        parent: HandlerRef,
        child: HandlerRef,
        nesting: usize,
    },
    Redispatched {
        kind: EventKind,
        previous: Option<EventKind>,
        nesting: usize,
    },
    HandlerFailed {
        handler: HandlerRef,
        message: String,
    },
}

/// Observer that keeps every diagnostic it sees
#[derive(Default)]
pub struct RecordingObserver {
    seen: RefCell<Vec<Observed>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        RecordingObserver::default()
    }

    pub fn observed(&self) -> Vec<Observed> {
        self.seen.borrow().clone()
    }

    pub fn unhandled_count(&self) -> usize {
        self.seen
            .borrow()
            .iter()
            .filter(|observed| matches!(observed, Observed::Unhandled { .. }))
            .count()
    }
}

impl DispatchObserver for RecordingObserver {
    fn observe(&self, diagnostic: &Diagnostic<'_>) {
        let observed = match diagnostic {
            Diagnostic::Unhandled {
                kind,
                handler,
                nesting,
                ..
            } => Observed::Unhandled {
                kind: *kind,
                handler: *handler,
                nesting: *nesting,
            },
            Diagnostic::Delegated {
                parent,
                child,
                nesting,
                ..
            } => Observed::Delegated {
                parent: *parent,
                child: *child,
                nesting: *nesting,
            },
            Diagnostic::Redispatched {
                kind,
                previous,
                nesting,
                ..
            } => Observed::Redispatched {
                kind: *kind,
                previous: *previous,
                nesting: *nesting,
            },
            Diagnostic::HandlerFailed { handler, cause, .. } => Observed::HandlerFailed {
                handler: *handler,
                message: cause.to_string(),
            },
        };
        self.seen.borrow_mut().push(observed);
    }
}
