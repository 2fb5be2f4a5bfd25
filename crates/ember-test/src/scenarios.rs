//! End-to-end scenarios across entities, events and dispatch

use std::rc::Rc;

use ember_core::{Context, EventKind, ExtendedType, Reactor, Transport, Type};
use ember_engine::{DispatchConfig, DispatchError, Event, Handler, Key, NoopObserver};

use crate::{
    init_tracing, CallLog, FailingHandler, HandlerTree, Observed, RecordingHandler,
    RecordingObserver, ReentrantHandler, Reentry, Topology, TreeConfig,
};

const TRACE_ID: Key<u64> = Key::new("app.trace_id");

fn shared(handler: impl Handler + 'static) -> Rc<dyn Handler> {
    Rc::new(handler)
}

#[test]
fn test_receiver_flow_reaches_every_entity() {
    init_tracing();
    let t = Topology::new();
    let event = Event::of(Type::LinkFlow, &t.receiver);

    assert_eq!(event.event_type(), Type::LinkFlow);
    assert_eq!(event.link(), Some(t.receiver.clone()));
    assert_eq!(event.receiver(), Some(t.receiver.clone()));
    assert_eq!(event.sender(), None);
    assert_eq!(event.session(), Some(t.session.clone()));
    assert_eq!(event.connection(), Some(t.connection.clone()));
    assert_eq!(event.reactor(), Some(t.reactor.clone()));
    assert_eq!(event.delivery(), None);
    assert_eq!(event.transport(), None);
}

#[test]
fn test_delivery_chain_and_breaks() {
    let t = Topology::new();
    let event = Event::of(Type::Delivery, &t.delivery);
    assert_eq!(event.connection(), Some(t.connection.clone()));
    assert_eq!(event.reactor(), Some(t.reactor.clone()));

    t.delivery.settle();
    assert_eq!(event.delivery(), Some(t.delivery.clone()));
    assert_eq!(event.link(), None);
    assert_eq!(event.session(), None);
    assert_eq!(event.connection(), None);
    assert_eq!(event.reactor(), None);

    let flow = Event::of(Type::LinkFlow, &t.sender);
    t.sender.detach();
    assert_eq!(flow.sender(), Some(t.sender.clone()));
    assert_eq!(flow.session(), None);
    assert_eq!(flow.reactor(), None);
}

#[test]
fn test_transport_follows_binding() {
    let reactor = Reactor::new("bind");
    let connection = reactor.connection("peer");
    let transport = Transport::new();
    let event = Event::of(Type::TransportError, &transport);

    assert_eq!(event.connection(), None);
    assert_eq!(event.reactor(), None);

    transport.bind(&connection).unwrap();
    assert_eq!(event.connection(), Some(connection.clone()));
    assert_eq!(event.reactor(), Some(reactor));
    assert_eq!(
        Event::of(Type::ConnectionBound, &connection).transport(),
        Some(transport.clone())
    );

    transport.unbind();
    assert_eq!(event.connection(), None);
    assert_eq!(Event::of(Type::ConnectionUnbound, &connection).transport(), None);
}

#[test]
fn test_every_topology_context_resolves_itself() {
    let t = Topology::new();
    for context in t.contexts() {
        let event = Event::of(Type::NonCoreEvent, context.clone());
        let resolved: Option<Context> = match &context {
            Context::Connection(_) => event.connection().map(Context::from),
            Context::Session(_) => event.session().map(Context::from),
            Context::Link(_) => event.link().map(Context::from),
            Context::Delivery(_) => event.delivery().map(Context::from),
            Context::Transport(_) => event.transport().map(Context::from),
            Context::Reactor(_) => event.reactor().map(Context::from),
            Context::Task(_) => event.task().map(Context::from),
            Context::Selectable(_) => event.selectable().map(Context::from),
        };
        assert_eq!(resolved.as_ref(), Some(&context), "context {context}");
    }
}

#[test]
fn test_duplicate_survives_reuse_of_the_original() {
    let t = Topology::new();
    let mut event = Event::of(Type::Delivery, &t.delivery);
    event.attachments_mut().set(&TRACE_ID, 7);

    let copy = event.duplicate();
    event.reset();
    event.initialize(Type::SessionInit, Some(t.session.clone().into()));

    assert_eq!(copy.event_type(), Type::Delivery);
    assert_eq!(copy.delivery(), Some(t.delivery.clone()));
    assert_eq!(copy.attachments().get(&TRACE_ID).as_deref(), Some(&7));
    assert!(event.attachments().get(&TRACE_ID).is_none());
}

#[test]
fn test_tree_dispatch_visits_in_preorder() {
    init_tracing();
    let tree = HandlerTree::build(&TreeConfig::standard());
    let t = Topology::new();
    let mut event = Event::of(Type::LinkFlow, &t.receiver);

    event.dispatch(&tree.root).unwrap();

    assert_eq!(tree.log.labels(), tree.expected);
    assert_eq!(event.nesting(), 0);
    let depths: Vec<usize> = tree.log.calls().iter().map(|call| call.nesting).collect();
    assert_eq!(depths[..4], [1, 2, 3, 4]);
}

#[test]
fn test_redispatch_translates_and_restores() {
    let log = CallLog::new();
    let target = shared(RecordingHandler::new("target", &log));
    let translator = shared(ReentrantHandler::new(
        "translator",
        &log,
        Rc::clone(&target),
        Reentry::Redispatch(Type::Delivery.into()),
    ));
    let t = Topology::new();
    let mut event = Event::of(Type::LinkFlow, &t.receiver);

    event.dispatch(&translator).unwrap();

    let calls = log.calls();
    assert_eq!(calls[0].kind, Some(Type::LinkFlow.into()));
    assert_eq!(calls[0].nesting, 1);
    assert_eq!(calls[1].label, "target");
    assert_eq!(calls[1].kind, Some(Type::Delivery.into()));
    assert_eq!(calls[1].nesting, 3);
    assert_eq!(event.event_type(), Type::LinkFlow);
    assert_eq!(event.nesting(), 0);
}

#[test]
fn test_redispatch_restores_after_failure() {
    let failing = shared(FailingHandler::unexpected("socket closed"));
    let tick = ExtendedType::new("APP_TICK");
    let mut event = Event::of(Type::ReactorQuiesced, Reactor::new("r"));

    let err = event.redispatch(tick, &failing).unwrap_err();

    assert!(err.is_wrapped());
    assert_eq!(err.kind(), Some(EventKind::Extended(tick)));
    assert_eq!(event.event_type(), Type::ReactorQuiesced);
    assert_eq!(event.nesting(), 0);
}

#[test]
fn test_invalid_redispatch_never_reaches_handler() {
    let log = CallLog::new();
    let target = Rc::new(RecordingHandler::new("target", &log));
    let as_handler: Rc<dyn Handler> = target.clone();
    let mut event = Event::of(Type::LinkFlow, &Topology::new().sender);

    for kind in [EventKind::from(Type::NonCoreEvent), ExtendedType::new("").into()] {
        let err = event.redispatch(kind, &as_handler).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRedispatchKind { .. }));
    }

    assert_eq!(target.calls(), 0);
    assert!(log.is_empty());
    assert_eq!(event.event_type(), Type::LinkFlow);
    assert_eq!(event.nesting(), 0);
}

#[test]
fn test_nested_invalid_redispatch_names_the_handler() {
    let log = CallLog::new();
    let target = Rc::new(RecordingHandler::new("target", &log));
    let translator = shared(ReentrantHandler::new(
        "translator",
        &log,
        target.clone(),
        Reentry::Redispatch(Type::NonCoreEvent.into()),
    ));
    let mut event = Event::of(Type::LinkFlow, &Topology::new().receiver);

    let err = event.dispatch(&translator).unwrap_err();

    assert!(err.is_wrapped());
    assert!(err
        .handler()
        .is_some_and(|handler| handler.name().ends_with("ReentrantHandler")));
    assert_eq!(err.kind(), Some(Type::LinkFlow.into()));
    match &err {
        DispatchError::WrappedHandlerFailure { cause, .. } => assert!(matches!(
            cause.downcast_ref::<DispatchError>(),
            Some(DispatchError::InvalidRedispatchKind { .. })
        )),
        other => panic!("expected wrapped failure, got {other}"),
    }
    assert_eq!(target.calls(), 0);
    assert_eq!(log.labels(), vec!["translator"]);
    assert_eq!(event.event_type(), Type::LinkFlow);
    assert_eq!(event.nesting(), 0);
}

#[test]
fn test_failures_keep_their_shape() {
    let structured = shared(FailingHandler::structured("no credit"));
    let unexpected = shared(FailingHandler::unexpected("disk full"));
    let mut event = Event::of(Type::LinkFlow, &Topology::new().receiver);

    match event.dispatch(&structured).unwrap_err() {
        DispatchError::HandlerFailure { reason, kind, .. } => {
            assert_eq!(reason, "no credit");
            assert_eq!(kind, Some(Type::LinkFlow.into()));
        }
        other => panic!("expected structured failure, got {other}"),
    }

    match event.dispatch(&unexpected).unwrap_err() {
        DispatchError::WrappedHandlerFailure { cause, handler, .. } => {
            assert_eq!(cause.to_string(), "disk full");
            assert!(handler.name().ends_with("FailingHandler"));
        }
        other => panic!("expected wrapped failure, got {other}"),
    }
    assert_eq!(event.nesting(), 0);
}

#[test]
fn test_nested_failure_is_not_wrapped_twice() {
    let log = CallLog::new();
    let failing = shared(FailingHandler::unexpected("deep"));
    let outer = shared(ReentrantHandler::new(
        "outer",
        &log,
        failing,
        Reentry::Dispatch,
    ));
    let mut event = Event::of(Type::ConnectionRemoteOpen, &Topology::new().connection);

    let err = event.dispatch(&outer).unwrap_err();

    let handler = err.handler().unwrap();
    assert!(handler.name().ends_with("FailingHandler"));
    assert!(err.is_wrapped());
    assert_eq!(event.nesting(), 0);
}

#[test]
fn test_failure_stops_remaining_siblings() {
    let log = CallLog::new();
    let after = Rc::new(RecordingHandler::new("after", &log));
    let root = shared(
        RecordingHandler::new("root", &log)
            .with_child(shared(RecordingHandler::new("before", &log)))
            .with_child(shared(FailingHandler::structured("halt")))
            .with_child(after.clone()),
    );
    let mut event = Event::of(Type::SessionRemoteOpen, &Topology::new().session);

    assert!(event.dispatch(&root).is_err());
    assert_eq!(log.labels(), vec!["root", "before"]);
    assert_eq!(after.calls(), 0);

    // the record is reusable after a failed dispatch
    let mut next = Event::new();
    next.initialize(Type::ReactorFinal, None);
    next.dispatch(&(after.clone() as Rc<dyn Handler>)).unwrap();
    assert_eq!(after.calls(), 1);
}

#[test]
fn test_root_handler_attachment_drives_dispatch() {
    let log = CallLog::new();
    let t = Topology::new();
    let mut event = Event::of(Type::TimerTask, &t.task);
    event.set_root_handler(shared(RecordingHandler::new("app", &log)));

    if let Some(root) = event.root_handler() {
        event.dispatch(&root).unwrap();
    }
    assert_eq!(log.labels(), vec!["app"]);
    assert_eq!(event.task(), Some(t.task.clone()));
}

#[test]
fn test_observer_sees_routing() {
    let observer = Rc::new(RecordingObserver::new());
    let log = CallLog::new();
    let root = shared(
        RecordingHandler::passive("root", &log).with_child(shared(RecordingHandler::new("leaf", &log))),
    );
    let mut event =
        Event::of(Type::SelectableReadable, &Topology::new().selectable).with_observer(observer.clone());

    event.dispatch(&root).unwrap();

    let observed = observer.observed();
    assert_eq!(observed.len(), 2);
    assert!(matches!(observed[0], Observed::Delegated { nesting: 1, .. }));
    assert!(matches!(observed[1], Observed::Unhandled { nesting: 2, .. }));
    assert_eq!(observer.unhandled_count(), 1);
}

#[test]
fn test_observer_sees_wrapped_failure() {
    let observer = Rc::new(RecordingObserver::new());
    let failing = shared(FailingHandler::unexpected("refused"));
    let mut event = Event::of(Type::TransportError, Transport::new()).with_observer(observer.clone());

    let _ = event.dispatch(&failing);

    assert!(matches!(
        observer.observed().as_slice(),
        [Observed::HandlerFailed { message, .. }] if message == "refused"
    ));
}

#[test]
fn test_quiet_and_noop_do_not_change_routing() {
    let tree = HandlerTree::build(&TreeConfig::default());
    let mut event = Event::of(Type::ReactorInit, Reactor::new("q"))
        .with_config(DispatchConfig::quiet())
        .with_observer(Rc::new(NoopObserver));

    event.dispatch(&tree.root).unwrap();
    assert_eq!(tree.log.labels(), tree.expected);
}
