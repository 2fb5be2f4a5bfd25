//! Property tests over generated handler trees

use std::rc::Rc;

use ember_core::{ExtendedType, Type};
use ember_engine::{DispatchConfig, Event, Handler, NoopObserver};
use proptest::prelude::*;

use crate::{CallLog, FailingHandler, HandlerTree, RecordingHandler, TreeConfig, Topology};

fn tree_config() -> impl Strategy<Value = TreeConfig> {
    (0usize..4, 1usize..4, any::<bool>()).prop_map(|(depth, fanout, passive_leaves)| TreeConfig {
        depth,
        fanout,
        passive_leaves,
    })
}

fn quiet_event(kind: Type) -> Event {
    let t = Topology::new();
    Event::of(kind, &t.delivery)
        .with_config(DispatchConfig::quiet())
        .with_observer(Rc::new(NoopObserver))
}

proptest! {
    #[test]
    fn prop_every_handler_visited_once_in_preorder(config in tree_config()) {
        let tree = HandlerTree::build(&config);
        let mut event = quiet_event(Type::Delivery);

        event.dispatch(&tree.root).unwrap();

        prop_assert_eq!(tree.log.labels(), tree.expected.clone());
        prop_assert_eq!(tree.log.len(), config.node_count());
        prop_assert_eq!(event.nesting(), 0);
    }

    #[test]
    fn prop_nesting_matches_tree_depth(config in tree_config()) {
        let tree = HandlerTree::build(&config);
        let mut event = quiet_event(Type::LinkFlow);

        event.dispatch(&tree.root).unwrap();

        for call in tree.log.calls() {
            let depth = call.label.matches('.').count();
            prop_assert_eq!(call.nesting, depth + 1);
        }
    }

    #[test]
    fn prop_failure_restores_record(
        config in tree_config(),
        position in 0usize..8,
    ) {
        let log = CallLog::new();
        let root = RecordingHandler::new("root", &log);
        let children = config.fanout.max(1);
        let slot = position % (children + 1);
        let mut subtrees = Vec::with_capacity(children);
        for i in 0..=children {
            if i == slot {
                root.add(Rc::new(FailingHandler::unexpected("boom")));
            } else {
                let subtree = HandlerTree::build(&config);
                root.add(Rc::clone(&subtree.root));
                subtrees.push(subtree);
            }
        }
        let root: Rc<dyn Handler> = Rc::new(root);
        let mut event = quiet_event(Type::Delivery);

        let err = event.dispatch(&root).unwrap_err();

        prop_assert!(err.is_wrapped());
        prop_assert_eq!(event.nesting(), 0);
        prop_assert_eq!(event.event_type(), Type::Delivery);
        let called: Vec<usize> = subtrees.iter().map(|subtree| subtree.log.len()).collect();
        let mut expected = vec![config.node_count(); slot];
        expected.resize(children, 0);
        prop_assert_eq!(called, expected);
    }

    #[test]
    fn prop_redispatch_restores_kind(
        index in 0usize..Type::ALL.len(),
        extended in any::<bool>(),
    ) {
        let original = Type::ALL[index];
        let log = CallLog::new();
        let target: Rc<dyn Handler> = Rc::new(RecordingHandler::new("target", &log));
        let mut event = quiet_event(original);

        if extended {
            event.redispatch(ExtendedType::new("APP_RETRY"), &target).unwrap();
        } else {
            event.redispatch(Type::ALL[(index + 1) % Type::ALL.len()], &target).unwrap();
        }

        prop_assert_eq!(log.len(), 1);
        prop_assert_eq!(log.calls()[0].nesting, 2);
        prop_assert_eq!(event.event_type(), original);
        prop_assert_eq!(event.nesting(), 0);
    }

    #[test]
    fn prop_leaf_called_exactly_once(repeats in 1usize..5) {
        let log = CallLog::new();
        let leaf = Rc::new(RecordingHandler::new("leaf", &log));
        let handler: Rc<dyn Handler> = leaf.clone();
        let mut event = quiet_event(Type::LinkFinal);

        for _ in 0..repeats {
            event.dispatch(&handler).unwrap();
        }

        prop_assert_eq!(leaf.calls(), repeats);
        prop_assert_eq!(event.nesting(), 0);
    }
}
