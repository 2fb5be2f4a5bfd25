//! Generated handler trees
//!
//! Builds uniform trees of [`RecordingHandler`]s whose labels encode their
//! position (`"0"`, `"0.1"`, `"0.1.2"`), together with the pre-order in which
//! dispatch must visit them.

use std::rc::Rc;

use ember_engine::Handler;

use crate::{CallLog, RecordingHandler};

/// Handler tree shape
#[derive(Clone, Debug)]
pub struct TreeConfig {
    /// Levels below the root
    pub depth: usize,
    /// Children per handler
    pub fanout: usize,
    /// Leaves count events as unhandled instead of acting on them
    pub passive_leaves: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            depth: 2,
            fanout: 2,
            passive_leaves: false,
        }
    }
}

impl TreeConfig {
    /// A root with a single child
    pub fn minimal() -> Self {
        TreeConfig {
            depth: 1,
            fanout: 1,
            passive_leaves: false,
        }
    }

    /// Typical application tree
    pub fn standard() -> Self {
        TreeConfig {
            depth: 3,
            fanout: 3,
            passive_leaves: true,
        }
    }

    /// Deep and wide, for benchmarks
    pub fn stress() -> Self {
        TreeConfig {
            depth: 6,
            fanout: 4,
            passive_leaves: true,
        }
    }

    /// Handlers in a tree of this shape
    pub fn node_count(&self) -> usize {
        (0..=self.depth).map(|level| self.fanout.pow(level as u32)).sum()
    }
}

/// A built tree and the order dispatch must visit it in
pub struct HandlerTree {
    pub root: Rc<dyn Handler>,
    pub expected: Vec<String>,
    pub log: CallLog,
}

impl HandlerTree {
    pub fn build(config: &TreeConfig) -> Self {
        let log = CallLog::new();
        let mut expected = Vec::with_capacity(config.node_count());
        let root = Self::node("0".to_string(), config.depth, config, &log, &mut expected);
        HandlerTree {
            root,
            expected,
            log,
        }
    }

    pub fn len(&self) -> usize {
        self.expected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    fn node(
        label: String,
        remaining: usize,
        config: &TreeConfig,
        log: &CallLog,
        expected: &mut Vec<String>,
    ) -> Rc<dyn Handler> {
        expected.push(label.clone());
        let handler = if remaining == 0 && config.passive_leaves {
            RecordingHandler::passive(label.clone(), log)
        } else {
            RecordingHandler::new(label.clone(), log)
        };
        if remaining > 0 {
            for i in 0..config.fanout {
                let child = Self::node(format!("{label}.{i}"), remaining - 1, config, log, expected);
                handler.add(child);
            }
        }
        Rc::new(handler)
    }
}
