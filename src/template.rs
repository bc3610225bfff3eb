//! List rendering through named templates.
//!
//! The `template` category maps a template name to a [`Value::Nodes`] list.
//! For every node in the list the named prototype is deep-cloned, scanned for
//! marked targets, bound to that node, and appended to the receiving target.
//! Whatever a previous invocation rendered into the same target is unbound and
//! discarded first.

use std::{cell::RefCell, rc::Rc};

use rustc_hash::FxHashMap;
use vmbind_reactive::{ObservableNode, Value};

use crate::{
    binder::Binder,
    error::ProcessError,
    processor::{ProcessCx, Processor},
    scanner::Scanner,
    target::Mount,
    visitor::{PreOrderVisitor, StackVisitor, Visitor},
};

struct Rendered<T: Mount> {
    binder: Rc<Binder<T>>,
    node: ObservableNode,
    target: T,
}

impl<T: Mount> Rendered<T> {
    fn discard(self) {
        self.binder.unwatch(&self.node);
        self.target.detach();
    }
}

#[derive(educe::Educe)]
#[educe(Debug)]
pub struct TemplateProcessor<T: Mount, V = StackVisitor> {
    scanner: Scanner<V>,
    templates: RefCell<FxHashMap<String, T>>,
    #[educe(Debug(ignore))]
    rendered: RefCell<FxHashMap<T, Vec<Rendered<T>>>>,
}

impl<T: Mount> TemplateProcessor<T> {
    pub fn new() -> Self {
        Self::with_scanner(Scanner::new())
    }
}

impl<T: Mount> Default for TemplateProcessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Mount, V> TemplateProcessor<T, V> {
    pub fn with_scanner(scanner: Scanner<V>) -> Self {
        Self {
            scanner,
            templates: RefCell::new(FxHashMap::default()),
            rendered: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn template(self, name: impl Into<String>, prototype: T) -> Self {
        self.add_template(name, prototype);
        self
    }

    /// Registers `prototype` under `name`, replacing an earlier one. The
    /// prototype is only ever cloned, never mounted itself.
    pub fn add_template(&self, name: impl Into<String>, prototype: T) {
        self.templates.borrow_mut().insert(name.into(), prototype);
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.borrow().contains_key(name)
    }

    /// Number of list items currently rendered into `target`.
    pub fn rendered_len(&self, target: &T) -> usize {
        self.rendered.borrow().get(target).map_or(0, Vec::len)
    }

    /// Unbinds and discards everything rendered into `target`, including
    /// lists rendered inside the discarded items.
    pub fn clear(&self, target: &T) {
        let previous = self.rendered.borrow_mut().remove(target);
        for item in previous.into_iter().flatten() {
            self.clear_within(&item.target);
            item.discard();
        }
    }

    /// Clears every target at or below `root` that holds a rendered list.
    fn clear_within(&self, root: &T) {
        let mut nested = Vec::new();
        {
            let rendered = self.rendered.borrow();
            if rendered.is_empty() {
                return;
            }
            if rendered.contains_key(root) {
                nested.push(root.clone());
            }
            PreOrderVisitor.visit(root, &mut |target: &T| {
                if rendered.contains_key(target) {
                    nested.push(target.clone());
                }
            });
        }
        for target in nested {
            self.clear(&target);
        }
    }
}

impl<T: Mount, V: Visitor<T>> Processor<T> for TemplateProcessor<T, V> {
    fn process(&self, cx: &ProcessCx<'_, T>, key: &str, value: &Value) -> Result<(), ProcessError> {
        let nodes = value
            .as_nodes()
            .ok_or_else(|| ProcessError::UnexpectedValue {
                key: key.to_string(),
                expected: "node list",
                found: value.kind(),
            })?;
        let prototype = self
            .templates
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| ProcessError::UnknownTemplate(key.to_string()))?;

        self.clear(cx.target);
        cx.target.clear_children();

        let mut rendered = Vec::with_capacity(nodes.len());
        let mut result = Ok(());
        for node in nodes {
            let target = prototype.deep_clone();
            let binder = self.scanner.scan(&target);
            binder.set_processors(cx.processors.clone());
            cx.target.append_child(&target);
            let watched = binder.watch(node);
            rendered.push(Rendered {
                binder,
                node: node.clone(),
                target,
            });
            if let Err(err) = watched {
                result = Err(ProcessError::Nested(Box::new(err)));
                break;
            }
        }
        tracing::debug!(template = key, items = rendered.len(), "list rendered");
        self.rendered
            .borrow_mut()
            .insert(cx.target.clone(), rendered);
        result
    }
}
