//! Observable model nodes.
//!
//! A node is defined once from a [`Data`] description and sealed: the set of
//! keys never changes afterwards, only leaf values do. The description is
//! turned into a tree of entries:
//!
//! - leaves hold a [`Value`]; writing one buffers a [`ChangeRecord`] on the
//!   node that owns it,
//! - groups come from nested objects and arrays; each carries a dotted tag
//!   extending its parent's (`styles`, `list.0.styles`) that becomes the
//!   record's category,
//! - children are embedded nodes; they keep their own entries and register
//!   the embedding node as a listener, so their batches bubble upwards.

use std::{
    any::Any,
    cell::{OnceCell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use rustc_hash::FxHashSet;

use crate::{
    FxIndexMap,
    data::Data,
    error::{ListenerError, ModelError},
    id::Id,
    record::ChangeRecord,
    scheduler::{Flush, Scheduler},
    subject::{Listener, Subject},
    value::Value,
};

enum Entry {
    Leaf(RefCell<Value>),
    Group(Group),
    Child(ObservableNode),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Leaf(_) => "leaf",
            Entry::Group(_) => "group",
            Entry::Child(_) => "node",
        }
    }
}

struct Group {
    tag: Rc<str>,
    entries: FxIndexMap<String, Entry>,
}

impl Group {
    fn build(
        tag: Rc<str>,
        fields: Vec<(String, Data)>,
        children: &mut Vec<(String, ObservableNode)>,
    ) -> Group {
        let mut entries = FxIndexMap::default();
        for (key, data) in fields {
            let entry = match data {
                Data::Value(value) => Entry::Leaf(RefCell::new(value)),
                Data::Object(fields) => {
                    Entry::Group(Group::build(nest(&tag, &key), fields, children))
                }
                Data::Array(items) => {
                    let fields = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, data)| (i.to_string(), data))
                        .collect();
                    Entry::Group(Group::build(nest(&tag, &key), fields, children))
                }
                Data::Node(node) => {
                    children.push((key.clone(), node.clone()));
                    Entry::Child(node)
                }
            };
            entries.insert(key, entry);
        }
        Group { tag, entries }
    }

    fn write(&self, owner: &ObservableNode, key: &str, value: Value) -> Result<(), ModelError> {
        match self.entries.get(key) {
            Some(Entry::Leaf(cell)) => {
                cell.replace(value.clone());
                owner.0.subject.add(ChangeRecord::new(
                    owner.sub_key_rc(),
                    self.tag.clone(),
                    key,
                    value,
                ));
                Ok(())
            }
            Some(entry) => Err(ModelError::NotALeaf {
                key: key.to_string(),
                found: entry.kind(),
            }),
            None => Err(ModelError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    fn leaf(&self, key: &str) -> Option<Value> {
        match self.entries.get(key)? {
            Entry::Leaf(cell) => Some(cell.borrow().clone()),
            _ => None,
        }
    }
}

fn nest(tag: &str, key: &str) -> Rc<str> {
    if tag.is_empty() {
        Rc::from(key)
    } else {
        Rc::from(format!("{tag}.{key}"))
    }
}

struct ParentLink {
    parent: Weak<NodeInner>,
    sub_key: Rc<str>,
}

struct NodeInner {
    id: Id,
    scheduler: Scheduler,
    subject: Subject,
    link: OnceCell<ParentLink>,
    root: Group,
}

/// A sealed unit of reactive model state. Cloning yields another handle to
/// the same node.
#[derive(Clone)]
pub struct ObservableNode(Rc<NodeInner>);

impl ObservableNode {
    /// Defines a node on the current thread's [`Scheduler`].
    pub fn define(data: impl Into<Data>) -> Result<Self, ModelError> {
        Self::define_in(data, &Scheduler::current())
    }

    pub fn from_json(json: serde_json::Value) -> Result<Self, ModelError> {
        Self::define(json)
    }

    /// Defines a node driven by `scheduler`.
    ///
    /// `data` must be an object. Embedded nodes are attached to the new node
    /// under their key; a node that already has a parent is rejected.
    pub fn define_in(data: impl Into<Data>, scheduler: &Scheduler) -> Result<Self, ModelError> {
        let fields = match data.into() {
            Data::Object(fields) => fields,
            other => {
                return Err(ModelError::NotAMapping {
                    found: other.kind(),
                });
            }
        };

        let mut children = Vec::new();
        let root = Group::build(Rc::from(""), fields, &mut children);

        let mut seen = FxHashSet::default();
        for (key, child) in &children {
            if let Some(link) = child.0.link.get() {
                return Err(ModelError::ParentAlreadySet {
                    sub_key: link.sub_key.to_string(),
                });
            }
            if !seen.insert(child.id()) {
                return Err(ModelError::ParentAlreadySet {
                    sub_key: key.clone(),
                });
            }
        }

        let node = ObservableNode(Rc::new(NodeInner {
            id: Id::next(),
            scheduler: scheduler.clone(),
            subject: Subject::default(),
            link: OnceCell::new(),
            root,
        }));
        for (key, child) in children {
            child.attach(&node, key);
        }
        tracing::trace!(node = %node.id(), children = node.0.root.entries.len(), "node defined");
        Ok(node)
    }

    fn attach(&self, parent: &ObservableNode, sub_key: String) {
        let link = ParentLink {
            parent: Rc::downgrade(&parent.0),
            sub_key: sub_key.into(),
        };
        if self.0.link.set(link).is_err() {
            return;
        }
        let listener: Weak<NodeInner> = Rc::downgrade(&parent.0);
        self.add_listener(listener);
    }

    pub fn id(&self) -> Id {
        self.0.id
    }

    pub fn ptr_eq(&self, other: &ObservableNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.0.scheduler
    }

    /// Key under which this node sits in its parent, empty for a root.
    pub fn sub_key(&self) -> &str {
        self.0.link.get().map_or("", |link| &*link.sub_key)
    }

    fn sub_key_rc(&self) -> Rc<str> {
        match self.0.link.get() {
            Some(link) => link.sub_key.clone(),
            None => Rc::from(""),
        }
    }

    /// The embedding node, if it is still alive.
    pub fn parent(&self) -> Option<ObservableNode> {
        let link = self.0.link.get()?;
        link.parent.upgrade().map(ObservableNode)
    }

    /// Number of ancestors above this node.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(node) = current {
            depth += 1;
            current = node.parent();
        }
        depth
    }

    /// Dotted chain of keys from the topmost ancestor down to this node.
    pub fn path(&self) -> String {
        let mut keys = vec![self.sub_key_rc()];
        let mut current = self.parent();
        while let Some(node) = current {
            keys.push(node.sub_key_rc());
            current = node.parent();
        }
        keys.iter()
            .rev()
            .filter(|key| !key.is_empty())
            .map(|key| &**key)
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.root.entries.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.root.entries.contains_key(key)
    }

    /// Current value of a leaf stored directly on this node.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.root.leaf(key)
    }

    /// Replaces a leaf stored directly on this node. The record carries an
    /// empty category.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        self.0.root.write(self, key, value.into())
    }

    pub fn child(&self, key: &str) -> Option<&ObservableNode> {
        match self.0.root.entries.get(key)? {
            Entry::Child(node) => Some(node),
            _ => None,
        }
    }

    pub fn group(&self, key: &str) -> Option<GroupRef<'_>> {
        match self.0.root.entries.get(key)? {
            Entry::Group(group) => Some(GroupRef { owner: self, group }),
            _ => None,
        }
    }

    /// Reads the leaf at a dotted path such as `wrapper.styles.background`,
    /// walking through groups and child nodes.
    pub fn read(&self, path: &str) -> Result<Value, ModelError> {
        let (_, group, key) = self.locate(path)?;
        match group.entries.get(key) {
            Some(Entry::Leaf(cell)) => Ok(cell.borrow().clone()),
            Some(entry) => Err(ModelError::NotALeaf {
                key: key.to_string(),
                found: entry.kind(),
            }),
            None => Err(ModelError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    /// Writes the leaf at a dotted path. The record is buffered on the node
    /// that owns the leaf.
    pub fn write(&self, path: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let (owner, group, key) = self.locate(path)?;
        group.write(owner, key, value.into())
    }

    fn locate<'a, 'p>(
        &'a self,
        path: &'p str,
    ) -> Result<(&'a ObservableNode, &'a Group, &'p str), ModelError> {
        let mut owner = self;
        let mut group = &self.0.root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                return Ok((owner, group, segment));
            }
            match group.entries.get(segment) {
                Some(Entry::Group(inner)) => group = inner,
                Some(Entry::Child(child)) => {
                    owner = child;
                    group = &child.0.root;
                }
                Some(Entry::Leaf(_)) | None => {
                    return Err(ModelError::UnknownKey {
                        key: path.to_string(),
                    });
                }
            }
        }
        Err(ModelError::UnknownKey {
            key: path.to_string(),
        })
    }

    /// Invokes the handler stored directly under `key` with this node bound
    /// as its context.
    pub fn call(&self, key: &str, event: &dyn Any) -> Result<(), ModelError> {
        let value = self.0.root.leaf(key).ok_or_else(|| ModelError::UnknownKey {
            key: key.to_string(),
        })?;
        match value {
            Value::Handler(handler) => {
                handler.call(event, self);
                Ok(())
            }
            other => Err(ModelError::NotAHandler {
                key: key.to_string(),
                found: other.kind(),
            }),
        }
    }

    /// Registers a listener for this node's batches. The first registration
    /// makes the node active on its scheduler. Registering the same listener
    /// twice has no effect.
    pub fn add_listener(&self, listener: Weak<dyn Listener>) {
        let Some(id) = listener.upgrade().map(|l| l.listener_id()) else {
            return;
        };
        if self.0.subject.add_listener(id, listener) {
            tracing::trace!(node = %self.id(), listener = %id, "first listener");
        }
        self.0.scheduler.watch(Rc::new(self.clone()));
    }

    /// Unregisters a listener. Removing the last one takes the node out of
    /// future flushes.
    pub fn remove_listener(&self, id: Id) {
        if self.0.subject.remove_listener(id) {
            self.0.scheduler.unwatch(self.id());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.0.subject.listener_count()
    }

    /// Whether the node currently takes part in drains.
    pub fn is_active(&self) -> bool {
        self.0.scheduler.is_active(self.id())
    }

    pub fn has_pending(&self) -> bool {
        self.0.subject.has_pending()
    }
}

impl Flush for ObservableNode {
    fn id(&self) -> Id {
        self.0.id
    }

    fn depth(&self) -> usize {
        ObservableNode::depth(self)
    }

    fn is_listened(&self) -> bool {
        self.0.subject.prune()
    }

    fn flush(&self) -> Result<bool, ListenerError> {
        let batch = self.0.subject.take_pending();
        if batch.is_empty() {
            return Ok(false);
        }
        let mut failure = None;
        for listener in self.0.subject.live_listeners() {
            if let Err(err) = listener.viewmodel_updated(self, &batch) {
                failure.get_or_insert(err);
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }
}

/// A node listening to one of its children: everything the child delivers is
/// buffered again, verbatim, on the node itself.
impl Listener for NodeInner {
    fn listener_id(&self) -> Id {
        self.id
    }

    fn viewmodel_updated(
        &self,
        _source: &ObservableNode,
        batch: &[ChangeRecord],
    ) -> Result<(), ListenerError> {
        for record in batch {
            self.subject.add(record.clone());
        }
        Ok(())
    }
}

impl fmt::Debug for ObservableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableNode")
            .field("id", &self.0.id)
            .field("sub_key", &self.sub_key())
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A borrowed view of a group (nested object or array) inside a node.
#[derive(Clone, Copy)]
pub struct GroupRef<'a> {
    owner: &'a ObservableNode,
    group: &'a Group,
}

impl<'a> GroupRef<'a> {
    /// The dotted tag stamped as category on records written through this
    /// group.
    pub fn tag(&self) -> &'a str {
        let group: &'a Group = self.group;
        &group.tag
    }

    /// The node that buffers records for this group.
    pub fn owner(&self) -> &'a ObservableNode {
        self.owner
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let group: &'a Group = self.group;
        group.entries.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.group.leaf(key)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        self.group.write(self.owner, key, value.into())
    }

    pub fn group(&self, key: &str) -> Option<GroupRef<'a>> {
        let group: &'a Group = self.group;
        match group.entries.get(key)? {
            Entry::Group(group) => Some(GroupRef {
                owner: self.owner,
                group,
            }),
            _ => None,
        }
    }

    pub fn child(&self, key: &str) -> Option<&'a ObservableNode> {
        let group: &'a Group = self.group;
        match group.entries.get(key)? {
            Entry::Child(node) => Some(node),
            _ => None,
        }
    }

    /// The current leaf entries in definition order. Nested groups and child
    /// nodes are skipped.
    pub fn leaves(&self) -> impl Iterator<Item = (&'a str, Value)> + use<'a> {
        let group: &'a Group = self.group;
        group
            .entries
            .iter()
            .filter_map(|(key, entry)| match entry {
                Entry::Leaf(cell) => Some((key.as_str(), cell.borrow().clone())),
                _ => None,
            })
    }
}

impl fmt::Debug for GroupRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupRef")
            .field("tag", &self.tag())
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}
