use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::{error::ListenerError, id::Id, node::ObservableNode, record::ChangeRecord};

/// Receives the batched changes of a node it was registered on.
pub trait Listener {
    /// Identity used to deduplicate and remove registrations.
    fn listener_id(&self) -> Id;

    /// Called once per flush with every record accumulated on `source` since
    /// the previous flush.
    fn viewmodel_updated(
        &self,
        source: &ObservableNode,
        batch: &[ChangeRecord],
    ) -> Result<(), ListenerError>;
}

/// The pending-change buffer and listener set owned by every node.
///
/// Listeners are held weakly: a child holds its parent as a listener, and the
/// parent owns the child, so strong references would leak the whole tree.
/// Listeners that went away without unregistering are pruned lazily.
#[derive(Default)]
pub(crate) struct Subject {
    pending: RefCell<SmallVec<[ChangeRecord; 4]>>,
    listeners: RefCell<SmallVec<[(Id, Weak<dyn Listener>); 2]>>,
}

impl Subject {
    /// Buffers a record until the next flush.
    ///
    /// A record equal to the one buffered just before it is coalesced; any
    /// other write is kept, so two different writes between flushes both
    /// reach listeners.
    pub(crate) fn add(&self, record: ChangeRecord) {
        let mut pending = self.pending.borrow_mut();
        if pending.last() != Some(&record) {
            pending.push(record);
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    pub(crate) fn take_pending(&self) -> SmallVec<[ChangeRecord; 4]> {
        self.pending.take()
    }

    /// Returns `true` if this was the first listener.
    pub(crate) fn add_listener(&self, id: Id, listener: Weak<dyn Listener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let was_empty = listeners.is_empty();
        if !listeners.iter().any(|(existing, _)| *existing == id) {
            listeners.push((id, listener));
        }
        was_empty
    }

    /// Returns `true` if no listener is left afterwards.
    pub(crate) fn remove_listener(&self, id: Id) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.is_empty()
    }

    /// Drops registrations whose listener no longer exists and reports whether
    /// any live listener remains.
    pub(crate) fn prune(&self) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|(_, listener)| listener.strong_count() > 0);
        !listeners.is_empty()
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Strong handles to the current listeners, so delivery can run without
    /// holding a borrow while listeners register or unregister themselves.
    pub(crate) fn live_listeners(&self) -> SmallVec<[Rc<dyn Listener>; 2]> {
        self.listeners
            .borrow()
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect()
    }
}
