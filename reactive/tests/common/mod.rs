#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use vmbind_reactive::{ChangeRecord, Id, Listener, ListenerError, ObservableNode};

/// Keeps every batch delivered to it. Can be told to fail.
pub struct Recorder {
    id: Id,
    pub batches: RefCell<Vec<Vec<ChangeRecord>>>,
    pub fail: Cell<bool>,
}

impl Recorder {
    pub fn new() -> Rc<Self> {
        Rc::new(Recorder {
            id: Id::next(),
            batches: RefCell::new(Vec::new()),
            fail: Cell::new(false),
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn listen(self: &Rc<Self>, node: &ObservableNode) {
        let weak: Weak<dyn Listener> = Rc::<Recorder>::downgrade(self);
        node.add_listener(weak);
    }

    pub fn batch_count(&self) -> usize {
        self.batches.borrow().len()
    }

    pub fn records(&self) -> Vec<ChangeRecord> {
        self.batches.borrow().iter().flatten().cloned().collect()
    }
}

impl Listener for Recorder {
    fn listener_id(&self) -> Id {
        self.id
    }

    fn viewmodel_updated(
        &self,
        _source: &ObservableNode,
        batch: &[ChangeRecord],
    ) -> Result<(), ListenerError> {
        self.batches.borrow_mut().push(batch.to_vec());
        if self.fail.get() {
            return Err("recorder told to fail".into());
        }
        Ok(())
    }
}
