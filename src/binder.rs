use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use vmbind_reactive::{ChangeRecord, Id, Listener, ListenerError, ObservableNode};

use crate::{
    error::{BindError, ProcessError},
    handle::TargetHandle,
    processor::{FnProcessor, ProcessCx, Processor, ProcessorSet, processor_fn},
    target::Target,
};

/// Connects one root node to the handles found under one presentation root.
///
/// A binder renders everything once when it starts watching and afterwards
/// only reacts to the batches its root delivers. Binders are always held in
/// an `Rc`; the root only keeps a weak reference, so dropping the last strong
/// handle ends the subscription at the next drain.
#[derive(educe::Educe)]
#[educe(Debug)]
pub struct Binder<T: Target> {
    id: Id,
    items: RefCell<Vec<TargetHandle<T>>>,
    processors: RefCell<ProcessorSet<T>>,
    #[educe(Debug(ignore))]
    this: Weak<Binder<T>>,
}

impl<T: Target> Binder<T> {
    pub fn new() -> Rc<Self> {
        Self::with_processors(ProcessorSet::new())
    }

    pub fn with_processors(processors: ProcessorSet<T>) -> Rc<Self> {
        Rc::new_cyclic(|this| Binder {
            id: Id::next(),
            items: RefCell::new(Vec::new()),
            processors: RefCell::new(processors),
            this: this.clone(),
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn add(&self, handle: TargetHandle<T>) {
        self.items.borrow_mut().push(handle);
    }

    pub fn handles(&self) -> Vec<TargetHandle<T>> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn add_processor(&self, category: impl Into<Rc<str>>, processor: impl Processor<T> + 'static) {
        self.processors.borrow_mut().insert(category, processor);
    }

    pub fn add_processor_fn<F>(&self, category: impl Into<Rc<str>>, f: F)
    where
        F: Fn(&ProcessCx<'_, T>, &str, &vmbind_reactive::Value) -> Result<(), ProcessError>
            + 'static,
    {
        let processor: FnProcessor<F> = processor_fn(f);
        self.add_processor(category, processor);
    }

    /// Replaces the whole processor set.
    pub fn set_processors(&self, processors: ProcessorSet<T>) {
        *self.processors.borrow_mut() = processors;
    }

    pub fn processors(&self) -> ProcessorSet<T> {
        self.processors.borrow().clone()
    }

    /// Subscribes to `root` and renders the current model state.
    pub fn watch(&self, root: &ObservableNode) -> Result<(), BindError> {
        let listener: Weak<dyn Listener> = self.this.clone();
        root.add_listener(listener);
        tracing::debug!(binder = %self.id, root = %root.id(), handles = self.len(), "watching");
        self.render(root)
    }

    pub fn unwatch(&self, root: &ObservableNode) {
        root.remove_listener(self.id);
        tracing::debug!(binder = %self.id, root = %root.id(), "unwatched");
    }

    /// Feeds every handle's child node through the registered processors.
    ///
    /// Each processor sees the leaves of the node group named after its
    /// category, in definition order. Handles whose path does not name a
    /// child of `root` are skipped.
    pub fn render(&self, root: &ObservableNode) -> Result<(), BindError> {
        let processors = self.processors();
        let items = self.handles();
        for handle in &items {
            let Some(node) = root.child(handle.model_path()) else {
                tracing::debug!(
                    binder = %self.id,
                    path = handle.model_path(),
                    "no child node for handle"
                );
                continue;
            };
            let cx = ProcessCx {
                node,
                target: handle.target(),
                processors: &processors,
            };
            for (category, processor) in processors.iter() {
                let Some(group) = node.group(category) else {
                    continue;
                };
                for (key, value) in group.leaves() {
                    processor
                        .process(&cx, key, &value)
                        .map_err(|err| BindError::process(category, key, err))?;
                }
            }
        }
        Ok(())
    }

    /// Routes each record of `batch` to every handle whose path equals the
    /// record's `sub_key`, through the processor named by the last segment of
    /// its category. The first failure abandons the rest of the batch.
    pub fn dispatch(&self, root: &ObservableNode, batch: &[ChangeRecord]) -> Result<(), BindError> {
        let processors = self.processors();
        let items = self.handles();
        for record in batch {
            let bucket = record.category_bucket();
            let mut delivered = false;
            if let Some(processor) = processors.get(bucket) {
                for handle in items
                    .iter()
                    .filter(|handle| handle.model_path() == record.sub_key())
                {
                    let Some(node) = root.child(handle.model_path()) else {
                        continue;
                    };
                    let cx = ProcessCx {
                        node,
                        target: handle.target(),
                        processors: &processors,
                    };
                    processor
                        .process(&cx, record.key(), record.value())
                        .map_err(|err| BindError::process(bucket, record.key(), err))?;
                    delivered = true;
                }
            }
            if !delivered {
                tracing::trace!(
                    binder = %self.id,
                    sub_key = record.sub_key(),
                    category = record.category(),
                    key = record.key(),
                    "change not routed"
                );
            }
        }
        Ok(())
    }
}

impl<T: Target> Listener for Binder<T> {
    fn listener_id(&self) -> Id {
        self.id
    }

    fn viewmodel_updated(
        &self,
        source: &ObservableNode,
        batch: &[ChangeRecord],
    ) -> Result<(), ListenerError> {
        self.dispatch(source, batch)
            .map_err(|err| Box::new(err) as ListenerError)
    }
}
