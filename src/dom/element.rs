use std::{cell::RefCell, fmt::Write as _, rc::Rc};

use indexmap::IndexMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use vmbind_reactive::Value;

use super::Event;
use crate::target::{Mount, Target};

pub(crate) type EventCallback = Rc<dyn Fn(&Event)>;

thread_local! {
    pub(crate) static ELEMENT_STORAGE: RefCell<ElementStorage> = Default::default();
}

#[derive(Clone, Default)]
pub(crate) struct ElementData {
    tag: Rc<str>,
    attributes: IndexMap<String, String>,
    styles: IndexMap<String, String>,
    properties: IndexMap<String, Value>,
    listeners: IndexMap<String, EventCallback>,
}

#[derive(Default)]
pub(crate) struct ElementStorage {
    element_ids: SlotMap<ElementId, ()>,
    data: SecondaryMap<ElementId, ElementData>,
    children: SecondaryMap<ElementId, Vec<ElementId>>,
    parent: SecondaryMap<ElementId, ElementId>,
    /// Position of each element within its parent's children.
    index: SecondaryMap<ElementId, usize>,
}

impl ElementStorage {
    fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.children.get(id)?.first().copied()
    }

    fn next_sibling(&self, id: ElementId) -> Option<ElementId> {
        let parent = *self.parent.get(id)?;
        let index = *self.index.get(id)?;
        self.children.get(parent)?.get(index + 1).copied()
    }

    fn unlink(&mut self, id: ElementId) {
        let index = self.index.remove(id);
        if let Some(parent) = self.parent.remove(id)
            && let Some(index) = index
            && let Some(children) = self.children.get_mut(parent)
        {
            children.remove(index);
            for (i, sibling) in children.iter().enumerate().skip(index) {
                self.index.insert(*sibling, i);
            }
        }
    }

    fn is_ancestor(&self, ancestor: ElementId, mut id: ElementId) -> bool {
        while let Some(parent) = self.parent.get(id) {
            if *parent == ancestor {
                return true;
            }
            id = *parent;
        }
        false
    }

    fn append(&mut self, parent: ElementId, child: ElementId) -> bool {
        if parent == child
            || !self.element_ids.contains_key(parent)
            || !self.element_ids.contains_key(child)
            || self.is_ancestor(child, parent)
        {
            return false;
        }
        self.unlink(child);
        let Some(entry) = self.children.entry(parent) else {
            return false;
        };
        let siblings = entry.or_default();
        siblings.push(child);
        let index = siblings.len() - 1;
        self.parent.insert(child, parent);
        self.index.insert(child, index);
        true
    }

    fn remove(&mut self, id: ElementId) {
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(children) = self.children.remove(id) {
                stack.extend(children);
            }
            self.parent.remove(id);
            self.index.remove(id);
            self.data.remove(id);
            self.element_ids.remove(id);
        }
    }

    fn clear_children(&mut self, id: ElementId) {
        let children = self.children.get_mut(id).map(std::mem::take);
        for child in children.into_iter().flatten() {
            self.parent.remove(child);
            self.index.remove(child);
            self.remove(child);
        }
    }

    /// Copies `id` and its subtree. Event listeners are not copied.
    fn deep_clone(&mut self, id: ElementId) -> ElementId {
        let root = self.copy_element(id);
        let mut stack = vec![(id, root)];
        while let Some((source, copy)) = stack.pop() {
            let children = self.children.get(source).cloned().unwrap_or_default();
            let mut copies = Vec::with_capacity(children.len());
            for (index, child) in children.into_iter().enumerate() {
                let child_copy = self.copy_element(child);
                self.parent.insert(child_copy, copy);
                self.index.insert(child_copy, index);
                copies.push(child_copy);
                stack.push((child, child_copy));
            }
            self.children.insert(copy, copies);
        }
        root
    }

    fn copy_element(&mut self, id: ElementId) -> ElementId {
        let mut data = self.data.get(id).cloned().unwrap_or_default();
        data.listeners.clear();
        let copy = self.element_ids.insert(());
        self.data.insert(copy, data);
        copy
    }

    fn write_markup(&self, id: ElementId, out: &mut String) {
        let Some(data) = self.data.get(id) else {
            return;
        };
        let _ = write!(out, "<{}", data.tag);
        for (name, value) in &data.attributes {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        if !data.styles.is_empty() {
            let styles = data
                .styles
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{styles}\"");
        }
        out.push('>');
        if let Some(Value::Text(text)) = data.properties.get("textContent") {
            out.push_str(text);
        }
        for child in self.children.get(id).into_iter().flatten() {
            self.write_markup(*child, out);
        }
        let _ = write!(out, "</{}>", data.tag);
    }
}

new_key_type! {
    /// A handle to an element of the thread-local element tree.
    ///
    /// Elements are created detached; [`ElementId::append_child`] builds the
    /// tree. A removed element's id stays around as a stale key: reads return
    /// nothing and writes are ignored.
    pub struct ElementId;
}

impl ElementId {
    pub fn new(tag: &str) -> ElementId {
        ELEMENT_STORAGE.with_borrow_mut(|s| {
            let id = s.element_ids.insert(());
            s.data.insert(
                id,
                ElementData {
                    tag: Rc::from(tag),
                    ..Default::default()
                },
            );
            id
        })
    }

    pub fn is_valid(&self) -> bool {
        ELEMENT_STORAGE.with_borrow(|s| s.element_ids.contains_key(*self))
    }

    pub fn tag(&self) -> Option<Rc<str>> {
        ELEMENT_STORAGE.with_borrow(|s| s.data.get(*self).map(|data| data.tag.clone()))
    }

    fn with_data<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        ELEMENT_STORAGE.with_borrow(|s| s.data.get(*self).map(f))
    }

    fn update_data(&self, f: impl FnOnce(&mut ElementData)) {
        ELEMENT_STORAGE.with_borrow_mut(|s| {
            if let Some(data) = s.data.get_mut(*self) {
                f(data);
            }
        });
    }

    /// Builder form of [`ElementId::set_attribute`].
    pub fn attr(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`ElementId::append_child`].
    pub fn child(self, child: ElementId) -> Self {
        self.append_child(child);
        self
    }

    pub fn children_from(self, children: impl IntoIterator<Item = ElementId>) -> Self {
        for child in children {
            self.append_child(child);
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.with_data(|data| data.attributes.get(name).cloned())
            .flatten()
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.update_data(|data| {
            data.attributes.insert(name.to_string(), value);
        });
    }

    pub fn remove_attribute(&self, name: &str) {
        self.update_data(|data| {
            data.attributes.shift_remove(name);
        });
    }

    pub fn style(&self, name: &str) -> Option<String> {
        self.with_data(|data| data.styles.get(name).cloned())
            .flatten()
    }

    pub fn set_style(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.update_data(|data| {
            data.styles.insert(name.to_string(), value);
        });
    }

    pub fn remove_style(&self, name: &str) {
        self.update_data(|data| {
            data.styles.shift_remove(name);
        });
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.with_data(|data| data.properties.get(name).cloned())
            .flatten()
    }

    pub fn set_property(&self, name: &str, value: Value) {
        self.update_data(|data| {
            data.properties.insert(name.to_string(), value);
        });
    }

    /// Sets the listener for `event`, replacing any previous one.
    pub fn set_event_listener(&self, event: &str, listener: impl Fn(&Event) + 'static) {
        let listener: EventCallback = Rc::new(listener);
        self.update_data(|data| {
            data.listeners.insert(event.to_string(), listener);
        });
    }

    pub fn remove_event_listener(&self, event: &str) {
        self.update_data(|data| {
            data.listeners.shift_remove(event);
        });
    }

    pub fn has_event_listener(&self, event: &str) -> bool {
        self.with_data(|data| data.listeners.contains_key(event))
            .unwrap_or(false)
    }

    /// Runs the listener registered for the event's name. Returns whether
    /// one was found.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        let listener = self
            .with_data(|data| data.listeners.get(event.name()).cloned())
            .flatten();
        match listener {
            Some(listener) => {
                listener(event);
                true
            }
            None => false,
        }
    }

    pub fn parent(&self) -> Option<ElementId> {
        ELEMENT_STORAGE.with_borrow(|s| s.parent.get(*self).copied())
    }

    pub fn children(&self) -> Vec<ElementId> {
        ELEMENT_STORAGE.with_borrow(|s| s.children.get(*self).cloned().unwrap_or_default())
    }

    pub fn first_child(&self) -> Option<ElementId> {
        ELEMENT_STORAGE.with_borrow(|s| s.first_child(*self))
    }

    pub fn next_sibling(&self) -> Option<ElementId> {
        ELEMENT_STORAGE.with_borrow(|s| s.next_sibling(*self))
    }

    /// Moves `child` to the end of this element's children. Appending an
    /// element to itself or to one of its descendants is ignored.
    pub fn append_child(&self, child: ElementId) {
        let appended = ELEMENT_STORAGE.with_borrow_mut(|s| s.append(*self, child));
        if !appended {
            tracing::debug!(parent = ?self, ?child, "append ignored");
        }
    }

    /// Removes this element and its subtree from the tree and storage.
    pub fn remove(&self) {
        ELEMENT_STORAGE.with_borrow_mut(|s| s.remove(*self));
    }

    /// Removes every child subtree.
    pub fn clear_children(&self) {
        ELEMENT_STORAGE.with_borrow_mut(|s| s.clear_children(*self));
    }

    pub fn deep_clone(&self) -> ElementId {
        ELEMENT_STORAGE.with_borrow_mut(|s| s.deep_clone(*self))
    }

    /// Serializes the subtree as markup, mainly for assertions and debugging.
    /// The `textContent` property is written as the element's text.
    pub fn markup(&self) -> String {
        let mut out = String::new();
        ELEMENT_STORAGE.with_borrow(|s| s.write_markup(*self, &mut out));
        out
    }
}

impl Target for ElementId {
    fn first_child(&self) -> Option<Self> {
        ElementId::first_child(self)
    }

    fn next_sibling(&self) -> Option<Self> {
        ElementId::next_sibling(self)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        ElementId::attribute(self, name)
    }
}

impl Mount for ElementId {
    fn deep_clone(&self) -> Self {
        ElementId::deep_clone(self)
    }

    fn append_child(&self, child: &Self) {
        ElementId::append_child(self, *child);
    }

    fn detach(&self) {
        self.remove();
    }

    fn clear_children(&self) {
        ElementId::clear_children(self);
    }
}
