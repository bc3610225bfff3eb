//! What the engine needs from a presentation tree.
//!
//! The binding machinery never touches a concrete tree technology. It walks
//! targets through [`Target`] and, for list rendering, restructures them
//! through [`Mount`]. [`crate::dom::ElementId`] is the bundled implementation.

use std::{fmt::Debug, hash::Hash};

/// A node of a presentation tree.
pub trait Target: Clone + Eq + Hash + Debug + 'static {
    fn first_child(&self) -> Option<Self>;

    fn next_sibling(&self) -> Option<Self>;

    fn attribute(&self, name: &str) -> Option<String>;
}

/// Structural edits used by the template processor.
pub trait Mount: Target {
    /// A detached copy of this target and its whole subtree.
    fn deep_clone(&self) -> Self;

    fn append_child(&self, child: &Self);

    /// Takes this target out of its parent and discards it.
    fn detach(&self);

    /// Discards every child of this target.
    fn clear_children(&self);
}
