use smallvec::SmallVec;

use crate::target::Target;

/// A traversal strategy over the descendants of a target.
///
/// The root itself is never passed to `action`.
pub trait Visitor<T> {
    fn visit(&self, root: &T, action: &mut dyn FnMut(&T));
}

/// Iterative walk with an explicit stack.
///
/// For each visited target its first child is pushed, then its next sibling,
/// and the top of the stack is visited next. Siblings are therefore seen
/// before the children of earlier siblings: `root -> [a -> [a1], b]` visits
/// `a`, `b`, `a1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackVisitor;

impl<T: Target> Visitor<T> for StackVisitor {
    fn visit(&self, root: &T, action: &mut dyn FnMut(&T)) {
        let mut stack: SmallVec<[T; 16]> = SmallVec::new();
        let Some(mut current) = root.first_child() else {
            return;
        };
        loop {
            action(&current);
            if let Some(child) = current.first_child() {
                stack.push(child);
            }
            if let Some(sibling) = current.next_sibling() {
                stack.push(sibling);
            }
            match stack.pop() {
                Some(next) => current = next,
                None => break,
            }
        }
    }
}

/// Plain document-order (pre-order) walk.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreOrderVisitor;

impl<T: Target> Visitor<T> for PreOrderVisitor {
    fn visit(&self, root: &T, action: &mut dyn FnMut(&T)) {
        let mut stack: SmallVec<[T; 16]> = SmallVec::new();
        stack.extend(root.first_child());
        while let Some(current) = stack.pop() {
            action(&current);
            stack.extend(current.next_sibling());
            stack.extend(current.first_child());
        }
    }
}
