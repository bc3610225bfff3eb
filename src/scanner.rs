use std::rc::Rc;

use crate::{
    binder::Binder,
    handle::TargetHandle,
    target::Target,
    visitor::{StackVisitor, Visitor},
};

pub const DEFAULT_MARKER: &str = "data-viewmodel";

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanConfig {
    /// Attribute whose value is the model path of a marked target.
    pub marker: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

/// Finds marked targets below a presentation root and collects them into a
/// [`Binder`].
#[derive(Clone, Debug)]
pub struct Scanner<V = StackVisitor> {
    visitor: V,
    config: ScanConfig,
}

impl Scanner<StackVisitor> {
    pub fn new() -> Self {
        Self::with_visitor(StackVisitor)
    }

    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self::with_config(
            StackVisitor,
            ScanConfig {
                marker: marker.into(),
            },
        )
    }
}

impl Default for Scanner<StackVisitor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Scanner<V> {
    pub fn with_visitor(visitor: V) -> Self {
        Self::with_config(visitor, ScanConfig::default())
    }

    pub fn with_config(visitor: V, config: ScanConfig) -> Self {
        Self { visitor, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// The handle for `target` if it carries the marker attribute.
    pub fn handle_for<T: Target>(&self, target: &T) -> Option<TargetHandle<T>> {
        let path = target.attribute(&self.config.marker)?;
        Some(TargetHandle::new(target.clone(), path))
    }

    /// A new binder holding a handle for every marked target at or below
    /// `root`. The root is checked first, then its descendants in the
    /// visitor's order.
    pub fn scan<T: Target>(&self, root: &T) -> Rc<Binder<T>>
    where
        V: Visitor<T>,
    {
        let binder = Binder::new();
        self.scan_into(root, &binder);
        binder
    }

    pub fn scan_into<T: Target>(&self, root: &T, binder: &Binder<T>)
    where
        V: Visitor<T>,
    {
        let before = binder.len();
        if let Some(handle) = self.handle_for(root) {
            binder.add(handle);
        }
        self.visitor.visit(root, &mut |target: &T| {
            if let Some(handle) = self.handle_for(target) {
                binder.add(handle);
            }
        });
        tracing::debug!(
            binder = %binder.id(),
            found = binder.len() - before,
            marker = %self.config.marker,
            "scan finished"
        );
    }
}
