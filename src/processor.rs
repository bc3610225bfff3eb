//! Processors turn `(key, value)` pairs of a category into effects on a
//! target.
//!
//! A binder keeps one processor per category name. On a full render every
//! leaf of the node's group with that name is fed to it; on an update each
//! change record is routed by the last segment of its category.

use std::{fmt, rc::Rc};

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use vmbind_reactive::{ObservableNode, Value};

use crate::{FxIndexMap, error::ProcessError};

/// Everything a processor gets to see besides the pair itself.
pub struct ProcessCx<'a, T> {
    /// The child node the pair belongs to.
    pub node: &'a ObservableNode,
    pub target: &'a T,
    /// The processor set of the dispatching binder, for processors that
    /// create binders of their own.
    pub processors: &'a ProcessorSet<T>,
}

pub trait Processor<T> {
    fn process(&self, cx: &ProcessCx<'_, T>, key: &str, value: &Value)
    -> Result<(), ProcessError>;
}

impl<T, P: Processor<T> + ?Sized> Processor<T> for Rc<P> {
    fn process(
        &self,
        cx: &ProcessCx<'_, T>,
        key: &str,
        value: &Value,
    ) -> Result<(), ProcessError> {
        (**self).process(cx, key, value)
    }
}

/// A processor backed by a closure, see [`processor_fn`].
pub struct FnProcessor<F>(F);

pub fn processor_fn<T, F>(f: F) -> FnProcessor<F>
where
    F: Fn(&ProcessCx<'_, T>, &str, &Value) -> Result<(), ProcessError>,
{
    FnProcessor(f)
}

impl<T, F> Processor<T> for FnProcessor<F>
where
    F: Fn(&ProcessCx<'_, T>, &str, &Value) -> Result<(), ProcessError>,
{
    fn process(
        &self,
        cx: &ProcessCx<'_, T>,
        key: &str,
        value: &Value,
    ) -> Result<(), ProcessError> {
        (self.0)(cx, key, value)
    }
}

/// Category name to processor. Registering a category twice keeps the
/// later processor.
pub struct ProcessorSet<T> {
    map: FxIndexMap<Rc<str>, Rc<dyn Processor<T>>>,
}

impl<T> ProcessorSet<T> {
    pub fn new() -> Self {
        Self {
            map: FxIndexMap::default(),
        }
    }

    pub fn insert(&mut self, category: impl Into<Rc<str>>, processor: impl Processor<T> + 'static) {
        self.insert_rc(category, Rc::new(processor));
    }

    pub fn insert_rc(&mut self, category: impl Into<Rc<str>>, processor: Rc<dyn Processor<T>>) {
        let category = category.into();
        if self.map.insert(category.clone(), processor).is_some() {
            tracing::debug!(%category, "processor replaced");
        }
    }

    pub fn with(mut self, category: impl Into<Rc<str>>, processor: impl Processor<T> + 'static) -> Self {
        self.insert(category, processor);
        self
    }

    pub fn remove(&mut self, category: &str) -> Option<Rc<dyn Processor<T>>> {
        self.map.shift_remove(category)
    }

    pub fn get(&self, category: &str) -> Option<&Rc<dyn Processor<T>>> {
        self.map.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.map.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(|category| &**category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rc<dyn Processor<T>>)> {
        self.map.iter().map(|(category, processor)| (&**category, processor))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<T> Default for ProcessorSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ProcessorSet<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T> fmt::Debug for ProcessorSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.categories()).finish()
    }
}

/// The conventional category names.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, IntoStaticStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Category {
    /// Inline style declarations.
    Styles,
    /// Attribute values.
    Attributes,
    /// Arbitrary target properties.
    Properties,
    /// Handlers attached as event listeners.
    Events,
    /// Lists rendered through named templates.
    Template,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl From<Category> for Rc<str> {
    fn from(category: Category) -> Self {
        Rc::from(category.as_str())
    }
}
