use std::rc::Rc;

use crate::value::Value;

/// One leaf mutation, carrying everything a listener needs to route it.
///
/// - `sub_key`: the key under which the owning node sits in its parent
///   (empty for a root). Binders match it against their target handles.
/// - `category`: the dotted tag of the group that holds the leaf (empty for
///   leaves stored directly on a node). Binders pick a processor from its
///   last segment.
/// - `key` / `value`: the leaf name and its new value.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    sub_key: Rc<str>,
    category: Rc<str>,
    key: Rc<str>,
    value: Value,
}

impl ChangeRecord {
    pub fn new(
        sub_key: impl Into<Rc<str>>,
        category: impl Into<Rc<str>>,
        key: impl Into<Rc<str>>,
        value: Value,
    ) -> Self {
        Self {
            sub_key: sub_key.into(),
            category: category.into(),
            key: key.into(),
            value,
        }
    }

    pub fn sub_key(&self) -> &str {
        &self.sub_key
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// The segment of the category used for processor lookup.
    ///
    /// Groups nested inside plain objects carry dotted tags such as
    /// `list.0.styles`; only the tail (`styles`) selects a processor.
    pub fn category_bucket(&self) -> &str {
        self.category
            .rsplit_once('.')
            .map_or(&*self.category, |(_, tail)| tail)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}
