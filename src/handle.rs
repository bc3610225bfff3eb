use std::rc::Rc;

/// A presentation target paired with the model path that drives it.
///
/// The path names a child node of the watched root (one level deep), which is
/// also the `sub_key` that node stamps on its change records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetHandle<T> {
    target: T,
    model_path: Rc<str>,
}

impl<T> TargetHandle<T> {
    pub fn new(target: T, model_path: impl Into<Rc<str>>) -> Self {
        Self {
            target,
            model_path: model_path.into(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}
