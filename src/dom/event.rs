use std::rc::Rc;

use vmbind_reactive::Value;

/// An event delivered to element listeners. Handlers bound through the
/// `events` category receive it as `&dyn Any` and can downcast to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    name: Rc<str>,
    detail: Value,
}

impl Event {
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            detail: Value::Null,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }
}
