//! Processors for the conventional categories on [`ElementId`] targets.

use std::rc::Rc;

use strum::IntoEnumIterator;
use vmbind_reactive::Value;

use super::{ElementId, Event};
use crate::{
    binder::Binder,
    error::ProcessError,
    processor::{Category, ProcessCx, Processor, ProcessorSet},
    template::TemplateProcessor,
};

/// `styles`: sets an inline style to the value's text, `null` removes it.
#[derive(Clone, Copy, Debug, Default)]
pub struct StyleProcessor;

impl Processor<ElementId> for StyleProcessor {
    fn process(
        &self,
        cx: &ProcessCx<'_, ElementId>,
        key: &str,
        value: &Value,
    ) -> Result<(), ProcessError> {
        match value {
            Value::Null => cx.target.remove_style(key),
            value => cx.target.set_style(key, value.to_string()),
        }
        Ok(())
    }
}

/// `attributes`: `true` sets an empty attribute, `false` and `null` remove
/// it, anything else is written as text.
#[derive(Clone, Copy, Debug, Default)]
pub struct AttributeProcessor;

impl Processor<ElementId> for AttributeProcessor {
    fn process(
        &self,
        cx: &ProcessCx<'_, ElementId>,
        key: &str,
        value: &Value,
    ) -> Result<(), ProcessError> {
        match value {
            Value::Null | Value::Bool(false) => cx.target.remove_attribute(key),
            Value::Bool(true) => cx.target.set_attribute(key, ""),
            Value::Handler(_) | Value::Nodes(_) => {
                return Err(ProcessError::UnexpectedValue {
                    key: key.to_string(),
                    expected: "scalar",
                    found: value.kind(),
                });
            }
            value => cx.target.set_attribute(key, value.to_string()),
        }
        Ok(())
    }
}

/// `properties`: stores the value as is.
#[derive(Clone, Copy, Debug, Default)]
pub struct PropertyProcessor;

impl Processor<ElementId> for PropertyProcessor {
    fn process(
        &self,
        cx: &ProcessCx<'_, ElementId>,
        key: &str,
        value: &Value,
    ) -> Result<(), ProcessError> {
        cx.target.set_property(key, value.clone());
        Ok(())
    }
}

/// `events`: installs the handler as the listener for the event named by the
/// key. The handler runs with the child node it was read from.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventProcessor;

impl Processor<ElementId> for EventProcessor {
    fn process(
        &self,
        cx: &ProcessCx<'_, ElementId>,
        key: &str,
        value: &Value,
    ) -> Result<(), ProcessError> {
        let handler = match value {
            Value::Null => {
                cx.target.remove_event_listener(key);
                return Ok(());
            }
            Value::Handler(handler) => handler.clone(),
            other => {
                return Err(ProcessError::UnexpectedValue {
                    key: key.to_string(),
                    expected: "handler",
                    found: other.kind(),
                });
            }
        };
        let node = cx.node.clone();
        cx.target
            .set_event_listener(key, move |event: &Event| handler.call(event, &node));
        Ok(())
    }
}

/// A processor set covering every [`Category`], with `templates` serving the
/// template category.
pub fn standard_processors(templates: Rc<TemplateProcessor<ElementId>>) -> ProcessorSet<ElementId> {
    let mut set = ProcessorSet::new();
    for category in Category::iter() {
        match category {
            Category::Styles => set.insert(category, StyleProcessor),
            Category::Attributes => set.insert(category, AttributeProcessor),
            Category::Properties => set.insert(category, PropertyProcessor),
            Category::Events => set.insert(category, EventProcessor),
            Category::Template => set.insert_rc(category, templates.clone()),
        }
    }
    set
}

/// Registers [`standard_processors`] on `binder`, replacing processors it
/// already has for those categories.
pub fn install_standard_processors(
    binder: &Binder<ElementId>,
    templates: Rc<TemplateProcessor<ElementId>>,
) {
    let mut processors = binder.processors();
    for (category, processor) in standard_processors(templates).iter() {
        processors.insert_rc(category, processor.clone());
    }
    binder.set_processors(processors);
}
