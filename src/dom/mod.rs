//! A small retained element tree and the processors that drive it.
//!
//! Elements live in thread-local storage and are addressed by copyable
//! [`ElementId`]s, which implement [`Target`](crate::Target) and
//! [`Mount`](crate::Mount).

mod element;
mod event;
mod processors;

pub use element::ElementId;
pub use event::Event;
pub use processors::{
    AttributeProcessor, EventProcessor, PropertyProcessor, StyleProcessor,
    install_standard_processors, standard_processors,
};
