//! # vmbind
//!
//! vmbind binds an observable model tree to the targets of a presentation
//! tree. Targets are discovered by a marker attribute naming a model path,
//! rendered once in full, and afterwards updated only with the leaves that
//! changed, through one [`Processor`] per category.
//!
//! ## Example
//! ```rust
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use vmbind::{
//!     Scanner, TemplateProcessor,
//!     dom::{ElementId, install_standard_processors},
//!     reactive::{Data, ObservableNode, Scheduler},
//! };
//!
//! let (scheduler, frames) = Scheduler::manual();
//! let card = ObservableNode::define_in(json!({ "styles": { "color": "red" } }), &scheduler)
//!     .unwrap();
//! let root = ObservableNode::define_in(Data::object([("card", card.clone().into())]), &scheduler)
//!     .unwrap();
//!
//! let div = ElementId::new("div").attr("data-viewmodel", "card");
//! let binder = Scanner::new().scan(&div);
//! install_standard_processors(&binder, Rc::new(TemplateProcessor::new()));
//! binder.watch(&root).unwrap();
//! assert_eq!(div.style("color").as_deref(), Some("red"));
//!
//! card.write("styles.color", "blue").unwrap();
//! frames.run_frame();
//! assert_eq!(div.style("color").as_deref(), Some("blue"));
//! ```
//!
//! ## Pieces
//!
//! - [`reactive`]: model nodes, change records, listeners and the frame driven
//!   scheduler that batches deliveries.
//! - [`Binder`]: target handles plus the category to processor map. Renders on
//!   [`Binder::watch`] and dispatches every batch its root delivers.
//! - [`Scanner`] and [`Visitor`]: find marked targets. The traversal and the
//!   tree technology are both pluggable through [`Visitor`] and [`Target`].
//! - [`TemplateProcessor`]: renders lists of nodes by cloning named
//!   templates, each clone bound by its own child binder.
//! - [`dom`]: an in-memory element tree with processors for the conventional
//!   categories.
//!
//! Change records whose `sub_key` or category nothing is registered for are
//! dropped silently. A failing processor aborts the rest of its batch.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

pub use vmbind_reactive as reactive;

mod binder;
pub mod dom;
mod error;
mod handle;
mod processor;
mod scanner;
mod target;
mod template;
mod visitor;

pub use binder::Binder;
pub use error::{BindError, ProcessError};
pub use handle::TargetHandle;
pub use processor::{Category, FnProcessor, ProcessCx, Processor, ProcessorSet, processor_fn};
pub use scanner::{DEFAULT_MARKER, ScanConfig, Scanner};
pub use target::{Mount, Target};
pub use template::TemplateProcessor;
pub use visitor::{PreOrderVisitor, StackVisitor, Visitor};

pub(crate) type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
