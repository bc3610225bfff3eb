//! # vmbind_reactive
//!
//! The change-propagation half of vmbind: an observable model tree whose leaf
//! writes are recorded, batched per node, bubbled to ancestors, and delivered
//! to listeners once per frame.
//!
//! ```rust
//! use vmbind_reactive::{ObservableNode, Scheduler};
//!
//! let (scheduler, frames) = Scheduler::manual();
//! let node = ObservableNode::define_in(
//!     serde_json::json!({ "styles": { "color": "red" } }),
//!     &scheduler,
//! )
//! .unwrap();
//!
//! node.write("styles.color", "blue").unwrap();
//! assert!(node.has_pending());
//! # let _ = frames;
//! ```
//!
//! Everything here is single threaded: nodes, listeners and the scheduler are
//! `Rc` based and live on the thread that pumps frames.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

mod data;
mod error;
mod id;
mod node;
mod record;
mod scheduler;
mod subject;
mod value;

pub use data::Data;
pub use error::{ListenerError, ModelError};
pub use id::Id;
pub use node::{GroupRef, ObservableNode};
pub use record::ChangeRecord;
pub use scheduler::{DrainReport, Frame, FrameHost, FrameQueue, Scheduler, run_frame};
pub use subject::Listener;
pub use value::{Handler, Value};

pub(crate) type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
