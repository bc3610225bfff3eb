use std::{any::Any, fmt, rc::Rc};

use crate::node::ObservableNode;

type HandlerFn = dyn Fn(&dyn Any, &ObservableNode);

/// A callback stored as a leaf value.
///
/// When invoked it receives the native event (opaque to the model, the target
/// technology decides its type) and the node it is bound to.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    pub fn new(f: impl Fn(&dyn Any, &ObservableNode) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &dyn Any, node: &ObservableNode) {
        (self.0)(event, node)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// A leaf value of the model tree.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(Rc<str>),
    Handler(Handler),
    /// An atomic list of nodes, replaced as a whole.
    Nodes(Rc<[ObservableNode]>),
}

impl Value {
    pub fn text(s: impl AsRef<str>) -> Self {
        Value::Text(Rc::from(s.as_ref()))
    }

    pub fn handler(f: impl Fn(&dyn Any, &ObservableNode) + 'static) -> Self {
        Value::Handler(Handler::new(f))
    }

    pub fn nodes(nodes: impl IntoIterator<Item = ObservableNode>) -> Self {
        Value::Nodes(nodes.into_iter().collect())
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Handler(_) => "handler",
            Value::Nodes(_) => "node list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Value::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[ObservableNode]> {
        match self {
            Value::Nodes(nodes) => Some(&nodes[..]),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => a == b,
            (Value::Nodes(a), Value::Nodes(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| a.ptr_eq(b))
            }
            _ => false,
        }
    }
}

/// Renders the value the way a target attribute or style expects it.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Handler(_) => f.write_str("[handler]"),
            Value::Nodes(nodes) => write!(f, "[{} nodes]", nodes.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(Rc::from(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<Handler> for Value {
    fn from(h: Handler) -> Self {
        Value::Handler(h)
    }
}

impl From<Vec<ObservableNode>> for Value {
    fn from(nodes: Vec<ObservableNode>) -> Self {
        Value::Nodes(nodes.into())
    }
}
