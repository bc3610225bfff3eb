use crate::{
    node::ObservableNode,
    value::{Handler, Value},
};

/// A plain nested description of model state, consumed by
/// [`ObservableNode::define`].
///
/// Objects and arrays become path-tagged groups inside the node, embedded
/// nodes become children that bubble their changes up to it.
#[derive(Clone, Debug)]
pub enum Data {
    Value(Value),
    Object(Vec<(String, Data)>),
    Array(Vec<Data>),
    Node(ObservableNode),
}

impl Data {
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Data)>) -> Self {
        Data::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array(items: impl IntoIterator<Item = Data>) -> Self {
        Data::Array(items.into_iter().collect())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Data::Value(value) => value.kind(),
            Data::Object(_) => "object",
            Data::Array(_) => "array",
            Data::Node(_) => "node",
        }
    }
}

impl From<Value> for Data {
    fn from(value: Value) -> Self {
        Data::Value(value)
    }
}

impl From<ObservableNode> for Data {
    fn from(node: ObservableNode) -> Self {
        Data::Node(node)
    }
}

impl From<Handler> for Data {
    fn from(handler: Handler) -> Self {
        Data::Value(Value::Handler(handler))
    }
}

impl From<&str> for Data {
    fn from(s: &str) -> Self {
        Data::Value(s.into())
    }
}

impl From<String> for Data {
    fn from(s: String) -> Self {
        Data::Value(s.into())
    }
}

impl From<bool> for Data {
    fn from(b: bool) -> Self {
        Data::Value(b.into())
    }
}

impl From<f64> for Data {
    fn from(n: f64) -> Self {
        Data::Value(n.into())
    }
}

impl From<i32> for Data {
    fn from(n: i32) -> Self {
        Data::Value(n.into())
    }
}

impl From<serde_json::Value> for Data {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Data::Value(Value::Null),
            Json::Bool(b) => Data::Value(Value::Bool(b)),
            Json::Number(n) => Data::Value(n.as_f64().map_or(Value::Null, Value::Number)),
            Json::String(s) => Data::Value(s.into()),
            Json::Array(items) => Data::Array(items.into_iter().map(Data::from).collect()),
            Json::Object(map) => {
                Data::Object(map.into_iter().map(|(k, v)| (k, Data::from(v))).collect())
            }
        }
    }
}
