use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

pub mod action;
mod error;
pub mod response;

pub use error::{Error, Result};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const MARKER_HEADER: &str = "X-Requested-With";
pub const MARKER_VALUE: &str = "XMLHttpRequest";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// how the payload travels on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    None,
    Json,
    Multipart,
}

/// a form value as the browser would forward it: numbers stay numbers, the
/// rest is text, nothing is validated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
}

impl FieldValue {
    /// integer if it parses as one, the raw text otherwise.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().parse() {
            Ok(n) => FieldValue::Number(n),
            Err(_) => FieldValue::Text(raw.to_owned()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(val: &str) -> Self {
        FieldValue::Text(val.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(val: String) -> Self {
        FieldValue::Text(val)
    }
}

impl From<i64> for FieldValue {
    fn from(val: i64) -> Self {
        FieldValue::Number(val)
    }
}

/// a json leaf the server may send either quoted or bare (ids, sums).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    /// `false`, zero and `""` are falsy, as in a browser `if`.
    pub fn is_falsy(&self) -> bool {
        match self {
            Scalar::Bool(b) => !b,
            Scalar::Number(n) => n.as_f64() == Some(0.0),
            Scalar::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub path: String,
    pub method: Method,
    pub encoding: Encoding,
    pub payload: Vec<(String, FieldValue)>,
    pub headers: Vec<(String, String)>,
}

impl ActionRequest {
    pub fn new(method: Method, path: String, encoding: Encoding) -> Self {
        Self {
            path,
            method,
            encoding,
            payload: Vec::new(),
            headers: vec![(MARKER_HEADER.to_owned(), MARKER_VALUE.to_owned())],
        }
    }

    pub fn field<K: Into<String>, V: Into<FieldValue>>(mut self, name: K, value: V) -> Self {
        self.payload.push((name.into(), value.into()));
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_token(self, token: String) -> Self {
        self.header(CSRF_HEADER, token)
    }

    /// header lookup is case-insensitive, like http.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_state_changing(&self) -> bool {
        self.method == Method::Post
    }

    /// payload as a json object, later fields overwrite earlier ones.
    pub fn json_body(&self) -> Value {
        let mut body = Map::new();
        for (name, value) in &self.payload {
            let value = match value {
                FieldValue::Number(n) => Value::from(*n),
                FieldValue::Text(s) => Value::from(s.as_str()),
            };
            body.insert(name.clone(), value);
        }
        Value::Object(body)
    }
}

/// outcome of one request, consumed once.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ActionResult {
    Success(Value),
    Failure { status: Option<u16>, message: String },
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    pub fn into_result(self) -> Result<Value> {
        match self {
            ActionResult::Success(value) => Ok(value),
            ActionResult::Failure { status, message } => Err(Error::TransportFailure { status, message }),
        }
    }
}
