//! Request and response envelopes shared by every resource kind.

use serde::Serialize;
use serde_json::Value;

/// One call against a resource kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Raw `Authorization` header value.
    pub authorization: Option<String>,
    /// Kind name (`epic`) or table name (`epics`).
    pub kind: String,
    pub action: Action,
}

impl ApiRequest {
    pub fn new(authorization: Option<String>, kind: impl Into<String>, action: Action) -> Self {
        Self {
            authorization,
            kind: kind.into(),
            action,
        }
    }
}

/// The five operations every kind supports. Ids travel as raw strings and
/// are validated by the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create(Value),
    List,
    Get(String),
    Update(String, Value),
    Remove(String),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::List => "list",
            Self::Get(_) => "get",
            Self::Update(..) => "update",
            Self::Remove(_) => "remove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    Ok,
    Created,
    NoContent,
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    Failed,
}

impl ApiStatus {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Created | Self::NoContent)
    }

    /// Closest HTTP status code, for transports that need one.
    pub fn http_code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Failed => 500,
        }
    }
}

/// Response envelope returned for every request, success or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: ApiStatus,
    /// Record, record list, or nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Human-readable message for diagnostics.
    pub message: String,
}

impl ApiResponse {
    pub fn ok(body: Value, message: impl Into<String>) -> Self {
        Self::with_body(ApiStatus::Ok, body, message)
    }

    pub fn created(body: Value, message: impl Into<String>) -> Self {
        Self::with_body(ApiStatus::Created, body, message)
    }

    pub fn no_content(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::NoContent,
            body: None,
            message: message.into(),
        }
    }

    pub fn failure(status: ApiStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            body: None,
            message: message.into(),
        }
    }

    fn with_body(status: ApiStatus, body: Value, message: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body),
            message: message.into(),
        }
    }
}
