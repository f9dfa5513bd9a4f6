//! Per-kind request handling on top of [`ResourceService`].
//!
//! # Responsibility
//! - Decode ids and JSON bodies into the kind's typed fields and patches.
//! - Encode records as camelCase JSON, exposing the parent under its relation.
//! - Translate `CoreError` into exactly one `ApiStatus`.

use crate::envelope::{Action, ApiResponse, ApiStatus};
use log::{debug, warn};
use opsdesk_core::{
    Clock, CoreError, DbPool, KindConfig, Record, RecordId, ResourceKind, ResourceService,
    SqliteStore, Store, SystemClock,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Type-erased handler for one resource kind.
pub trait ResourceHandler: Send + Sync {
    fn config(&self) -> KindConfig;
    fn handle(&self, action: Action) -> ApiResponse;
}

/// Endpoint serving one kind through its resource service.
pub struct ResourceEndpoint<K, S = SqliteStore<K>, C = SystemClock> {
    service: ResourceService<K, S, C>,
}

impl<K: ResourceKind> ResourceEndpoint<K> {
    pub fn from_pool(pool: DbPool) -> Self {
        Self::new(ResourceService::new(SqliteStore::new(pool)))
    }
}

impl<K: ResourceKind, S: Store<K>, C: Clock> ResourceEndpoint<K, S, C> {
    pub fn new(service: ResourceService<K, S, C>) -> Self {
        Self { service }
    }

    fn dispatch(&self, action: Action) -> Result<ApiResponse, EndpointError> {
        let name = K::CONFIG.name;
        match action {
            Action::Create(body) => {
                let input: K::Fields = decode_body(name, body)?;
                let record = self.service.create(input)?;
                Ok(ApiResponse::created(
                    encode_record(&K::CONFIG, &record)?,
                    format!("{name} created."),
                ))
            }
            Action::List => {
                let records = self.service.find_all()?;
                let count = records.len();
                let items = records
                    .iter()
                    .map(|record| encode_record(&K::CONFIG, record))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ApiResponse::ok(
                    Value::Array(items),
                    format!("Found {count} {name} record(s)."),
                ))
            }
            Action::Get(raw_id) => {
                let record = self.service.find_one(parse_id(&raw_id)?)?;
                Ok(ApiResponse::ok(
                    encode_record(&K::CONFIG, &record)?,
                    format!("{name} found."),
                ))
            }
            Action::Update(raw_id, body) => {
                let id = parse_id(&raw_id)?;
                let patch: K::Patch = decode_body(name, body)?;
                let record = self.service.update(id, patch)?;
                Ok(ApiResponse::ok(
                    encode_record(&K::CONFIG, &record)?,
                    format!("{name} updated."),
                ))
            }
            Action::Remove(raw_id) => {
                self.service.remove(parse_id(&raw_id)?)?;
                Ok(ApiResponse::no_content(format!("{name} removed.")))
            }
        }
    }
}

impl<K: ResourceKind, S: Store<K>, C: Clock> ResourceHandler for ResourceEndpoint<K, S, C> {
    fn config(&self) -> KindConfig {
        K::CONFIG
    }

    fn handle(&self, action: Action) -> ApiResponse {
        let action_name = action.name();
        match self.dispatch(action) {
            Ok(response) => {
                debug!(
                    "event=api_request module=api status=ok kind={} action={} api_status={:?}",
                    K::CONFIG.name,
                    action_name,
                    response.status
                );
                response
            }
            Err(err) => {
                let status = err.status();
                warn!(
                    "event=api_request module=api status=error kind={} action={} api_status={:?} error={}",
                    K::CONFIG.name,
                    action_name,
                    status,
                    err
                );
                ApiResponse::failure(status, format!("{action_name} failed: {err}"))
            }
        }
    }
}

#[derive(Debug, Error)]
enum EndpointError {
    #[error("invalid id `{0}`")]
    InvalidId(String),
    #[error("invalid {kind} body: {message}")]
    InvalidBody { kind: &'static str, message: String },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl EndpointError {
    fn status(&self) -> ApiStatus {
        match self {
            Self::InvalidId(_) | Self::InvalidBody { .. } => ApiStatus::BadRequest,
            Self::Core(CoreError::NotFound { .. }) => ApiStatus::NotFound,
            Self::Core(CoreError::InvalidPatch { .. }) => ApiStatus::BadRequest,
            Self::Core(CoreError::Storage(err)) if err.is_constraint_violation() => {
                ApiStatus::Conflict
            }
            Self::Core(CoreError::Storage(_)) | Self::Encode(_) => ApiStatus::Failed,
        }
    }
}

fn parse_id(raw: &str) -> Result<RecordId, EndpointError> {
    Uuid::parse_str(raw.trim()).map_err(|_| EndpointError::InvalidId(raw.to_string()))
}

fn decode_body<T: DeserializeOwned>(kind: &'static str, body: Value) -> Result<T, EndpointError> {
    // serde would otherwise accept a JSON array as a positional struct.
    if !body.is_object() {
        return Err(EndpointError::InvalidBody {
            kind,
            message: "expected a JSON object".to_string(),
        });
    }
    serde_json::from_value(body).map_err(|err| EndpointError::InvalidBody {
        kind,
        message: err.to_string(),
    })
}

fn encode_record<F: Serialize>(
    config: &KindConfig,
    record: &Record<F>,
) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(record)?;
    if let (Some(parent_ref), Value::Object(map)) = (config.parent, &mut value) {
        if let Some(parent) = map.remove("parent") {
            map.insert(parent_ref.relation.to_string(), parent);
        }
    }
    Ok(value)
}
