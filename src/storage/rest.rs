//! REST implementation of RemoteCollectionSource
//!
//! Talks to the HR backend's JSON API. Every response is wrapped in an
//! envelope keyed by entity name:
//!
//! ```text
//! GET    {base}/{path}        -> { "success": true, "applicants": [ ... ] }
//! GET    {base}/{path}/{id}   -> { "success": true, "applicant": { ... } }
//! PUT    {base}/{path}/{id}   -> { "success": true, "applicant": { ... } }
//! DELETE {base}/{path}/{id}   -> { "success": true, "message": "..." }
//! POST   {base}/{path}        -> { "success": true, "applicant": { ... } }
//! ```
//!
//! The bearer token is read from the [`SessionContext`] on every call, so a
//! re-login takes effect without rebuilding the source.

use crate::config::{ClientConfig, EntityConfig};
use crate::core::error::{ConfigError, FetchError, MutationError};
use crate::core::record::{Fields, Patch, Record};
use crate::core::service::RemoteCollectionSource;
use crate::core::session::SessionContext;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

fn default_success() -> bool {
    true
}

/// Collection source backed by the HR REST API
#[derive(Clone)]
pub struct RestCollectionSource {
    client: Client,
    collection: Url,
    config: EntityConfig,
    collection_key: String,
    session: SessionContext,
}

impl RestCollectionSource {
    /// Build a source for one entity of `config`
    pub fn new(
        config: &ClientConfig,
        entity: &str,
        session: SessionContext,
    ) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("hrms-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "http_client".to_string(),
                message: e.to_string(),
            })?;
        Self::with_client(
            client,
            &config.base_url,
            config.entity(entity)?.clone(),
            session,
        )
    }

    /// Build a source around an existing HTTP client
    pub fn with_client(
        client: Client,
        base_url: &str,
        config: EntityConfig,
        session: SessionContext,
    ) -> Result<Self, ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            field: "base_url".to_string(),
            message,
        };
        let mut collection = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        collection
            .path_segments_mut()
            .map_err(|_| invalid(format!("'{base_url}' cannot carry a path")))?
            .pop_if_empty()
            .extend(config.path.split('/').filter(|segment| !segment.is_empty()));

        let collection_key = config.collection_key();
        Ok(Self {
            client,
            collection,
            config,
            collection_key,
            session,
        })
    }

    pub fn collection_url(&self) -> Url {
        self.collection.clone()
    }

    /// Record endpoint; the id is percent-encoded as one path segment
    pub fn record_url(&self, id: &str) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(id);
        }
        url
    }

    fn entity_name(&self) -> String {
        self.config.singular.clone()
    }

    /// Send a request and unwrap the envelope
    ///
    /// `id` is set for single-record calls, where a 404 means the record
    /// is gone rather than the endpoint.
    async fn send(&self, request: RequestBuilder, id: Option<&str>) -> Result<Envelope, FetchError> {
        let token = self.session.token()?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                entity: self.entity_name(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FetchError::Transport {
            entity: self.entity_name(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(entity = %self.config.singular, status = status.as_u16(), "request failed");
            return Err(self.status_error(status, &body, id));
        }

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| FetchError::MalformedEnvelope {
                entity: self.entity_name(),
                message: e.to_string(),
            })?;
        if !envelope.success {
            return Err(FetchError::Rejected {
                entity: self.entity_name(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(envelope)
    }

    fn status_error(&self, status: StatusCode, body: &str, id: Option<&str>) -> FetchError {
        let entity = self.entity_name();
        match (status, id) {
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
                FetchError::Unauthorized { entity }
            }
            (StatusCode::NOT_FOUND, Some(id)) => FetchError::NotFound {
                entity,
                id: id.to_string(),
            },
            _ => FetchError::Status {
                entity,
                status: status.as_u16(),
                message: backend_message(status, body),
            },
        }
    }

    fn take_record(&self, envelope: &mut Envelope) -> Option<Result<Record, FetchError>> {
        let value = envelope.payload.remove(self.config.record_key())?;
        Some(
            Record::from_value(value).map_err(|e| FetchError::MalformedEnvelope {
                entity: self.entity_name(),
                message: format!("invalid '{}': {}", self.config.record_key(), e),
            }),
        )
    }

    fn missing_key(&self, key: &str) -> FetchError {
        FetchError::MalformedEnvelope {
            entity: self.entity_name(),
            message: format!("response has no '{key}'"),
        }
    }
}

/// Best human-readable message for a failed response
fn backend_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

#[async_trait]
impl RemoteCollectionSource for RestCollectionSource {
    fn entity(&self) -> &str {
        &self.config.singular
    }

    async fn fetch_all(&self) -> Result<Vec<Record>, FetchError> {
        let url = self.collection_url();
        tracing::debug!(entity = %self.config.singular, url = %url, "fetching collection");
        let mut envelope = self.send(self.client.get(url), None).await?;

        let items = match envelope.payload.remove(&self.collection_key) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(FetchError::MalformedEnvelope {
                    entity: self.entity_name(),
                    message: format!("'{}' is not an array", self.collection_key),
                });
            }
            None => return Err(self.missing_key(&self.collection_key)),
        };

        items
            .into_iter()
            .map(|item| {
                Record::from_value(item).map_err(|e| FetchError::MalformedEnvelope {
                    entity: self.entity_name(),
                    message: format!("invalid record in '{}': {}", self.collection_key, e),
                })
            })
            .collect()
    }

    async fn fetch_one(&self, id: &str) -> Result<Record, FetchError> {
        let mut envelope = self
            .send(self.client.get(self.record_url(id)), Some(id))
            .await?;
        self.take_record(&mut envelope)
            .unwrap_or_else(|| Err(self.missing_key(self.config.record_key())))
    }

    async fn apply_patch(&self, id: &str, patch: &Patch) -> Result<Record, MutationError> {
        tracing::debug!(entity = %self.config.singular, id, fields = patch.len(), "updating record");
        let mut envelope = self
            .send(self.client.put(self.record_url(id)).json(patch), Some(id))
            .await
            .map_err(|e| MutationError::from_fetch(e, "update"))?;

        match self.take_record(&mut envelope) {
            Some(record) => record.map_err(|e| MutationError::from_fetch(e, "update")),
            // some endpoints only answer with a message
            None => self
                .fetch_one(id)
                .await
                .map_err(|e| MutationError::from_fetch(e, "update")),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), MutationError> {
        tracing::debug!(entity = %self.config.singular, id, "deleting record");
        self.send(self.client.delete(self.record_url(id)), Some(id))
            .await
            .map(|_| ())
            .map_err(|e| MutationError::from_fetch(e, "delete"))
    }

    async fn create(&self, fields: Fields) -> Result<Record, MutationError> {
        tracing::debug!(entity = %self.config.singular, "creating record");
        let mut envelope = self
            .send(self.client.post(self.collection_url()).json(&fields), None)
            .await
            .map_err(|e| MutationError::from_fetch(e, "create"))?;

        self.take_record(&mut envelope)
            .unwrap_or_else(|| Err(self.missing_key(self.config.record_key())))
            .map_err(|e| MutationError::from_fetch(e, "create"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RestCollectionSource {
        let config = ClientConfig::default_config().with_base_url("http://hr.test/api/");
        RestCollectionSource::new(&config, "vacancyRequest", SessionContext::new()).unwrap()
    }

    #[test]
    fn test_urls() {
        let source = source();
        assert_eq!(source.collection_url().as_str(), "http://hr.test/api/vacancy-requests");
        assert_eq!(source.record_url("r1").as_str(), "http://hr.test/api/vacancy-requests/r1");
    }

    #[test]
    fn test_record_id_is_one_segment() {
        let source = source();
        assert_eq!(
            source.record_url("r1/../approve?all=1").as_str(),
            "http://hr.test/api/vacancy-requests/r1%2F..%2Fapprove%3Fall=1"
        );
    }

    #[test]
    fn test_bad_base_url() {
        let config = ClientConfig::default_config().with_base_url("not a url");
        assert!(matches!(
            RestCollectionSource::new(&config, "applicant", SessionContext::new()),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_backend_message() {
        assert_eq!(
            backend_message(StatusCode::BAD_REQUEST, r#"{"success":false,"message":"Invalid status"}"#),
            "Invalid status"
        );
        assert_eq!(backend_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(backend_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }

    #[test]
    fn test_status_mapping() {
        let source = source();
        assert!(matches!(
            source.status_error(StatusCode::FORBIDDEN, "", None),
            FetchError::Unauthorized { .. }
        ));
        assert!(matches!(
            source.status_error(StatusCode::NOT_FOUND, "", Some("r1")),
            FetchError::NotFound { .. }
        ));
        assert!(matches!(
            source.status_error(StatusCode::NOT_FOUND, "", None),
            FetchError::Status { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn test_requires_session() {
        let source = source();
        assert!(matches!(source.fetch_all().await, Err(FetchError::Session(_))));
    }

    #[test]
    fn test_unknown_entity() {
        let config = ClientConfig::default_config();
        assert!(matches!(
            RestCollectionSource::new(&config, "payroll", SessionContext::new()),
            Err(ConfigError::UnknownEntity { .. })
        ));
    }
}
