use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::capture::ScannedPayload;
use super::ResolverError;
use crate::config::WalletConfig;

/// Registry response for one payload. Every field may be missing or null.
///
/// Field names follow the registry's wire format; the canonical
/// `DocumentRecord` names are accepted as aliases so a stored record can be
/// fed back through normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResolvedRecord {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default, rename = "name", alias = "holderName")]
    pub holder_name: Option<String>,
    #[serde(default, rename = "cpf", alias = "nationalId")]
    pub national_id: Option<String>,
    #[serde(default, rename = "birthDate")]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default, rename = "course", alias = "program")]
    pub program: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub validity: Option<String>,
    #[serde(default, rename = "profilePicture", alias = "portraitRef")]
    pub portrait_ref: Option<String>,
}

/// Lookup of a scanned payload against the document registry (allows mocking).
pub trait DocumentResolver {
    fn resolve(
        &self,
        payload: &ScannedPayload,
    ) -> impl Future<Output = Result<RawResolvedRecord, ResolverError>> + Send;
}

impl<R: DocumentResolver> DocumentResolver for Arc<R> {
    fn resolve(
        &self,
        payload: &ScannedPayload,
    ) -> impl Future<Output = Result<RawResolvedRecord, ResolverError>> + Send {
        (**self).resolve(payload)
    }
}

// ═══════════════════════════════════════════════════════════
// HTTP registry client
// ═══════════════════════════════════════════════════════════

/// Registry envelope: `{ "success": bool?, "message": string?, "data": {...}? }`.
#[derive(Deserialize)]
struct RegistryEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RawResolvedRecord>,
}

/// HTTP client for the external document registry.
///
/// One `GET {base_url}/documents/{payload}` per call. No retry, no cache.
pub struct RegistryClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
    api_token: Option<String>,
}

impl RegistryClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ResolverError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ResolverError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            api_token: None,
        })
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self, ResolverError> {
        let client = Self::new(&config.registry_url, config.request_timeout_secs)?;
        Ok(match &config.api_token {
            Some(token) => client.with_api_token(token.clone()),
            None => client,
        })
    }

    /// Attach the bearer token issued by the external auth service.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Payload goes in as a single, percent-encoded path segment.
    fn lookup_url(&self, payload: &ScannedPayload) -> Result<reqwest::Url, ResolverError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ResolverError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ResolverError::InvalidUrl(self.base_url.clone()))?;
            segments.pop_if_empty().push("documents").push(payload.as_str());
        }
        Ok(url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ResolverError {
        if e.is_timeout() {
            ResolverError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ResolverError::Connection(self.base_url.clone())
        } else {
            ResolverError::HttpClient(e.to_string())
        }
    }
}

impl DocumentResolver for RegistryClient {
    async fn resolve(&self, payload: &ScannedPayload) -> Result<RawResolvedRecord, ResolverError> {
        let url = self.lookup_url(payload)?;

        tracing::debug!(
            source = %payload.source(),
            payload_len = payload.as_str().len(),
            "Resolving payload against registry"
        );

        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(e))?;

        parse_envelope(&bytes)
    }
}

/// Decode a registry body. A missing or null `data` object is an empty
/// record, not a failure.
fn parse_envelope(body: &[u8]) -> Result<RawResolvedRecord, ResolverError> {
    let envelope: RegistryEnvelope = serde_json::from_slice(body)
        .map_err(|e| ResolverError::MalformedResponse(e.to_string()))?;

    if envelope.success == Some(false) {
        return Err(ResolverError::Rejected(
            envelope.message.unwrap_or_else(|| "no message".into()),
        ));
    }

    Ok(envelope.data.unwrap_or_default())
}

// ═══════════════════════════════════════════════════════════
// Mock resolver
// ═══════════════════════════════════════════════════════════

/// Mock resolver for testing: returns a configured response and counts calls.
pub struct MockResolver {
    response: Result<RawResolvedRecord, ResolverError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn returning(record: RawResolvedRecord) -> Self {
        Self {
            response: Ok(record),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ResolverError) -> Self {
        Self {
            response: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hold every call for `delay` before answering (simulates network latency).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentResolver for MockResolver {
    async fn resolve(&self, _payload: &ScannedPayload) -> Result<RawResolvedRecord, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}
