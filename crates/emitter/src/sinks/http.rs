//! HttpSink - POSTs JSON records to a lineage collector

use std::io::Write;
use std::time::Duration;

use contracts::{AuthKind, Compression, ContractError, LineageRecord, LineageSink, TransportConfig};
use flate2::write::GzEncoder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::error::EmitterError;

/// HTTP transport settings
#[derive(Debug, Clone)]
pub struct HttpSinkConfig {
    /// `{url}{endpoint}`
    pub target: Url,
    pub timeout: Duration,
    pub gzip: bool,
    /// Sent on every request, auth included
    pub headers: HeaderMap,
}

impl HttpSinkConfig {
    /// Build from transport config
    ///
    /// `Ok(None)` when no usable url is configured.
    pub fn from_transport(transport: &TransportConfig) -> Result<Option<Self>, EmitterError> {
        let Some(base) = transport
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
        else {
            return Ok(None);
        };

        let joined = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            transport.endpoint.trim_start_matches('/')
        );
        let Ok(target) = Url::parse(&joined) else {
            return Ok(None);
        };

        let mut headers = HeaderMap::new();
        for (key, value) in &transport.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| EmitterError::sink_creation("http", format!("header '{key}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| EmitterError::sink_creation("http", format!("header '{key}': {e}")))?;
            headers.insert(name, value);
        }
        if let Some(auth) = &transport.auth {
            match auth.kind {
                AuthKind::ApiKey => {
                    let mut value = HeaderValue::from_str(&format!("Bearer {}", auth.api_key))
                        .map_err(|e| EmitterError::sink_creation("http", format!("api key: {e}")))?;
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
            }
        }

        Ok(Some(Self {
            target,
            timeout: transport.timeout(),
            gzip: transport.compression == Some(Compression::Gzip),
            headers,
        }))
    }
}

/// Sink that posts each record to an HTTP endpoint
pub struct HttpSink {
    name: String,
    config: HttpSinkConfig,
    client: Client,
}

impl HttpSink {
    pub fn new(name: impl Into<String>, config: HttpSinkConfig) -> Result<Self, EmitterError> {
        let name = name.into();
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(config.headers.clone())
            .build()
            .map_err(|e| EmitterError::sink_creation(&name, e.to_string()))?;

        debug!(sink = %name, target = %config.target, gzip = config.gzip, "HttpSink created");
        Ok(Self {
            name,
            config,
            client,
        })
    }

    pub fn target(&self) -> &Url {
        &self.config.target
    }

    fn encode(&self, record: &LineageRecord) -> Result<Vec<u8>, ContractError> {
        let json = serde_json::to_vec(record)
            .map_err(|e| ContractError::serialization(record.job_name(), e))?;
        if !self.config.gzip {
            return Ok(json);
        }
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }

    fn request_error(&self, e: reqwest::Error) -> ContractError {
        if e.is_connect() || e.is_timeout() {
            ContractError::sink_connection(&self.name, e.to_string())
        } else {
            ContractError::sink_write(&self.name, e.to_string())
        }
    }
}

impl LineageSink for HttpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_sink_emit",
        skip(self, record),
        fields(sink = %self.name, job = %record.job_name())
    )]
    async fn emit(&self, record: &LineageRecord) -> Result<(), ContractError> {
        let body = self.encode(record)?;

        let mut request = self
            .client
            .post(self.config.target.clone())
            .header(CONTENT_TYPE, "application/json");
        if self.config.gzip {
            request = request.header(CONTENT_ENCODING, "gzip");
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status.is_success() {
            debug!(sink = %self.name, status = status.as_u16(), "Record posted");
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(ContractError::sink_write(
            &self.name,
            format!("{status}: {}", text.trim()),
        ))
    }

    #[instrument(name = "http_sink_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "HttpSink closed");
        Ok(())
    }
}
