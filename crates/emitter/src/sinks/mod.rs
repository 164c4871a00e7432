//! Sink implementations
//!
//! Contains ConsoleSink, FileSink and HttpSink, plus the [`TransportSink`]
//! enum the listener drives.

mod console;
mod file;
mod http;

pub use self::console::ConsoleSink;
pub use self::file::FileSink;
pub use self::http::{HttpSink, HttpSinkConfig};

use contracts::{ContractError, LineageRecord, LineageSink, TransportConfig, TransportKind};
use tracing::{info, warn};

use crate::error::EmitterError;

/// Transport selected by `transport.type`
pub enum TransportSink {
    Console(ConsoleSink),
    File(FileSink),
    Http(HttpSink),
}

impl TransportSink {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Console(_) => TransportKind::Console,
            Self::File(_) => TransportKind::File,
            Self::Http(_) => TransportKind::Http,
        }
    }
}

impl LineageSink for TransportSink {
    fn name(&self) -> &str {
        match self {
            Self::Console(sink) => sink.name(),
            Self::File(sink) => sink.name(),
            Self::Http(sink) => sink.name(),
        }
    }

    async fn emit(&self, record: &LineageRecord) -> Result<(), ContractError> {
        match self {
            Self::Console(sink) => sink.emit(record).await,
            Self::File(sink) => sink.emit(record).await,
            Self::Http(sink) => sink.emit(record).await,
        }
    }

    async fn close(&self) -> Result<(), ContractError> {
        match self {
            Self::Console(sink) => sink.close().await,
            Self::File(sink) => sink.close().await,
            Self::Http(sink) => sink.close().await,
        }
    }
}

/// Build the transport described by `config`
///
/// An HTTP transport without a usable url falls back to the console.
pub fn create_sink(config: &TransportConfig) -> Result<TransportSink, EmitterError> {
    let sink = match config.kind {
        TransportKind::Console => TransportSink::Console(ConsoleSink::default()),
        TransportKind::File => {
            let sink = FileSink::new("file", &config.file.path).map_err(|e| {
                EmitterError::sink_creation(
                    "file",
                    format!("cannot open {}: {e}", config.file.path.display()),
                )
            })?;
            TransportSink::File(sink)
        }
        TransportKind::Http => match http_sink(config) {
            Ok(Some(sink)) => TransportSink::Http(sink),
            Ok(None) => {
                warn!(
                    url = config.url.as_deref().unwrap_or(""),
                    endpoint = %config.endpoint,
                    "HTTP transport has no usable url, falling back to console"
                );
                TransportSink::Console(ConsoleSink::default())
            }
            Err(e) => {
                warn!(error = %e, "HTTP transport cannot be built, falling back to console");
                TransportSink::Console(ConsoleSink::default())
            }
        },
    };

    info!(sink = %sink.name(), kind = sink.kind().as_str(), "Transport created");
    Ok(sink)
}

fn http_sink(config: &TransportConfig) -> Result<Option<HttpSink>, EmitterError> {
    HttpSinkConfig::from_transport(config)?
        .map(|http| HttpSink::new("http", http))
        .transpose()
}
