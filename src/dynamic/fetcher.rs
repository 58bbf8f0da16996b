//! Remote property fetch.
//!
//! # Responsibilities
//! - Retrieve a flat property snapshot from a URL
//! - Classify every problem (I/O, HTTP, status, parse) as a fetch failure
//!
//! # Design Decisions
//! - Fetching is a plain blocking call; the poller decides which thread runs it
//! - Every request carries its own timeout, so a hung source surfaces as a failure

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use url::Url;

use crate::dynamic::properties::{parse_properties, PropertiesError};
use crate::dynamic::snapshot::PollingSnapshot;

/// Default per-request timeout for [`PropertiesReader`].
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while fetching a remote snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Local file source could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Request could not be sent or the body could not be read, timeouts included.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Body is not a valid property list.
    #[error("invalid property list: {0}")]
    Parse(#[from] PropertiesError),

    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Failure reported by a custom fetcher.
    #[error("{0}")]
    Other(String),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Retrieves a property snapshot for a URL.
pub trait RemoteFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> FetchResult<PollingSnapshot>;
}

impl<F> RemoteFetcher for F
where
    F: Fn(&Url) -> FetchResult<PollingSnapshot> + Send + Sync,
{
    fn fetch(&self, url: &Url) -> FetchResult<PollingSnapshot> {
        self(url)
    }
}

/// Reads a `.properties` document over `http(s)://` or `file://`.
///
/// Uses the blocking `reqwest` client. The client is built on first fetch,
/// and building, sending and dropping it all happen off any tokio runtime
/// thread, so the reader can be created, used and dropped from async code.
#[derive(Debug)]
pub struct PropertiesReader {
    timeout: Duration,
    client: OnceLock<reqwest::blocking::Client>,
}

impl PropertiesReader {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceLock::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn client(&self) -> FetchResult<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("iep-platformservice/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(self.client.get_or_init(|| client))
    }

    fn read_http(&self, url: &Url) -> FetchResult<String> {
        off_runtime(|| {
            let http_err = |source| FetchError::Http {
                url: url.to_string(),
                source,
            };

            let response = self.client()?.get(url.clone()).send().map_err(http_err)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            response.text().map_err(http_err)
        })
    }

    fn read_file(url: &Url) -> FetchResult<String> {
        let path = url
            .to_file_path()
            .map_err(|_| FetchError::UnsupportedScheme(format!("file URL without a local path: {}", url)))?;
        fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
    }
}

impl Default for PropertiesReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PropertiesReader {
    fn drop(&mut self) {
        // The blocking client owns a runtime; it must not be torn down on a
        // thread that is driving async tasks.
        if let Some(client) = self.client.take() {
            if Handle::try_current().is_ok() {
                thread::spawn(move || drop(client));
            }
        }
    }
}

/// Run `f` on a plain OS thread when the caller sits inside a tokio runtime.
fn off_runtime<T, F>(f: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if Handle::try_current().is_err() {
        return f();
    }
    thread::scope(|s| match s.spawn(f).join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    })
}

impl RemoteFetcher for PropertiesReader {
    fn fetch(&self, url: &Url) -> FetchResult<PollingSnapshot> {
        let body = match url.scheme() {
            "http" | "https" => self.read_http(url)?,
            "file" => Self::read_file(url)?,
            other => return Err(FetchError::UnsupportedScheme(other.to_string())),
        };

        let properties = parse_properties(&body)?;
        tracing::debug!(url = %url, properties = properties.len(), "Fetched remote properties");
        Ok(PollingSnapshot::new(properties))
    }
}
