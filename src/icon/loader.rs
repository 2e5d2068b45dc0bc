use super::{CompositionError, IconSource};
use base64::Engine;
use percent_encoding::percent_decode_str;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, CompositionError>> + Send + 'a>>;

/// Fetches the raw bytes behind an icon source.
pub trait SourceLoader: Send + Sync + 'static {
    fn load<'a>(&'a self, source: &'a IconSource) -> LoadFuture<'a>;
}

pub struct UrlLoader {
    client: reqwest::Client,
}

impl UrlLoader {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeouts(CONNECT_TIMEOUT, REQUEST_TIMEOUT)
    }

    /// A stalled server fails the load with `SourceLoad` once `request` elapses.
    pub fn with_timeouts(connect: Duration, request: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("badge-shell/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect)
            .timeout(request)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, source: &IconSource) -> Result<Vec<u8>, CompositionError> {
        let failed = |reason: String| CompositionError::SourceLoad {
            url: source.to_string(),
            reason,
        };

        match Location::parse(source.url()).map_err(failed)? {
            Location::File(path) => tokio::fs::read(&path).await.map_err(|e| failed(e.to_string())),
            Location::Data(payload) => decode_data_url(&payload).map_err(failed),
            Location::Remote(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| failed(e.to_string()))?;
                let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}

impl SourceLoader for UrlLoader {
    fn load<'a>(&'a self, source: &'a IconSource) -> LoadFuture<'a> {
        Box::pin(self.fetch(source))
    }
}

#[derive(Debug, PartialEq)]
enum Location {
    File(PathBuf),
    Data(String),
    Remote(url::Url),
}

impl Location {
    fn parse(raw: &str) -> Result<Self, String> {
        if let Some(payload) = raw.strip_prefix("data:") {
            return Ok(Location::Data(payload.to_string()));
        }

        let url = match url::Url::parse(raw) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(Location::File(PathBuf::from(raw))),
            Err(e) => return Err(e.to_string()),
        };

        match url.scheme() {
            "file" => url
                .to_file_path()
                .map(Location::File)
                .map_err(|_| format!("not a local file url: {}", raw)),
            "http" | "https" => Ok(Location::Remote(url)),
            // Windows drive letters parse as a one-letter scheme.
            scheme if scheme.len() == 1 => Ok(Location::File(PathBuf::from(raw))),
            scheme => Err(format!("unsupported scheme: {}", scheme)),
        }
    }
}

fn decode_data_url(payload: &str) -> Result<Vec<u8>, String> {
    let (header, data) = payload
        .split_once(',')
        .ok_or_else(|| "malformed data url".to_string())?;

    if header.ends_with(";base64") {
        return base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| e.to_string());
    }

    Ok(percent_decode_str(data).collect())
}
