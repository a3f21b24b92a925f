use crate::utils::error::{ReportError, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use url::Url;

/// Where the stock export lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(Url),
}

impl DataSource {
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let url = Url::parse(source).map_err(|e| ReportError::InvalidConfigValueError {
                field: "source".to_string(),
                value: source.to_string(),
                reason: format!("Invalid URL format: {}", e),
            })?;
            Ok(DataSource::Url(url))
        } else {
            Ok(DataSource::File(PathBuf::from(source)))
        }
    }

    /// File name shown in report captions.
    pub fn display_name(&self) -> String {
        match self {
            DataSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            DataSource::Url(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| url.to_string()),
        }
    }

    /// Lower-cased file extension, used to pick the decoder.
    pub fn extension(&self) -> Option<String> {
        let name = self.display_name();
        Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn fetch(&self, source: &DataSource) -> Result<Vec<u8>> {
        match source {
            DataSource::File(path) => {
                tracing::debug!("Reading source file: {}", path.display());
                let data = tokio::fs::read(path).await.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        std::io::Error::new(e.kind(), path.display().to_string())
                    } else {
                        e
                    }
                })?;
                Ok(data)
            }
            DataSource::Url(url) => {
                tracing::debug!("Downloading source from: {}", url);
                let response = self.client.get(url.clone()).send().await?;
                tracing::debug!("Source response status: {}", response.status());

                if !response.status().is_success() {
                    return Err(ReportError::HttpStatusError {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                    });
                }

                let bytes = response.bytes().await?;
                Ok(bytes.to_vec())
            }
        }
    }
}
