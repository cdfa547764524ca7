//! Byte sources feeding the parser
//!
//! Files and (with the `http` feature) URLs are two implementations of the
//! same capability: produce one contiguous buffer. Parsing itself is
//! synchronous and runs once the bytes are in memory.

use std::future::Future;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::animation::AnimationSet;
use crate::error::Result;
#[cfg(not(feature = "http"))]
use crate::error::GlbError;
use crate::parser::AnimationParser;

/// Produces the raw bytes of a container
pub trait ByteSource: Send + Sync {
    /// Read the whole container
    fn read_bytes(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Human readable location, for logs
    fn location(&self) -> String;
}

/// Reads a container from the local filesystem
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    async fn read_bytes(&self) -> Result<Vec<u8>> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(data)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches a container over HTTP(S)
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: reqwest::Url,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| crate::error::GlbError::UnsupportedSource(format!("{url}: {e}")))?;
        Ok(Self {
            url,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
        })
    }

    #[inline]
    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }
}

#[cfg(feature = "http")]
impl ByteSource for HttpSource {
    async fn read_bytes(&self) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn location(&self) -> String {
        self.url.to_string()
    }
}

/// A file or URL picked from a location string
#[derive(Debug, Clone)]
pub enum Source {
    File(FileSource),
    #[cfg(feature = "http")]
    Http(HttpSource),
}

impl Source {
    /// Choose a source: `http://` and `https://` locations are fetched,
    /// everything else is a path
    pub fn from_location(location: &str) -> Result<Self> {
        if is_url(location) {
            #[cfg(feature = "http")]
            {
                Ok(Self::Http(HttpSource::new(location)?))
            }
            #[cfg(not(feature = "http"))]
            {
                Err(GlbError::UnsupportedSource(format!(
                    "{location}: HTTP support is not enabled, build with the `http` feature"
                )))
            }
        } else {
            Ok(Self::File(FileSource::new(location)))
        }
    }
}

impl ByteSource for Source {
    async fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(source) => source.read_bytes().await,
            #[cfg(feature = "http")]
            Self::Http(source) => source.read_bytes().await,
        }
    }

    fn location(&self) -> String {
        match self {
            Self::File(source) => source.location(),
            #[cfg(feature = "http")]
            Self::Http(source) => source.location(),
        }
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read a container from `source` and parse it
pub async fn load_animation_set<S: ByteSource>(
    source: &S,
    parser: &AnimationParser,
) -> Result<AnimationSet> {
    let location = source.location();
    debug!("Reading container from {location}");
    let bytes = source.read_bytes().await?;
    let set = parser.parse(&bytes)?;
    info!(
        "Loaded {} animations from {location} ({} bytes)",
        set.animations().len(),
        bytes.len()
    );
    Ok(set)
}
