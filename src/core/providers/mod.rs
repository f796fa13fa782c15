//! Dictionary providers
//!
//! A provider knows where a word lives on the web, how to fetch it, how to
//! turn the response into a [`Record`] and how to print that record. The
//! lookup pipeline only ever sees `dyn Provider`.

pub mod http;
pub mod urban;
pub mod yahoo;

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use crate::core::record::Record;
use crate::error::{ConfigError, LookupError, NetworkError};
use crate::ui::Painter;

pub use http::HttpFetcher;
pub use urban::UrbanDictionary;
pub use yahoo::YahooDictionary;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier, also the `source` part of cache keys
    fn name(&self) -> &'static str;

    /// Human-readable name
    fn title(&self) -> &'static str;

    /// URL queried for `word`. Pure, no I/O.
    fn build_target(&self, word: &str) -> String;

    /// Fetch the raw response for `word`.
    ///
    /// Fails with [`LookupError::Timeout`] when the provider does not answer
    /// within `timeout` and [`LookupError::Network`] for transport failures.
    async fn fetch_raw(&self, word: &str, timeout: Duration) -> Result<String, LookupError>;

    /// Turn a raw response into a record tagged with [`Provider::name`].
    ///
    /// Fails with [`LookupError::NotFound`] when the response says the word has
    /// no entry, and [`LookupError::Provider`] when the response has an
    /// unexpected shape.
    fn parse(&self, word: &str, raw: &str) -> Result<Record, LookupError>;

    /// Print a record. `verbose` adds extended sections when the provider has
    /// any. Only terminal I/O errors are returned.
    fn render(&self, record: &Record, verbose: bool, painter: &mut Painter<'_>) -> io::Result<()>;
}

/// Built-in dictionaries, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    Urban,
    Yahoo,
}

impl ProviderKind {
    pub fn all() -> &'static [ProviderKind] {
        &[ProviderKind::Urban, ProviderKind::Yahoo]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Urban => urban::PROVIDER_NAME,
            ProviderKind::Yahoo => yahoo::PROVIDER_NAME,
        }
    }

    pub fn build(&self, http: HttpFetcher) -> Result<Box<dyn Provider>, NetworkError> {
        Ok(match self {
            ProviderKind::Urban => Box::new(UrbanDictionary::new(http)?),
            ProviderKind::Yahoo => Box::new(YahooDictionary::new(http)?),
        })
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownDictionary {
                name: s.to_string(),
            })
    }
}
