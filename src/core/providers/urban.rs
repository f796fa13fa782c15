//! Urban Dictionary, through its public JSON API

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::io;
use std::time::Duration;
use tracing::warn;
use url::Url;

use super::{HttpFetcher, Provider};
use crate::core::record::Record;
use crate::error::{LookupError, NetworkError};
use crate::ui::{Painter, Tone};

pub const PROVIDER_NAME: &str = "urban";
const API_ENDPOINT: &str = "https://api.urbandictionary.com/v0/define";

#[derive(Deserialize, Debug, Default)]
struct DefineResponse {
    #[serde(default)]
    result_type: Option<String>,
    #[serde(default)]
    list: Vec<Definition>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Definition {
    word: String,
    definition: String,
    example: String,
    author: String,
    thumbs_up: i64,
    thumbs_down: i64,
}

pub struct UrbanDictionary {
    http: HttpFetcher,
    endpoint: Url,
}

impl UrbanDictionary {
    pub fn new(http: HttpFetcher) -> Result<Self, NetworkError> {
        Self::with_endpoint(http, API_ENDPOINT)
    }

    pub fn with_endpoint(http: HttpFetcher, endpoint: &str) -> Result<Self, NetworkError> {
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
        })
    }

    fn render_definition(
        &self,
        entry: &Definition,
        painter: &mut Painter<'_>,
    ) -> io::Result<()> {
        painter.line(&entry.definition, Tone::Definition, 2)?;
        for example in entry.example.lines() {
            let example = example.trim_end_matches('\r');
            if !example.is_empty() {
                painter.line(example, Tone::Example, 2)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Provider for UrbanDictionary {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn title(&self) -> &'static str {
        "Urban Dictionary"
    }

    fn build_target(&self, word: &str) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("term", word);
        url.into()
    }

    async fn fetch_raw(&self, word: &str, timeout: Duration) -> Result<String, LookupError> {
        self.http.get_text(word, &self.build_target(word), timeout).await
    }

    fn parse(&self, word: &str, raw: &str) -> Result<Record, LookupError> {
        let content: Value = serde_json::from_str(raw)
            .map_err(|e| LookupError::provider(PROVIDER_NAME, format!("invalid JSON: {}", e)))?;

        let response = DefineResponse::deserialize(&content)
            .map_err(|e| LookupError::provider(PROVIDER_NAME, e.to_string()))?;

        if response.result_type.as_deref() == Some("no_results") || response.list.is_empty() {
            return Err(LookupError::NotFound {
                word: word.to_string(),
            });
        }

        Record::new(word, content, PROVIDER_NAME)
    }

    fn render(&self, record: &Record, verbose: bool, painter: &mut Painter<'_>) -> io::Result<()> {
        let response: DefineResponse = record.decode().unwrap_or_else(|e| {
            warn!("Stored urban entry for {} does not decode, showing headword only: {}", record.word(), e);
            DefineResponse::default()
        });

        let Some((first, rest)) = response.list.split_first() else {
            painter.line(record.word(), Tone::Headword, 0)?;
            return painter.newline();
        };

        let headword = if first.word.is_empty() { record.word() } else { first.word.as_str() };
        painter.line(headword, Tone::Headword, 0)?;
        self.render_definition(first, painter)?;

        if verbose {
            for entry in rest {
                painter.newline()?;
                painter.line(
                    &format!("by {} (+{} / -{})", entry.author, entry.thumbs_up, entry.thumbs_down),
                    Tone::Meta,
                    0,
                )?;
                self.render_definition(entry, painter)?;
            }
        }

        painter.newline()
    }
}
