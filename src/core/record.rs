//! The normalized result of one successful lookup

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CacheError, LookupError};

/// One looked-up word from one provider.
///
/// A `Record` only exists after a provider parsed a response successfully, so
/// every field is always populated. Fields are private to keep it immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    word: String,
    content: Value,
    source: String,
}

impl Record {
    pub fn new(
        word: impl Into<String>,
        content: Value,
        source: impl Into<String>,
    ) -> Result<Self, LookupError> {
        let word = word.into();
        let source = source.into();

        if word.is_empty() {
            return Err(LookupError::InvalidRecord("word is empty".to_string()));
        }
        if source.is_empty() {
            return Err(LookupError::InvalidRecord("source is empty".to_string()));
        }
        if content.is_null() {
            return Err(LookupError::InvalidRecord(format!(
                "content for \"{}\" is empty",
                word
            )));
        }

        Ok(Self {
            word,
            content,
            source,
        })
    }

    /// Rebuild a record from the text form kept in the cache
    pub fn from_stored(word: &str, content: &str, source: &str) -> Result<Self, CacheError> {
        let corrupt = |reason: String| CacheError::Corrupt {
            source_name: source.to_string(),
            word: word.to_string(),
            reason,
        };

        let value: Value = serde_json::from_str(content).map_err(|e| corrupt(e.to_string()))?;
        Record::new(word, value, source).map_err(|e| corrupt(e.to_string()))
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text form of the content, as written to the cache
    pub fn content_text(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string(&self.content)?)
    }

    /// Decode the content into the provider's own payload type
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.content)
    }
}
