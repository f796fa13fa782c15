//! Cache-or-fetch lookup pipeline
//!
//! For every word: check the cache, otherwise fetch and parse through the
//! provider, write the fresh record back, then render. Disabling the cache
//! only skips the read; fresh results are always written.
//!
//! Failures are reported per word and never abort a batch.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::data::CacheStore;
use crate::core::providers::Provider;
use crate::core::record::Record;
use crate::error::LookupError;
use crate::ui::{Painter, Tone};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct LookupOptions {
    /// Read cached entries. Fresh results are written regardless.
    pub use_cache: bool,
    /// Deadline for each word's fetch
    pub timeout: Duration,
    /// Render extended sections
    pub verbose: bool,
    /// Print the provider's name before each entry
    pub show_provider: bool,
    /// Print the queried URL before each entry
    pub show_url: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            timeout: DEFAULT_TIMEOUT,
            verbose: false,
            show_provider: false,
            show_url: false,
        }
    }
}

/// Where a rendered record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Provider,
}

#[derive(Debug)]
pub enum LookupOutcome {
    Rendered(Origin),
    NotFound,
    Failed(LookupError),
}

pub struct LookupPipeline {
    store: CacheStore,
}

impl LookupPipeline {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Look up each word in order. One word's failure does not stop the rest.
    pub async fn lookup_all(
        &mut self,
        provider: &dyn Provider,
        words: &[String],
        options: &LookupOptions,
        painter: &mut Painter<'_>,
    ) -> Vec<LookupOutcome> {
        let mut outcomes = Vec::with_capacity(words.len());
        for word in words {
            outcomes.push(self.lookup(provider, word, options, painter).await);
        }
        outcomes
    }

    pub async fn lookup(
        &mut self,
        provider: &dyn Provider,
        word: &str,
        options: &LookupOptions,
        painter: &mut Painter<'_>,
    ) -> LookupOutcome {
        if let Err(e) = announce(provider, word, options, painter) {
            warn!("Failed to write lookup header for {}: {}", word, e);
        }

        let (record, origin) = match self.cached(provider.name(), word, options) {
            Some(record) => (record, Origin::Cache),
            None => match fetch_and_parse(provider, word, options.timeout).await {
                Ok(record) => {
                    self.save(&record);
                    (record, Origin::Provider)
                }
                Err(e) => return report(provider, word, e, painter),
            },
        };

        if let Err(e) = provider.render(&record, options.verbose, painter) {
            warn!("Failed to write entry for {}: {}", word, e);
        }

        LookupOutcome::Rendered(origin)
    }

    fn cached(&self, source: &str, word: &str, options: &LookupOptions) -> Option<Record> {
        if !options.use_cache {
            debug!("Cache reads disabled, fetching {} from {}", word, source);
            return None;
        }

        match self.store.exists(source, word) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Cache miss for {} from {}", word, source);
                return None;
            }
            Err(e) => {
                warn!("Cache check failed for {} from {}, fetching instead: {}", word, source, e);
                return None;
            }
        }

        match self.store.get(source, word) {
            Ok(record) => {
                debug!("Cache hit for {} from {}", word, source);
                Some(record)
            }
            Err(e) => {
                warn!("Ignoring unreadable cache entry: {}", e);
                None
            }
        }
    }

    fn save(&mut self, record: &Record) {
        if let Err(e) = self.store.put(record) {
            warn!(
                "Failed to cache {} entry for {}: {}",
                record.source(),
                record.word(),
                e
            );
        }
    }
}

async fn fetch_and_parse(
    provider: &dyn Provider,
    word: &str,
    timeout: Duration,
) -> Result<Record, LookupError> {
    debug!("Fetching {} from {}", word, provider.name());

    let raw = match tokio::time::timeout(timeout, provider.fetch_raw(word, timeout)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(LookupError::Timeout {
                word: word.to_string(),
                after: timeout,
            })
        }
    };

    let record = provider.parse(word, &raw)?;
    if record.source() != provider.name() || record.word() != word {
        return Err(LookupError::provider(
            provider.name(),
            format!(
                "record tagged as {}/{} for lookup of {}",
                record.source(),
                record.word(),
                word
            ),
        ));
    }

    Ok(record)
}

fn announce(
    provider: &dyn Provider,
    word: &str,
    options: &LookupOptions,
    painter: &mut Painter<'_>,
) -> std::io::Result<()> {
    if options.show_provider {
        painter.line(&format!("[{}]", provider.title()), Tone::Meta, 0)?;
    }
    if options.show_url {
        painter.line(&provider.build_target(word), Tone::Meta, 0)?;
    }
    Ok(())
}

fn report(
    provider: &dyn Provider,
    word: &str,
    error: LookupError,
    painter: &mut Painter<'_>,
) -> LookupOutcome {
    let (message, tone, outcome) = match error {
        LookupError::NotFound { .. } => {
            info!("No entry for {} in {}", word, provider.name());
            (
                format!("No entry found for \"{}\" in {}", word, provider.title()),
                Tone::Notice,
                LookupOutcome::NotFound,
            )
        }
        other => {
            warn!(kind = other.kind(), "Lookup of {} failed: {}", word, other);
            (format!("Error: {}", other), Tone::Error, LookupOutcome::Failed(other))
        }
    };

    let written = painter
        .line(&message, tone, 0)
        .and_then(|_| painter.newline());
    if let Err(e) = written {
        warn!("Failed to report lookup result for {}: {}", word, e);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const NAME: &str = "P";

    enum Scripted {
        Body(&'static str),
        Offline,
        Hang,
    }

    /// Provider answering from a fixed script instead of the network
    struct ScriptedProvider {
        responses: HashMap<&'static str, Scripted>,
        fetches: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<(&'static str, Scripted)>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn offline() -> Self {
            Self::new(Vec::new())
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &'static str {
            NAME
        }

        fn title(&self) -> &'static str {
            "Scripted"
        }

        fn build_target(&self, word: &str) -> String {
            format!("https://dict.test/{}", word)
        }

        async fn fetch_raw(&self, word: &str, _timeout: Duration) -> Result<String, LookupError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(word) {
                Some(Scripted::Body(body)) => Ok(body.to_string()),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok("too late".to_string())
                }
                Some(Scripted::Offline) | None => Err(NetworkError::Status {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    url: self.build_target(word),
                }
                .into()),
            }
        }

        fn parse(&self, word: &str, raw: &str) -> Result<Record, LookupError> {
            if raw.contains("no_results") {
                return Err(LookupError::NotFound {
                    word: word.to_string(),
                });
            }
            if raw == "garbage" {
                return Err(LookupError::provider(NAME, "unexpected body"));
            }
            Record::new(word, json!({ "text": raw }), NAME)
        }

        fn render(&self, record: &Record, verbose: bool, painter: &mut Painter<'_>) -> io::Result<()> {
            painter.line(record.content()["text"].as_str().unwrap_or(""), Tone::Definition, 0)?;
            if verbose {
                painter.line("extended", Tone::Meta, 0)?;
            }
            Ok(())
        }
    }

    fn pipeline() -> LookupPipeline {
        LookupPipeline::new(CacheStore::open_in_memory().unwrap())
    }

    async fn run(
        pipeline: &mut LookupPipeline,
        provider: &ScriptedProvider,
        word: &str,
        options: &LookupOptions,
    ) -> (LookupOutcome, String) {
        let mut buffer = Vec::new();
        let outcome = {
            let mut painter = Painter::plain(&mut buffer);
            pipeline.lookup(provider, word, options, &mut painter).await
        };
        (outcome, String::from_utf8(buffer).unwrap())
    }

    fn stored(pipeline: &LookupPipeline, word: &str) -> Option<String> {
        let store = pipeline.store();
        if !store.exists(NAME, word).unwrap() {
            return None;
        }
        let record = store.get(NAME, word).unwrap();
        record.content()["text"].as_str().map(str::to_string)
    }

    #[tokio::test]
    async fn test_fresh_lookup_renders_and_caches() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![("hello", Scripted::Body("a greeting"))]);

        let (outcome, output) = run(&mut pipeline, &provider, "hello", &LookupOptions::default()).await;

        assert!(matches!(outcome, LookupOutcome::Rendered(Origin::Provider)));
        assert_eq!(output, "a greeting\n");
        assert_eq!(stored(&pipeline, "hello").as_deref(), Some("a greeting"));
    }

    #[tokio::test]
    async fn test_cached_lookup_skips_network() {
        let mut pipeline = pipeline();
        let online = ScriptedProvider::new(vec![("hello", Scripted::Body("a greeting"))]);
        run(&mut pipeline, &online, "hello", &LookupOptions::default()).await;

        let offline = ScriptedProvider::offline();
        let (outcome, output) = run(&mut pipeline, &offline, "hello", &LookupOptions::default()).await;

        assert!(matches!(outcome, LookupOutcome::Rendered(Origin::Cache)));
        assert_eq!(output, "a greeting\n");
        assert_eq!(offline.fetches(), 0);
    }

    #[tokio::test]
    async fn test_disabled_cache_refetches_and_overwrites() {
        let mut pipeline = pipeline();
        pipeline
            .store
            .put(&Record::new("hello", json!({ "text": "stale" }), NAME).unwrap())
            .unwrap();

        let provider = ScriptedProvider::new(vec![("hello", Scripted::Body("fresh"))]);
        let options = LookupOptions {
            use_cache: false,
            ..LookupOptions::default()
        };
        let (outcome, output) = run(&mut pipeline, &provider, "hello", &options).await;

        assert!(matches!(outcome, LookupOutcome::Rendered(Origin::Provider)));
        assert_eq!(output, "fresh\n");
        assert_eq!(provider.fetches(), 1);
        assert_eq!(stored(&pipeline, "hello").as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_not_found_is_reported_and_never_cached() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![("qwxz", Scripted::Body("{\"result_type\":\"no_results\"}"))]);

        let (outcome, output) = run(&mut pipeline, &provider, "qwxz", &LookupOptions::default()).await;

        assert!(matches!(outcome, LookupOutcome::NotFound));
        assert_eq!(output, "No entry found for \"qwxz\" in Scripted\n\n");
        assert_eq!(stored(&pipeline, "qwxz"), None);
    }

    #[tokio::test]
    async fn test_not_found_leaves_existing_entry_untouched() {
        let mut pipeline = pipeline();
        pipeline
            .store
            .put(&Record::new("gone", json!({ "text": "old entry" }), NAME).unwrap())
            .unwrap();

        let provider = ScriptedProvider::new(vec![("gone", Scripted::Body("no_results"))]);
        let options = LookupOptions {
            use_cache: false,
            ..LookupOptions::default()
        };
        let (outcome, _) = run(&mut pipeline, &provider, "gone", &options).await;

        assert!(matches!(outcome, LookupOutcome::NotFound));
        assert_eq!(stored(&pipeline, "gone").as_deref(), Some("old entry"));
    }

    #[tokio::test]
    async fn test_timeout_is_reported_without_cache_write() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![("slow", Scripted::Hang)]);
        let options = LookupOptions {
            timeout: Duration::from_millis(50),
            ..LookupOptions::default()
        };

        let (outcome, output) = run(&mut pipeline, &provider, "slow", &options).await;

        assert!(matches!(outcome, LookupOutcome::Failed(LookupError::Timeout { .. })));
        assert!(output.starts_with("Error: Query for \"slow\" timed out"));
        assert_eq!(stored(&pipeline, "slow"), None);
    }

    #[tokio::test]
    async fn test_network_failure_is_reported_without_cache_write() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![("hello", Scripted::Offline)]);

        let (outcome, output) = run(&mut pipeline, &provider, "hello", &LookupOptions::default()).await;

        assert!(matches!(outcome, LookupOutcome::Failed(LookupError::Network(_))));
        assert_eq!(provider.fetches(), 1);
        assert!(output.contains("503"));
        assert_eq!(stored(&pipeline, "hello"), None);
    }

    #[tokio::test]
    async fn test_malformed_response_is_provider_error() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![("hello", Scripted::Body("garbage"))]);

        let (outcome, _) = run(&mut pipeline, &provider, "hello", &LookupOptions::default()).await;

        assert!(matches!(outcome, LookupOutcome::Failed(LookupError::Provider { .. })));
        assert_eq!(stored(&pipeline, "hello"), None);
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_falls_back_to_fetch() {
        let mut pipeline = pipeline();
        pipeline.store.write_raw(NAME, "hello", "{truncated").unwrap();
        let provider = ScriptedProvider::new(vec![("hello", Scripted::Body("repaired"))]);

        let (outcome, output) = run(&mut pipeline, &provider, "hello", &LookupOptions::default()).await;

        assert!(matches!(outcome, LookupOutcome::Rendered(Origin::Provider)));
        assert_eq!(output, "repaired\n");
        assert_eq!(stored(&pipeline, "hello").as_deref(), Some("repaired"));
    }

    #[tokio::test]
    async fn test_batch_continues_after_failures() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![
            ("missing", Scripted::Body("no_results")),
            ("hello", Scripted::Body("a greeting")),
        ]);
        let words: Vec<String> = ["missing", "offline", "hello"].iter().map(|w| w.to_string()).collect();

        let mut buffer = Vec::new();
        let outcomes = {
            let mut painter = Painter::plain(&mut buffer);
            pipeline
                .lookup_all(&provider, &words, &LookupOptions::default(), &mut painter)
                .await
        };

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], LookupOutcome::NotFound));
        assert!(matches!(outcomes[1], LookupOutcome::Failed(_)));
        assert!(matches!(outcomes[2], LookupOutcome::Rendered(Origin::Provider)));
        assert!(String::from_utf8(buffer).unwrap().ends_with("a greeting\n"));
    }

    #[tokio::test]
    async fn test_header_and_verbose_options() {
        let mut pipeline = pipeline();
        let provider = ScriptedProvider::new(vec![("hello", Scripted::Body("a greeting"))]);
        let options = LookupOptions {
            verbose: true,
            show_provider: true,
            show_url: true,
            ..LookupOptions::default()
        };

        let (_, output) = run(&mut pipeline, &provider, "hello", &options).await;

        assert_eq!(
            output,
            "[Scripted]\nhttps://dict.test/hello\na greeting\nextended\n"
        );
    }
}
