use clap::Args;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::cli::interactive;
use crate::config::validation::ConfigValidator;
use crate::config::Config;
use crate::core::{
    CacheStore, HttpFetcher, LookupOptions, LookupOutcome, LookupPipeline, Origin, ProviderKind,
};
use crate::error::Result;
use crate::ui::{OutputMode, Painter};

#[derive(Args, Debug, Default)]
pub struct LookupArgs {
    /// Words to look up (starts an interactive prompt when none are given)
    #[arg(value_name = "WORD")]
    pub words: Vec<String>,

    /// Ignore cached results for this run (fresh results are still saved)
    #[arg(short = 'd', long)]
    pub disable_db_cache: bool,

    /// Timeout for every query, in seconds
    #[arg(short = 't', long, value_name = "SECONDS")]
    pub query_timeout: Option<f64>,

    /// Show the dictionary provider of each queried word
    #[arg(short = 'p', long)]
    pub show_provider: bool,

    /// Show the URL of each queried word
    #[arg(short = 'u', long)]
    pub show_url: bool,

    /// Dictionary to query
    #[arg(short = 'D', long, value_enum, value_name = "NAME")]
    pub dict: Option<ProviderKind>,

    /// Show extended information when the dictionary has any
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl LookupArgs {
    /// Merge the flags over the configured defaults
    pub fn options(&self, config: &Config) -> Result<LookupOptions> {
        let mut options = config.lookup_options();

        if let Some(seconds) = self.query_timeout {
            ConfigValidator::validate_timeout(seconds)?;
            options.timeout = Duration::from_secs_f64(seconds);
        }

        options.use_cache &= !self.disable_db_cache;
        options.verbose |= self.verbose;
        options.show_provider |= self.show_provider;
        options.show_url |= self.show_url;

        Ok(options)
    }

    pub fn dict(&self, config: &Config) -> Result<ProviderKind> {
        match self.dict {
            Some(kind) => Ok(kind),
            None => config.dict(),
        }
    }
}

pub async fn execute(args: LookupArgs, config: &Config) -> Result<()> {
    let options = args.options(config)?;
    let kind = args.dict(config)?;

    let provider = kind.build(HttpFetcher::new()?)?;
    let mut pipeline = LookupPipeline::new(CacheStore::open(&config.database_path)?);
    debug!(
        "Cache at {:?} holds {} entries",
        pipeline.store().path(),
        pipeline.store().count()?
    );

    let color = OutputMode::detect().colored();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.words.is_empty() {
        let input = tokio::io::BufReader::new(tokio::io::stdin());
        return interactive::run(&mut pipeline, provider.as_ref(), &options, input, &mut out, color).await;
    }

    let outcomes = {
        let mut painter = Painter::new(&mut out, color);
        pipeline
            .lookup_all(provider.as_ref(), &args.words, &options, &mut painter)
            .await
    };
    out.flush()?;

    let summary = BatchSummary::tally(&outcomes);
    info!(
        "Looked up {} word(s) in {}: {} from cache, {} fetched, {} not found, {} failed",
        outcomes.len(),
        kind,
        summary.cached,
        summary.fetched,
        summary.not_found,
        summary.failed
    );

    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct BatchSummary {
    cached: usize,
    fetched: usize,
    not_found: usize,
    failed: usize,
}

impl BatchSummary {
    fn tally(outcomes: &[LookupOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                LookupOutcome::Rendered(Origin::Cache) => summary.cached += 1,
                LookupOutcome::Rendered(Origin::Provider) => summary.fetched += 1,
                LookupOutcome::NotFound => summary.not_found += 1,
                LookupOutcome::Failed(err) => {
                    debug!(kind = err.kind(), "Batch entry failed: {}", err);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
