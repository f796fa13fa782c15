//! Line-based prompt used when no words are given on the command line

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::core::{LookupOptions, LookupPipeline, Provider};
use crate::error::Result;
use crate::ui::Painter;

/// Read words line by line until EOF, `exit` or `quit`
pub async fn run<R>(
    pipeline: &mut LookupPipeline,
    provider: &dyn Provider,
    options: &LookupOptions,
    input: R,
    out: &mut dyn Write,
    color: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        write!(out, "[{}]: ", provider.name())?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let word = line.trim();
        match word {
            "" => continue,
            "exit" | "quit" => break,
            _ => {}
        }

        let mut painter = Painter::new(&mut *out, color);
        let outcome = pipeline.lookup(provider, word, options, &mut painter).await;
        debug!("Interactive lookup of {}: {:?}", word, outcome);
        out.flush()?;
    }

    Ok(())
}
