pub mod painter;

pub use painter::{Painter, Tone};

/// Whether rendered entries should carry terminal colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Plain,    // Pipes, files, NO_COLOR, CI logs
    Colored,  // Interactive TTY
}

impl OutputMode {
    pub fn detect() -> Self {
        use tracing::debug;

        let no_color = std::env::var("NO_COLOR").is_ok();
        let has_ci = std::env::var("CI").is_ok();
        let is_tty = atty::is(atty::Stream::Stdout);

        debug!("Output mode detection - NO_COLOR: {}, CI: {}, TTY: {}",
               no_color, has_ci, is_tty);

        if no_color || has_ci || !is_tty {
            OutputMode::Plain
        } else {
            OutputMode::Colored
        }
    }

    pub fn colored(self) -> bool {
        matches!(self, OutputMode::Colored)
    }
}
