//! Colored line writer used by providers to render entries
//!
//! Providers describe what a piece of text *is* (headword, definition,
//! example...) through a [`Tone`]; the painter maps tones to terminal colors
//! and falls back to plain text when color is off.

use crossterm::style::{style, Color, Stylize};
use std::io::{self, Write};

/// Semantic roles for rendered dictionary text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Plain,
    Headword,
    Phonetic,
    PartOfSpeech,
    Definition,
    Example,
    Highlight,
    Meta,
    Notice,
    Error,
}

impl Tone {
    fn color(self) -> Option<Color> {
        match self {
            Tone::Plain => None,
            Tone::Headword => Some(Color::Yellow),
            Tone::Phonetic => Some(Color::White),
            Tone::PartOfSpeech => Some(Color::Red),
            Tone::Definition => Some(Color::Rgb { r: 255, g: 165, b: 0 }),
            Tone::Example => Some(Color::Rgb { r: 95, g: 95, b: 215 }),
            Tone::Highlight => Some(Color::Rgb { r: 135, g: 135, b: 255 }),
            Tone::Meta => Some(Color::Cyan),
            Tone::Notice => Some(Color::Yellow),
            Tone::Error => Some(Color::Rgb { r: 255, g: 85, b: 85 }),
        }
    }
}

pub struct Painter<'a> {
    out: &'a mut dyn Write,
    color: bool,
}

impl<'a> Painter<'a> {
    pub fn new(out: &'a mut dyn Write, color: bool) -> Self {
        Self { out, color }
    }

    /// Painter that never emits escape sequences
    #[cfg(test)]
    pub fn plain(out: &'a mut dyn Write) -> Self {
        Self::new(out, false)
    }

    /// Write `text` without a line break
    pub fn span(&mut self, text: &str, tone: Tone) -> io::Result<()> {
        match tone.color().filter(|_| self.color) {
            Some(color) => write!(self.out, "{}", style(text).with(color)),
            None => self.out.write_all(text.as_bytes()),
        }
    }

    /// Write `text` as a full line, indented by `indent` spaces
    pub fn line(&mut self, text: &str, tone: Tone, indent: usize) -> io::Result<()> {
        self.indent(indent)?;
        self.span(text, tone)?;
        self.newline()
    }

    pub fn indent(&mut self, width: usize) -> io::Result<()> {
        if width > 0 {
            write!(self.out, "{:width$}", "", width = width)?;
        }
        Ok(())
    }

    pub fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }
}
