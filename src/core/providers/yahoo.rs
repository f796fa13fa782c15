//! Yahoo Dictionary (Taiwan), scraped from the search result page
//!
//! The page has no API; the entry is pulled out of a handful of known blocks.
//! Extended blocks (word variations, other usages) are always extracted and
//! stored, and only shown when rendering verbosely.

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{HttpFetcher, Provider};
use crate::core::record::Record;
use crate::error::{LookupError, NetworkError};
use crate::ui::{Painter, Tone};

pub const PROVIDER_NAME: &str = "yahoo";
const SEARCH_ENDPOINT: &str = "https://tw.dictionary.search.yahoo.com/search";

static TERM: LazyLock<Selector> = LazyLock::new(|| selector("span#term"));
static PRONUNCIATION: LazyLock<Selector> = LazyLock::new(|| selector("span#pronunciation_pos"));
static SOUND: LazyLock<Selector> = LazyLock::new(|| selector(".proun_sound"));
static MP3_SOURCE: LazyLock<Selector> =
    LazyLock::new(|| selector(".source[data-type=\"audio/mpeg\"]"));
static OGG_SOURCE: LazyLock<Selector> =
    LazyLock::new(|| selector(".source[data-type=\"audio/ogg\"]"));

static MAIN_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| selector(".dd.algo.explain.mt-20.lst.DictionaryResults"));
static MAIN_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".compTitle.mb-10"));
static MAIN_LIST: LazyLock<Selector> = LazyLock::new(|| selector(".compArticleList.mb-15.ml-10"));
static VARIATION_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| selector(".dd.algo.variation.fst.DictionaryResults"));
static OTHERS_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| selector(".dd.algo.othersNew.lst.DictionaryResults"));
static OTHERS_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".compTitle.mt-26"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".compTitle"));
static ARTICLE_LIST: LazyLock<Selector> = LazyLock::new(|| selector(".compArticleList"));

static MEANING_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.ov-a"));
static MEANING_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h4"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));

static PHONETIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)(\[.*\])").expect("static regex is valid"));

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
struct Entry {
    word: String,
    pronounce: Vec<(String, String)>,
    sound: Vec<(String, String)>,
    explain: Vec<Section>,
    verbose: Vec<Section>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
struct Section {
    part_of_speech: String,
    meanings: Vec<Meaning>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
struct Meaning {
    text: String,
    examples: Vec<String>,
}

pub struct YahooDictionary {
    http: HttpFetcher,
    endpoint: Url,
}

impl YahooDictionary {
    pub fn new(http: HttpFetcher) -> Result<Self, NetworkError> {
        Self::with_endpoint(http, SEARCH_ENDPOINT)
    }

    pub fn with_endpoint(http: HttpFetcher, endpoint: &str) -> Result<Self, NetworkError> {
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
        })
    }

    fn render_sections(&self, sections: &[Section], painter: &mut Painter<'_>) -> io::Result<()> {
        for section in sections {
            painter.line(&section.part_of_speech, Tone::PartOfSpeech, 0)?;
            for meaning in &section.meanings {
                painter.line(&meaning.text, Tone::Definition, 2)?;
                for example in &meaning.examples {
                    painter.indent(4)?;
                    // Bold terms were wrapped in '*' while parsing
                    for (i, piece) in example.split('*').enumerate() {
                        let tone = if i % 2 == 1 { Tone::Highlight } else { Tone::Example };
                        painter.span(piece, tone)?;
                    }
                    painter.newline()?;
                }
            }
        }
        painter.newline()
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of an example sentence, with `<b>` terms wrapped in '*'
fn sentence_of(span: ElementRef<'_>) -> String {
    let mut sentence = String::new();
    for child in span.children() {
        match child.value() {
            Node::Text(text) => sentence.push_str(text),
            Node::Element(element) if element.name() == "b" => {
                if let Some(bold) = ElementRef::wrap(child) {
                    sentence.push('*');
                    sentence.push_str(&bold.text().collect::<String>());
                    sentence.push('*');
                }
            }
            _ => {}
        }
    }
    sentence.trim().to_string()
}

fn parse_meanings(list: ElementRef<'_>) -> Vec<Meaning> {
    list.select(&MEANING_ITEM)
        .map(|item| Meaning {
            text: item
                .select(&MEANING_HEADING)
                .next()
                .map(text_of)
                .unwrap_or_default(),
            examples: item
                .select(&SPAN)
                .filter(|span| {
                    !span
                        .value()
                        .attr("style")
                        .is_some_and(|style| style.contains("line-height: 17px;"))
                })
                .map(sentence_of)
                .filter(|sentence| !sentence.is_empty())
                .collect(),
        })
        .collect()
}

/// Pair every part-of-speech title with its meaning list, padding the shorter
/// side the way `zip_longest` would.
fn pair_sections(titles: Vec<ElementRef<'_>>, lists: Vec<ElementRef<'_>>) -> Vec<Section> {
    let count = titles.len().max(lists.len());
    (0..count)
        .map(|i| Section {
            part_of_speech: titles.get(i).copied().map(text_of).unwrap_or_default(),
            meanings: lists.get(i).copied().map(parse_meanings).unwrap_or_default(),
        })
        .collect()
}

fn collect_block<'a>(
    document: &'a Html,
    block: &Selector,
    title: &Selector,
    list: &Selector,
    titles: &mut Vec<ElementRef<'a>>,
    lists: &mut Vec<ElementRef<'a>>,
) {
    if let Some(block) = document.select(block).next() {
        titles.extend(block.select(title));
        lists.extend(block.select(list));
    }
}

fn parse_pronunciations(document: &Html) -> Vec<(String, String)> {
    let text = document
        .select(&PRONUNCIATION)
        .next()
        .map(text_of)
        .unwrap_or_default();

    text.split_whitespace()
        .filter_map(|token| {
            let captures = PHONETIC.captures(token)?;
            Some((captures[1].to_string(), captures[2].to_string()))
        })
        .collect()
}

fn parse_sounds(document: &Html) -> Vec<(String, String)> {
    let Some(sound) = document.select(&SOUND).next() else {
        return Vec::new();
    };

    [("mp3", &MP3_SOURCE), ("ogg", &OGG_SOURCE)]
        .into_iter()
        .filter_map(|(format, source)| {
            let source = sound.select(source).next()?;
            let url = source.value().attr("data-src")?;
            Some((format.to_string(), url.to_string()))
        })
        .collect()
}

#[async_trait]
impl Provider for YahooDictionary {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn title(&self) -> &'static str {
        "Yahoo Dictionary"
    }

    fn build_target(&self, word: &str) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("p", word);
        url.into()
    }

    async fn fetch_raw(&self, word: &str, timeout: Duration) -> Result<String, LookupError> {
        self.http.get_text(word, &self.build_target(word), timeout).await
    }

    fn parse(&self, word: &str, raw: &str) -> Result<Record, LookupError> {
        let document = Html::parse_document(raw);

        let Some(term) = document.select(&TERM).next() else {
            return Err(LookupError::NotFound {
                word: word.to_string(),
            });
        };

        let mut entry = Entry {
            word: text_of(term),
            pronounce: parse_pronunciations(&document),
            sound: parse_sounds(&document),
            ..Entry::default()
        };

        let (mut titles, mut lists) = (Vec::new(), Vec::new());
        collect_block(&document, &MAIN_BLOCK, &MAIN_TITLE, &MAIN_LIST, &mut titles, &mut lists);
        entry.explain = pair_sections(titles, lists);

        let (mut titles, mut lists) = (Vec::new(), Vec::new());
        collect_block(&document, &VARIATION_BLOCK, &TITLE, &ARTICLE_LIST, &mut titles, &mut lists);
        collect_block(&document, &OTHERS_BLOCK, &OTHERS_TITLE, &ARTICLE_LIST, &mut titles, &mut lists);
        entry.verbose = pair_sections(titles, lists);

        debug!(
            "Parsed yahoo entry for {}: {} sections, {} extended",
            word,
            entry.explain.len(),
            entry.verbose.len()
        );

        let content = serde_json::to_value(&entry)
            .map_err(|e| LookupError::provider(PROVIDER_NAME, e.to_string()))?;
        Record::new(word, content, PROVIDER_NAME)
    }

    fn render(&self, record: &Record, verbose: bool, painter: &mut Painter<'_>) -> io::Result<()> {
        let entry: Entry = record.decode().unwrap_or_else(|e| {
            warn!("Stored yahoo entry for {} does not decode, showing headword only: {}", record.word(), e);
            Entry::default()
        });

        let headword = if entry.word.is_empty() { record.word() } else { entry.word.as_str() };
        painter.line(headword, Tone::Headword, 0)?;

        for (label, phonetic) in &entry.pronounce {
            painter.span(label, Tone::Plain)?;
            painter.span(phonetic, Tone::Phonetic)?;
            painter.span(" ", Tone::Plain)?;
        }
        painter.newline()?;

        self.render_sections(&entry.explain, painter)?;

        if verbose && !entry.verbose.is_empty() {
            self.render_sections(&entry.verbose, painter)?;
        }

        Ok(())
    }
}
