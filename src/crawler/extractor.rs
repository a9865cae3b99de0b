//! Question extraction from listing pages
//!
//! A listing page holds a series of blocks (by default `<article>`), each with
//! a heading for the question and a paragraph of `<br>`-separated answer
//! lines:
//!
//! ```html
//! <article>
//!   <h2 class="post-title">Capital of the UK?</h2>
//!   <div class="excerpt"><p>
//!     A. Paris<br/><strong>B. London</strong><br/>C. Rome<br/>D. Berlin
//!   </p></div>
//! </article>
//! ```
//!
//! The answer is the line carrying emphasis (`<strong>` or `<b>`). Emphasis is
//! found by walking the document tree, so it does not matter whether it wraps
//! the whole line or just the letter.

use crate::config::ExtractConfig;
use crate::state::{Record, Rejection, CHOICE_COUNT};
use crate::ConfigError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Outcome of extracting a whole page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    /// Records in block order
    pub records: Vec<Record>,

    /// Why each discarded block was discarded, in block order
    pub rejections: Vec<Rejection>,
}

impl PageExtraction {
    /// Number of blocks seen on the page
    pub fn blocks(&self) -> usize {
        self.records.len() + self.rejections.len()
    }
}

/// Parses listing markup into records
#[derive(Debug, Clone)]
pub struct Extractor {
    block: Selector,
    prompt: Selector,
    choices: Selector,
}

/// One `<br>`-delimited line of the answer container
#[derive(Debug, Default)]
struct Line {
    text: String,
    emphasized: bool,
}

impl Extractor {
    /// Compiles the selectors from configuration
    pub fn new(config: &ExtractConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            block: compile(&config.block_selector)?,
            prompt: compile(&config.prompt_selector)?,
            choices: compile(&config.choices_selector)?,
        })
    }

    /// Extracts every valid record from a page, discarding the rest
    pub fn extract(&self, markup: &str) -> Vec<Record> {
        self.extract_page(markup).records
    }

    /// Extracts records and keeps the rejection reasons for reporting
    pub fn extract_page(&self, markup: &str) -> PageExtraction {
        let mut page = PageExtraction::default();
        for outcome in self.extract_blocks(markup) {
            match outcome {
                Ok(record) => page.records.push(record),
                Err(rejection) => page.rejections.push(rejection),
            }
        }
        page
    }

    /// Returns one outcome per block, in document order
    pub fn extract_blocks(&self, markup: &str) -> Vec<Result<Record, Rejection>> {
        let document = Html::parse_document(markup);
        document
            .select(&self.block)
            .map(|block| self.extract_block(block))
            .collect()
    }

    fn extract_block(&self, block: ElementRef<'_>) -> Result<Record, Rejection> {
        let prompt = block
            .select(&self.prompt)
            .next()
            .map(|heading| collapse_whitespace(&heading.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .ok_or(Rejection::MissingPrompt)?;

        let container = block
            .select(&self.choices)
            .next()
            .ok_or(Rejection::MissingChoices)?;

        let mut choices = Vec::with_capacity(CHOICE_COUNT);
        let mut correct_index = None;

        for line in split_lines(container) {
            let Some(captures) = choice_pattern().captures(&line.text) else {
                continue;
            };

            choices.push(captures[2].trim().to_string());

            if line.emphasized {
                match correct_index {
                    None => correct_index = Some(choices.len() - 1),
                    Some(first) => tracing::trace!(
                        "Extra answer marker on choice {} ignored, keeping {}",
                        &captures[1],
                        first
                    ),
                }
            }
        }

        if choices.len() != CHOICE_COUNT {
            return Err(Rejection::WrongChoiceCount {
                found: choices.len(),
            });
        }

        let correct_index = correct_index.ok_or(Rejection::NoCorrectMarker)?;
        Record::new(prompt, choices, correct_index)
    }
}

fn compile(raw: &str) -> Result<Selector, ConfigError> {
    Selector::parse(raw).map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", raw, e)))
}

/// `A. text` through `D. text`
fn choice_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-D])\.\s*(.+)$").unwrap())
}

/// Splits the container's text into lines at `<br>` elements
///
/// Walks the subtree in document order so emphasis spanning a line break
/// marks every line it covers.
fn split_lines(container: ElementRef<'_>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();

    for node in container.descendants() {
        if let Some(element) = node.value().as_element() {
            if element.name() == "br" {
                lines.push(std::mem::take(&mut current));
            }
            continue;
        }

        let Some(text) = node.value().as_text() else {
            continue;
        };

        current.text.push_str(text);

        if !current.emphasized && !text.trim().is_empty() {
            current.emphasized = node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != container.id())
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| is_emphasis(element.name()));
        }
    }
    lines.push(current);

    for line in &mut lines {
        line.text = collapse_whitespace(&line.text);
    }
    lines
}

/// Tags that mark the correct answer
fn is_emphasis(tag: &str) -> bool {
    matches!(tag, "strong" | "b")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
