use serde::Deserialize;

/// Main configuration structure for MCQ-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// The paginated listing to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Address of the first page of the listing
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path segment inserted before the page number for pages after the first
    #[serde(rename = "page-segment", default = "default_page_segment")]
    pub page_segment: String,

    /// First page index to fetch (1-based)
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last page index to fetch (inclusive)
    #[serde(rename = "end-page")]
    pub end_page: u32,
}

/// Crawl pacing and checkpointing
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of pages between checkpoint writes
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: u32,

    /// Fixed pause after every page (milliseconds)
    #[serde(rename = "page-delay-ms", default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Upper bound for a single page request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: default_checkpoint_interval(),
            page_delay_ms: default_page_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON checkpoint file
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,
}

/// CSS selectors describing where a question lives inside a page
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// One match per candidate question
    #[serde(rename = "block-selector", default = "default_block_selector")]
    pub block_selector: String,

    /// Question heading, searched inside a block
    #[serde(rename = "prompt-selector", default = "default_prompt_selector")]
    pub prompt_selector: String,

    /// Element holding the `<br>`-separated answer lines, searched inside a block
    #[serde(rename = "choices-selector", default = "default_choices_selector")]
    pub choices_selector: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            block_selector: default_block_selector(),
            prompt_selector: default_prompt_selector(),
            choices_selector: default_choices_selector(),
        }
    }
}

fn default_page_segment() -> String {
    "page".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_checkpoint_interval() -> u32 {
    50
}

fn default_page_delay_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_block_selector() -> String {
    "article".to_string()
}

fn default_prompt_selector() -> String {
    "h2.post-title".to_string()
}

fn default_choices_selector() -> String {
    "div.excerpt p".to_string()
}
