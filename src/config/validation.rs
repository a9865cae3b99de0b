use crate::config::types::{
    Config, CrawlerConfig, ExtractConfig, OutputConfig, SourceConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_extract_config(&config.extract)?;
    Ok(())
}

/// Replaces the configured page range and validates the result
///
/// Either bound may be left as configured. On error the configuration is
/// left unchanged.
pub fn override_page_range(
    config: &mut Config,
    start_page: Option<u32>,
    end_page: Option<u32>,
) -> ConfigResult<()> {
    let mut source = config.source.clone();
    if let Some(start) = start_page {
        source.start_page = start;
    }
    if let Some(end) = end_page {
        source.end_page = end;
    }

    validate_source_config(&source)?;
    config.source = source;
    Ok(())
}

/// Validates the listing address and page range
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must not carry a query or fragment",
            config.base_url
        )));
    }

    if config.page_segment.is_empty() || config.page_segment.contains('/') {
        return Err(ConfigError::Validation(format!(
            "page_segment must be a single non-empty path segment, got '{}'",
            config.page_segment
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start_page must be >= 1".to_string(),
        ));
    }

    if config.end_page < config.start_page {
        return Err(ConfigError::Validation(format!(
            "end_page ({}) must be >= start_page ({})",
            config.end_page, config.start_page
        )));
    }

    Ok(())
}

/// Validates crawler pacing configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.checkpoint_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every extraction selector parses
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    for (name, raw) in [
        ("block_selector", &config.block_selector),
        ("prompt_selector", &config.prompt_selector),
        ("choices_selector", &config.choices_selector),
    ] {
        Selector::parse(raw)
            .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, raw, e)))?;
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
