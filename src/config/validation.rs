use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, StoreConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

const MAX_CONCURRENCY: usize = 64;
const MAX_RETRIES: u32 = 20;
const MAX_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_store_config(&config.store)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = Url::parse(&config.seed_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed-url: {}", e)))?;

    if seed.scheme() != "http" && seed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "seed-url '{}' must use http or https",
            config.seed_url
        )));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    for (name, retries) in [
        ("listing-retries", config.listing_retries),
        ("detail-retries", config.detail_retries),
        ("file-retries", config.file_retries),
    ] {
        if retries > MAX_RETRIES {
            return Err(ConfigError::Validation(format!(
                "{} must be <= {}, got {}",
                name, MAX_RETRIES, retries
            )));
        }
    }

    for (name, delay) in [
        ("retry-delay-ms", config.retry_delay_ms),
        ("page-delay-ms", config.page_delay_ms),
    ] {
        if delay > MAX_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be <= {}ms, got {}ms",
                name, MAX_DELAY_MS, delay
            )));
        }
    }

    if config.valid_types.is_empty() {
        return Err(ConfigError::Validation(
            "valid-types must list at least one format".to_string(),
        ));
    }

    for format in &config.valid_types {
        let lowercase_alphanumeric = format
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if format.is_empty() || !lowercase_alphanumeric {
            return Err(ConfigError::Validation(format!(
                "valid-types entries must be lowercase alphanumeric, got '{}'",
                format
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data-dir cannot be empty".to_string(),
        ));
    }

    if config.datasets_path.is_empty() {
        return Err(ConfigError::Validation(
            "datasets-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates remote store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid store endpoint: {}", e)))?;

    if config.bucket.is_empty() {
        return Err(ConfigError::Validation("bucket cannot be empty".to_string()));
    }

    if config.prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "store prefix must not start with '/', got '{}'",
            config.prefix
        )));
    }

    if config.access_key_env.is_empty() || config.secret_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "credential environment variable names cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every configured selector is valid CSS
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.listing_target,
        &config.listing_next,
        &config.detail_title,
        &config.detail_row,
        &config.row_format,
        &config.row_link,
        &config.row_description,
    ] {
        parse_selector(selector)?;
    }
    Ok(())
}

/// Parses a CSS selector, mapping failures to a configuration error
pub(crate) fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_config() -> CrawlerConfig {
        CrawlerConfig {
            seed_url: "https://portal.example.com/search".to_string(),
            concurrency: 5,
            listing_retries: 5,
            detail_retries: 3,
            file_retries: 3,
            retry_delay_ms: 2000,
            page_delay_ms: 1000,
            valid_types: vec!["csv".to_string()],
        }
    }

    #[test]
    fn test_valid_crawler_config() {
        assert!(validate_crawler_config(&crawler_config()).is_ok());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = crawler_config();
        config.concurrency = 0;
        assert!(validate_crawler_config(&config).is_err());

        config.concurrency = MAX_CONCURRENCY + 1;
        assert!(validate_crawler_config(&config).is_err());

        config.concurrency = 1;
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_seed_url_scheme() {
        let mut config = crawler_config();
        config.seed_url = "ftp://portal.example.com/".to_string();
        assert!(validate_crawler_config(&config).is_err());

        config.seed_url = "not a url".to_string();
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_retry_budget_limit() {
        let mut config = crawler_config();
        config.file_retries = MAX_RETRIES + 1;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_valid_types_must_be_lowercase() {
        let mut config = crawler_config();
        config.valid_types = vec!["CSV".to_string()];
        assert!(validate_crawler_config(&config).is_err());

        config.valid_types.clear();
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_default_selectors_parse() {
        assert!(validate_selectors(&SelectorConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_selector() {
        let selectors = SelectorConfig {
            detail_title: "h2[".to_string(),
            ..SelectorConfig::default()
        };
        assert!(matches!(
            validate_selectors(&selectors),
            Err(ConfigError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_store_prefix() {
        let mut store = StoreConfig {
            endpoint: "https://objects.example.com".to_string(),
            region: "us-east-1".to_string(),
            bucket: "archive".to_string(),
            prefix: "mirror/".to_string(),
            access_key_env: "A".to_string(),
            secret_key_env: "B".to_string(),
        };
        assert!(validate_store_config(&store).is_ok());

        store.prefix = "/mirror/".to_string();
        assert!(validate_store_config(&store).is_err());

        store.prefix.clear();
        store.bucket.clear();
        assert!(validate_store_config(&store).is_err());
    }
}
