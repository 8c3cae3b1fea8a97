use thiserror::Error;
use url::Url;

/// Longest URL handed to the system browser.
const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur when checking a URL before opening it.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host to navigate to.
    #[error("URL has no host")]
    MissingHost,
    #[error("URL too long ({0} bytes)")]
    TooLong(usize),
}

/// Validates an article link before it is passed to `open::that`.
///
/// Only absolute `http`/`https` URLs with a host are accepted. The returned
/// [`Url`] is re-serialized, so control characters and spaces are
/// percent-encoded and cannot reach the launcher command line.
///
/// ```
/// use newsdesk::util::validate_url_for_open;
///
/// let url = validate_url_for_open("https://www.bbc.co.uk/news/uk-39993743").unwrap();
/// assert_eq!(url.host_str(), Some("www.bbc.co.uk"));
///
/// assert!(validate_url_for_open("javascript:alert(1)").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let trimmed = url_str.trim();
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong(trimmed.len()));
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_urls_accepted() {
        assert!(validate_url_for_open("https://arstechnica.com/gadgets/2017/05/x/").is_ok());
        assert!(validate_url_for_open("http://www.abc.net.au/news/2017-05-20/y").is_ok());
        assert!(validate_url_for_open("  https://example.com/padded  ").is_ok());
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(matches!(
            validate_url_for_open("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
        assert!(validate_url_for_open("mailto:news@example.com").is_err());
    }

    #[test]
    fn test_relative_and_empty_rejected() {
        assert!(matches!(
            validate_url_for_open("/news/today"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
        assert!(validate_url_for_open("").is_err());
    }

    #[test]
    fn test_control_characters_are_encoded() {
        let url = validate_url_for_open("https://example.com/a b\"c").unwrap();
        assert!(!url.as_str().contains(' '));
        assert!(!url.as_str().contains('"'));
    }

    #[test]
    fn test_too_long_rejected() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(matches!(
            validate_url_for_open(&long),
            Err(UrlValidationError::TooLong(_))
        ));
    }
}
