use std::borrow::Cow;
use url::Url;

const CHECKOUT_TERMS: &[&str] = &[
    "checkout", "payment", "order", "cart", "buy", "purchase", "pay",
];

// Any other TLD counts as an international merchant for the foreign-fee bonus.
const DOMESTIC_TLD: &str = "com";

/// A merchant reference split into the parts the identifier looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantReference {
    /// Trimmed input.
    pub raw: String,
    pub lowered: String,
    /// Normalized host (no scheme, `www.`, port, or trailing dot). `None` for free text.
    pub host: Option<String>,
    /// Lowercased URL path, empty for free text.
    pub path: String,
}

impl MerchantReference {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (host, path) = match parse_url(trimmed) {
            Some((host, path)) => (Some(host), path),
            None => (None, String::new()),
        };

        Self {
            raw: trimmed.to_string(),
            lowered: trimmed.to_lowercase(),
            host,
            path,
        }
    }

    pub fn first_label(&self) -> Option<&str> {
        self.host
            .as_deref()
            .and_then(|h| h.split('.').next())
            .filter(|label| !label.is_empty())
    }

    pub fn looks_international(&self) -> bool {
        self.host
            .as_deref()
            .and_then(|h| h.rsplit('.').next())
            .is_some_and(|tld| tld != DOMESTIC_TLD)
    }

    pub fn is_checkout(&self) -> bool {
        CHECKOUT_TERMS.iter().any(|term| self.path.contains(term))
    }
}

/// Splits a catalog domain pattern into `(host, path)`, normalized the same way as references.
/// `"https://www.Amazon.com/WholeFoodsMarket/"` becomes `("amazon.com", Some("wholefoodsmarket"))`.
pub fn split_pattern(pattern: &str) -> Option<(String, Option<String>)> {
    let lowered = pattern.trim().to_lowercase();
    let rest = lowered
        .split_once("://")
        .map_or(lowered.as_str(), |(_, rest)| rest);

    let (host, path) = match rest.split_once('/') {
        Some((host, path)) => (host, Some(path)),
        None => (rest, None),
    };
    let host = host.split(':').next().unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host).trim_matches('.');
    if host.is_empty() || !host.contains('.') || host.chars().any(char::is_whitespace) {
        return None;
    }

    let path = path
        .map(|p| p.trim_matches('/').to_string())
        .filter(|p| !p.is_empty());
    Some((host.to_string(), path))
}

fn parse_url(trimmed: &str) -> Option<(String, String)> {
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }

    let candidate = if trimmed.contains("://") {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("https://{trimmed}"))
    };
    let url = Url::parse(&candidate).ok()?;

    // `domain()` is None for IP hosts; those never identify a merchant.
    let host = url.domain()?.trim_end_matches('.').to_ascii_lowercase();
    let host = match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    };

    let tld = host.rsplit('.').next()?;
    let plausible_tld = tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !tld.chars().all(|c| c.is_ascii_digit());
    if !host.contains('.') || !plausible_tld {
        return None;
    }

    Some((host, url.path().to_lowercase()))
}
