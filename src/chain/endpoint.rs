// ABOUTME: Ledger endpoint selection from configuration.
// ABOUTME: The value "mocked" picks the offline ledger instead of a GraphQL URL.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::ChainError;

/// URL written into deployment aliases when the ledger is mocked.
pub const DEFAULT_MOCKED_URL: &str = "http://localhost:8080/graphql";

const MOCKED: &str = "mocked";

/// Where ledger queries go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A GraphQL endpoint reached over HTTP(S).
    Live(Url),
    /// No network traffic; the URL is only recorded in deployment aliases.
    Mocked(Url),
}

impl Endpoint {
    pub fn mocked() -> Self {
        Self::Mocked(Url::parse(DEFAULT_MOCKED_URL).expect("default mocked URL is valid"))
    }

    pub fn url(&self) -> &Url {
        match self {
            Self::Live(url) | Self::Mocked(url) => url,
        }
    }

    pub fn is_mocked(&self) -> bool {
        matches!(self, Self::Mocked(_))
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::mocked()
    }
}

impl FromStr for Endpoint {
    type Err = ChainError;

    /// Accepts `mocked`, `mocked:<url>` or an `http(s)` URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        let invalid = |message: String| ChainError::InvalidEndpoint {
            value: value.to_string(),
            message,
        };

        if value.eq_ignore_ascii_case(MOCKED) {
            return Ok(Self::mocked());
        }

        let (mocked, raw) = match value.split_once(':') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(MOCKED) => (true, rest),
            _ => (false, value),
        };

        let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        Ok(if mocked { Self::Mocked(url) } else { Self::Live(url) })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live(url) => write!(f, "{}", url),
            Self::Mocked(url) => write!(f, "mocked:{}", url),
        }
    }
}
