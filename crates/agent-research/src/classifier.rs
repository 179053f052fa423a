//! Query classification: stock ticker or free-text topic

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2,5}$").expect("ticker pattern is valid"));

/// Shape of a user query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum QueryKind {
    /// 2-5 uppercase ASCII letters, e.g. `NVDA`
    Ticker(String),
    /// Anything else
    FreeText(String),
}

impl QueryKind {
    pub fn is_ticker(&self) -> bool {
        matches!(self, Self::Ticker(_))
    }

    /// The trimmed query text
    pub fn text(&self) -> &str {
        match self {
            Self::Ticker(t) | Self::FreeText(t) => t,
        }
    }
}

/// Classify a query after trimming surrounding whitespace
///
/// Only exact uppercase input counts as a ticker; `nvda` is free text.
pub fn classify(query: &str) -> QueryKind {
    let trimmed = query.trim();
    if TICKER_PATTERN.is_match(trimmed) {
        QueryKind::Ticker(trimmed.to_string())
    } else {
        QueryKind::FreeText(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickers() {
        for q in ["NVDA", "AAPL", "GM", "GOOGL", "  MSFT  "] {
            assert!(classify(q).is_ticker(), "{q} should be a ticker");
        }
        assert_eq!(classify(" TSLA\n"), QueryKind::Ticker("TSLA".to_string()));
    }

    #[test]
    fn test_free_text() {
        for q in [
            "A",
            "ABCDEF",
            "nvda",
            "Nvda",
            "BRK.B",
            "NVDA2",
            "solid-state batteries",
            "NVDA earnings",
            "",
        ] {
            assert!(!classify(q).is_ticker(), "{q:?} should be free text");
        }
    }

    #[test]
    fn test_text_is_trimmed() {
        let kind = classify("  quantum computing startups ");
        assert_eq!(kind.text(), "quantum computing startups");
    }

    #[test]
    fn test_non_ascii_uppercase_is_free_text() {
        assert!(!classify("ÄBC").is_ticker());
    }
}
