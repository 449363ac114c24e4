use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Curated news bucket shown as a tab in the market news view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    All,
    UsMarket,
    UsTech,
    KrKospi,
    KrKosdaq,
    CryptoBitcoin,
    CryptoAltcoin,
}

impl NewsCategory {
    /// Tab order
    pub const ALL: [NewsCategory; 7] = [
        NewsCategory::All,
        NewsCategory::UsMarket,
        NewsCategory::UsTech,
        NewsCategory::KrKospi,
        NewsCategory::KrKosdaq,
        NewsCategory::CryptoBitcoin,
        NewsCategory::CryptoAltcoin,
    ];

    /// Concrete categories that the "all" tab fans out over, in order
    pub const CONCRETE: [NewsCategory; 6] = [
        NewsCategory::UsMarket,
        NewsCategory::UsTech,
        NewsCategory::KrKospi,
        NewsCategory::KrKosdaq,
        NewsCategory::CryptoBitcoin,
        NewsCategory::CryptoAltcoin,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            NewsCategory::All => "all",
            NewsCategory::UsMarket => "us_market",
            NewsCategory::UsTech => "us_tech",
            NewsCategory::KrKospi => "kr_kospi",
            NewsCategory::KrKosdaq => "kr_kosdaq",
            NewsCategory::CryptoBitcoin => "crypto_bitcoin",
            NewsCategory::CryptoAltcoin => "crypto_altcoin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::All => "전체",
            NewsCategory::UsMarket => "미국 증시",
            NewsCategory::UsTech => "미국 기술주",
            NewsCategory::KrKospi => "코스피",
            NewsCategory::KrKosdaq => "코스닥",
            NewsCategory::CryptoBitcoin => "비트코인",
            NewsCategory::CryptoAltcoin => "알트코인",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        NewsCategory::ALL
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(needle) || c.label() == needle)
            .ok_or_else(|| format!("unknown news category: {}", s))
    }
}

/// A news article as shown in the feed. Identity is the article `url`;
/// the generated `id` is only a display key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub source: String,
    /// Publication date, `YYYY-MM-DD`
    pub date: String,
    pub image_url: String,
    pub category: NewsCategory,
    pub url: String,
}
