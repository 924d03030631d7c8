//! Cache key derivation for search requests

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::search::{NormalizedSearch, SearchRequest};
use crate::domain::DomainError;

/// Namespace tag prefixed to every derived key
pub const DEFAULT_NAMESPACE: &str = "search_";

/// Identifier of a cached search result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Accumulator width of the rolling string hash
///
/// Deserializes through [`FromStr`], so `"32"` and `"64"` are accepted too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum KeyHashWidth {
    /// 32-bit signed accumulator, compatible with keys written by earlier deployments
    #[default]
    Compact,
    /// 64-bit signed accumulator
    Wide,
}

impl fmt::Display for KeyHashWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compact => write!(f, "compact"),
            Self::Wide => write!(f, "wide"),
        }
    }
}

impl FromStr for KeyHashWidth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" | "32" => Ok(Self::Compact),
            "wide" | "64" => Ok(Self::Wide),
            _ => Err(DomainError::configuration(format!(
                "Unknown key hash width: {}. Valid widths: compact, wide",
                s
            ))),
        }
    }
}

impl TryFrom<String> for KeyHashWidth {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Derives cache keys from search requests
///
/// Derivation is pure: the key depends only on the normalized request, so it
/// is stable within and across process runs.
#[derive(Debug, Clone)]
pub struct SearchKeyDeriver {
    namespace: String,
    width: KeyHashWidth,
}

impl Default for SearchKeyDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchKeyDeriver {
    pub fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            width: KeyHashWidth::default(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_width(mut self, width: KeyHashWidth) -> Self {
        self.width = width;
        self
    }

    pub fn width(&self) -> KeyHashWidth {
        self.width
    }

    pub fn derive(&self, request: &SearchRequest) -> CacheKey {
        self.derive_normalized(&request.normalize())
    }

    pub fn derive_normalized(&self, search: &NormalizedSearch) -> CacheKey {
        let canonical = search.canonical();

        let magnitude = match self.width {
            KeyHashWidth::Compact => u64::from(rolling_hash_32(&canonical).unsigned_abs()),
            KeyHashWidth::Wide => rolling_hash_64(&canonical).unsigned_abs(),
        };

        CacheKey(format!("{}{}", self.namespace, to_base36(magnitude)))
    }
}

/// Polynomial string hash (`h = h * 31 + unit`) over UTF-16 code units,
/// wrapping at 32 bits
fn rolling_hash_32(input: &str) -> i32 {
    input.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

fn rolling_hash_64(input: &str) -> i64 {
    input.encode_utf16().fold(0i64, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i64::from(unit))
    })
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(13);

    while value > 0 {
        buf.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }

    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::{DecisionStatus, SearchFilters};

    #[test]
    fn test_rolling_hash_matches_classic_string_hash() {
        assert_eq!(rolling_hash_32("hello"), 99_162_322);
        assert_eq!(rolling_hash_32(""), 0);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(99_162_322), "1n1e4y");
    }

    #[test]
    fn test_abs_of_min_value() {
        let magnitude = u64::from(i32::MIN.unsigned_abs());
        assert_eq!(magnitude, 2_147_483_648);
    }

    #[test]
    fn test_known_keys() {
        let deriver = SearchKeyDeriver::new();

        let plain = deriver.derive(&SearchRequest::new("kitchen"));
        assert_eq!(plain.as_str(), "search_hlkksy");

        let filtered = deriver.derive(
            &SearchRequest::new("kitchen")
                .with_filters(SearchFilters::new().with_status(DecisionStatus::Pending)),
        );
        assert_eq!(filtered.as_str(), "search_t4k0mr");
    }

    #[test]
    fn test_key_ignores_case_and_surrounding_whitespace() {
        let deriver = SearchKeyDeriver::new();

        assert_eq!(
            deriver.derive(&SearchRequest::new("Chairs")),
            deriver.derive(&SearchRequest::new(" chairs "))
        );
    }

    #[test]
    fn test_key_uses_defaults_for_missing_pagination() {
        let deriver = SearchKeyDeriver::new();

        assert_eq!(
            deriver.derive(&SearchRequest::new("chairs")),
            deriver.derive(&SearchRequest::new("chairs").with_limit(10).with_offset(0))
        );
    }

    #[test]
    fn test_key_differs_by_component() {
        let deriver = SearchKeyDeriver::new();
        let base = deriver.derive(&SearchRequest::new("chairs"));

        assert_ne!(base, deriver.derive(&SearchRequest::new("tables")));
        assert_ne!(base, deriver.derive(&SearchRequest::new("chairs").with_offset(10)));
        assert_ne!(base, deriver.derive(&SearchRequest::new("chairs").with_limit(20)));
        assert_ne!(
            base,
            deriver.derive(
                &SearchRequest::new("chairs").with_filters(SearchFilters::new().with_project("p1"))
            )
        );
    }

    #[test]
    fn test_wide_keys() {
        let deriver = SearchKeyDeriver::new().with_width(KeyHashWidth::Wide);

        let key = deriver.derive(&SearchRequest::new("kitchen"));
        assert_eq!(key.as_str(), "search_1a11tugj8z6fm");
        assert_eq!(key, deriver.derive(&SearchRequest::new("  KITCHEN")));
    }

    #[test]
    fn test_custom_namespace() {
        let deriver = SearchKeyDeriver::new().with_namespace("decisions:");
        let key = deriver.derive(&SearchRequest::new("kitchen"));

        assert_eq!(key.as_str(), "decisions:hlkksy");
    }

    #[test]
    fn test_width_from_str() {
        assert_eq!("compact".parse::<KeyHashWidth>().unwrap(), KeyHashWidth::Compact);
        assert_eq!("WIDE".parse::<KeyHashWidth>().unwrap(), KeyHashWidth::Wide);
        assert!("huge".parse::<KeyHashWidth>().is_err());
    }

    #[test]
    fn test_width_deserializes_like_from_str() {
        let wide: KeyHashWidth = serde_json::from_str("\"64\"").unwrap();
        assert_eq!(wide, KeyHashWidth::Wide);

        let compact: KeyHashWidth = serde_json::from_str("\"Compact\"").unwrap();
        assert_eq!(compact, KeyHashWidth::Compact);

        assert!(serde_json::from_str::<KeyHashWidth>("\"huge\"").is_err());
        assert_eq!(serde_json::to_string(&KeyHashWidth::Wide).unwrap(), "\"wide\"");
    }
}
