//! City / district tokens from free-text addresses.

use crate::models::RegionTokens;

/// First whitespace token is the city, second the district.
///
/// Positional only, nothing is checked against a list of real regions.
/// Total: any input, including `None`, yields a pair (possibly empty).
pub fn extract_region(address: Option<&str>) -> RegionTokens {
    let mut tokens = address.unwrap_or_default().split_whitespace();
    let city = tokens.next().unwrap_or_default().to_string();
    let district = tokens.next().unwrap_or_default().to_string();
    RegionTokens { city, district }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(address: Option<&str>) -> (String, String) {
        let r = extract_region(address);
        (r.city, r.district)
    }

    #[test]
    fn test_two_levels() {
        assert_eq!(
            pair(Some("서울특별시 강남구 테헤란로 123")),
            ("서울특별시".into(), "강남구".into())
        );
    }

    #[test]
    fn test_collapses_repeated_whitespace() {
        assert_eq!(
            pair(Some("  Seoul \t  Gangnam\n12 ")),
            ("Seoul".into(), "Gangnam".into())
        );
    }

    #[test]
    fn test_single_token_has_empty_district() {
        assert_eq!(pair(Some("세종특별자치시")), ("세종특별자치시".into(), String::new()));
    }

    #[test]
    fn test_missing_and_blank() {
        assert_eq!(pair(None), (String::new(), String::new()));
        assert_eq!(pair(Some("")), (String::new(), String::new()));
        assert_eq!(pair(Some("   ")), (String::new(), String::new()));
    }
}
