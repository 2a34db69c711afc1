// src/utils/normalize.rs

//! Text normalization for scraped product fields.

use regex::Regex;

/// Maximum length (in characters) of a cache-safe product name.
const MAX_SAFE_NAME_LEN: usize = 200;

/// Strip a price down to its digits and decimal points.
///
/// `"$1,234.56"` becomes `"1234.56"`. Every point is kept, so text such as
/// `"1.299.99"` stays malformed and fails validation.
pub fn clean_price(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Guess the brand from a product name.
///
/// Case-insensitive substring match against `brands` in order; the first hit
/// wins. Returns `"Unknown"` when nothing matches.
pub fn extract_brand(product_name: &str, brands: &[String]) -> String {
    let lowered = product_name.to_lowercase();
    brands
        .iter()
        .find(|brand| lowered.contains(&brand.to_lowercase()))
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Pull a model number out of a product name.
///
/// Text after the last hyphen wins when the name has one. Otherwise the first
/// token shaped like a TV model code is used, and failing that the whole name.
pub fn extract_model_number(product_name: &str) -> String {
    if let Some((_, suffix)) = product_name.rsplit_once('-') {
        return suffix.trim().to_string();
    }

    let patterns = [
        r"[A-Z0-9]{2,}[A-Z][0-9]{2,}[A-Z0-9]*",
        r"[A-Z]{2,}[0-9]{2,}[A-Z]*[0-9]*",
    ];
    for pattern in patterns {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(m) = re.find(product_name) {
            return m.as_str().to_string();
        }
    }
    product_name.to_string()
}

/// Make a product name usable as part of a file name.
///
/// Path-hostile characters become `_`, single quotes are dropped, and the
/// result is cut to 200 characters. Distinct names sharing a 200-character
/// prefix map to the same string.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '\'')
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .take(MAX_SAFE_NAME_LEN)
        .collect()
}

/// Collapse runs of whitespace and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brands() -> Vec<String> {
        vec!["Samsung".into(), "LG".into(), "Hisense".into(), "SONY".into()]
    }

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price("$1,234.56"), "1234.56");
        assert_eq!(clean_price("  CA$ 899.99 "), "899.99");
        assert_eq!(clean_price("1,299."), "1299.");
        assert_eq!(clean_price("1.299.99"), "1.299.99");
        assert_eq!(clean_price("n/a"), "");
    }

    #[test]
    fn test_extract_brand() {
        assert_eq!(
            extract_brand("Samsung 65\" 4K TV - QN65Q60DAFXZC", &brands()),
            "Samsung"
        );
        assert_eq!(extract_brand("sony bravia xr", &brands()), "SONY");
        assert_eq!(extract_brand("TCL 55\" QLED", &brands()), "Unknown");
    }

    #[test]
    fn test_extract_model_number_hyphen() {
        assert_eq!(
            extract_model_number("Samsung TV - QN65Q60DAFXZC"),
            "QN65Q60DAFXZC"
        );
    }

    #[test]
    fn test_extract_model_number_pattern() {
        assert_eq!(extract_model_number("LG OLED65C1PUB 65\" TV"), "OLED65C1PUB");
        assert_eq!(extract_model_number("Sony XR65A80K"), "XR65A80K");
    }

    #[test]
    fn test_extract_model_number_fallback() {
        assert_eq!(extract_model_number("big tv"), "big tv");
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(
            safe_filename("Samsung 65\" 4K TV - QN65Q60DAFXZC"),
            "Samsung 65_ 4K TV - QN65Q60DAFXZC"
        );
        assert_eq!(safe_filename("a/b:c*d?'e'"), "a_b_c_d_e");
        assert_eq!(safe_filename(&"x".repeat(250)).chars().count(), 200);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  LG \n  OLED\tC1 "), "LG OLED C1");
    }
}
