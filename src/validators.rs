//! Pure validators and formatters for South African lead data.
//!
//! These are the only pieces of the funnel with locally-enforced semantics:
//! the SA ID checksum, the SA mobile format accepted by the sign-up forms,
//! and MSISDN normalization for the SMS gateway.

use regex::Regex;

/// Validate a South African ID number.
///
/// Accepts exactly 13 digits whose Luhn-style weighted sum is divisible by
/// ten: digits at odd (0-based) positions are doubled, with 9 subtracted from
/// any doubled value above 9.
pub fn is_valid_sa_id(id: &str) -> bool {
    if id.len() != 13 || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let mut sum = 0u32;
    for (i, b) in id.bytes().enumerate() {
        let mut digit = (b - b'0') as u32;
        if i % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

/// Validate the SA mobile format the sign-up forms accept: ten digits
/// starting 06, 07 or 08.
pub fn is_valid_sa_mobile(mobile: &str) -> bool {
    let mobile_regex = Regex::new(r"^(06|07|08)[0-9]{8}$").unwrap();
    mobile_regex.is_match(mobile)
}

/// Normalize a mobile number to international SA form for the SMS gateway.
///
/// Strips every non-digit, then: a `27` prefix is kept as-is, a leading `0`
/// is replaced with `27`, and anything else gets `27` prepended.
pub fn normalize_sa_msisdn(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with("27") {
        digits
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("27{}", rest)
    } else {
        format!("27{}", digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference number with a valid checksum (sum of weighted digits % 10 == 0).
    const VALID_ID: &str = "8001015009087";

    #[test]
    fn sa_id_accepts_valid_checksum() {
        assert!(is_valid_sa_id(VALID_ID));
    }

    #[test]
    fn sa_id_rejects_bad_checksum() {
        assert!(!is_valid_sa_id("8001015009088"));
        assert!(!is_valid_sa_id("8001015009086"));
    }

    #[test]
    fn sa_id_rejects_wrong_length_and_non_digits() {
        assert!(!is_valid_sa_id(""));
        assert!(!is_valid_sa_id("800101500908"));
        assert!(!is_valid_sa_id("80010150090877"));
        assert!(!is_valid_sa_id("80010150090a7"));
        assert!(!is_valid_sa_id("8001015009 87"));
    }

    #[test]
    fn mobile_accepts_sa_prefixes() {
        assert!(is_valid_sa_mobile("0612345678"));
        assert!(is_valid_sa_mobile("0712345678"));
        assert!(is_valid_sa_mobile("0823292438"));
    }

    #[test]
    fn mobile_rejects_other_shapes() {
        assert!(!is_valid_sa_mobile("0912345678"));
        assert!(!is_valid_sa_mobile("071234567"));
        assert!(!is_valid_sa_mobile("07123456789"));
        assert!(!is_valid_sa_mobile("+27712345678"));
        assert!(!is_valid_sa_mobile("071 234 5678"));
        assert!(!is_valid_sa_mobile(""));
    }

    #[test]
    fn msisdn_keeps_27_prefix() {
        assert_eq!(normalize_sa_msisdn("27823292438"), "27823292438");
    }

    #[test]
    fn msisdn_replaces_leading_zero() {
        assert_eq!(normalize_sa_msisdn("0823292438"), "27823292438");
    }

    #[test]
    fn msisdn_prefixes_bare_numbers() {
        assert_eq!(normalize_sa_msisdn("823292438"), "27823292438");
    }

    #[test]
    fn msisdn_strips_formatting_characters() {
        assert_eq!(normalize_sa_msisdn("082 329-2438"), "27823292438");
        assert_eq!(normalize_sa_msisdn("+27 82 329 2438"), "27823292438");
    }
}
