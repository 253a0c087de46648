/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use rust_leads_api::core::models::ContactCardRequest;
use rust_leads_api::core::validators::{
    is_valid_sa_id, is_valid_sa_mobile, normalize_sa_msisdn,
};
use rust_leads_api::vcard::build_vcard;

// Property: MSISDN normalization should never panic and always yields an
// international SA number
proptest! {
    #[test]
    fn msisdn_normalization_never_panics(raw in "\\PC*") {
        let _ = normalize_sa_msisdn(&raw);
    }

    #[test]
    fn normalized_msisdn_is_digits_with_sa_prefix(raw in "\\PC*") {
        let normalized = normalize_sa_msisdn(&raw);
        prop_assert!(normalized.starts_with("27"));
        prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn msisdn_normalization_is_idempotent(raw in "[0-9 ()+-]{0,15}") {
        let once = normalize_sa_msisdn(&raw);
        let twice = normalize_sa_msisdn(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn local_numbers_lose_their_leading_zero(rest in "[0-9]{9}") {
        let local = format!("0{}", rest);
        prop_assert_eq!(normalize_sa_msisdn(&local), format!("27{}", rest));
    }
}

// Property: SA ID validation accepts only 13-digit strings with a matching
// check digit
proptest! {
    #[test]
    fn sa_id_validation_never_panics(id in "\\PC*") {
        let _ = is_valid_sa_id(&id);
    }

    #[test]
    fn sa_id_rejects_wrong_lengths(id in "[0-9]{1,12}") {
        prop_assert!(!is_valid_sa_id(&id));
    }

    #[test]
    fn sa_id_rejects_non_digits(prefix in "[0-9]{6}", suffix in "[0-9]{6}") {
        let id = format!("{}x{}", prefix, suffix);
        prop_assert!(!is_valid_sa_id(&id));
    }

    #[test]
    fn exactly_one_check_digit_completes_an_id(prefix in "[0-9]{12}") {
        let valid_completions = (0..10)
            .filter(|d| is_valid_sa_id(&format!("{}{}", prefix, d)))
            .count();
        prop_assert_eq!(valid_completions, 1);
    }
}

// Property: the mobile regex accepts exactly the ten-digit 06/07/08 shapes
proptest! {
    #[test]
    fn sa_mobile_accepts_valid_prefixes(prefix in 6u8..=8u8, rest in "[0-9]{8}") {
        let mobile = format!("0{}{}", prefix, rest);
        prop_assert!(is_valid_sa_mobile(&mobile));
    }

    #[test]
    fn sa_mobile_rejects_other_lengths(prefix in 6u8..=8u8, rest in "[0-9]{0,7}") {
        let mobile = format!("0{}{}", prefix, rest);
        prop_assert!(!is_valid_sa_mobile(&mobile));
    }

    #[test]
    fn sa_mobile_rejects_landline_prefixes(prefix in 1u8..=5u8, rest in "[0-9]{8}") {
        let mobile = format!("0{}{}", prefix, rest);
        prop_assert!(!is_valid_sa_mobile(&mobile));
    }
}

// Property: vCard assembly is structurally stable for any form input
proptest! {
    #[test]
    fn vcard_structure_holds_for_any_names(
        name in "[A-Za-z][A-Za-z ]{0,11}",
        surname in "[A-Za-z][A-Za-z ]{0,11}",
        products in proptest::collection::vec("[A-Za-z ]{1,10}", 0..4),
        has_email in proptest::bool::ANY,
    ) {
        let req = ContactCardRequest {
            name,
            surname,
            email: has_email.then(|| "lead@example.com".to_string()),
            mobile: "0823292438".to_string(),
            is_discovery_customer: true,
            has_vitality: false,
            products,
            consent: true,
            phone_type: "iphone".to_string(),
        };
        let card = build_vcard(&req);

        prop_assert_eq!(card.matches("BEGIN:VCARD").count(), 1);
        prop_assert_eq!(card.matches("END:VCARD").count(), 1);

        let note = card.lines().find(|l| l.starts_with("NOTE:")).unwrap();
        prop_assert_eq!(note.matches(" | ").count(), 3);

        prop_assert_eq!(card.contains("EMAIL;TYPE=INTERNET:"), has_email);
    }
}
