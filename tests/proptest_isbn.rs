use proptest::prelude::*;

use bibliogenius_isbn::isbn::{self, checksum};

fn valid_isbn10() -> impl Strategy<Value = String> {
    "[0-9]{9}".prop_map(|body| {
        let check = checksum::isbn10_check(&body);
        format!("{}{}", body, check)
    })
}

fn valid_isbn13_978() -> impl Strategy<Value = String> {
    "978[0-9]{9}".prop_map(|body| {
        let check = checksum::isbn13_check(&body);
        format!("{}{}", body, check)
    })
}

proptest! {
    #[test]
    fn normalize_yields_isbn_alphabet(s in any::<String>()) {
        let normalized = isbn::normalize(&s);
        prop_assert!(normalized.chars().all(|c| c.is_ascii_digit() || c == 'X'));
        prop_assert_eq!(isbn::normalize(&normalized), normalized.clone());
    }

    #[test]
    fn validity_depends_only_on_normalized_content(s in "[0-9X -]{0,20}") {
        let normalized = isbn::normalize(&s);
        prop_assert_eq!(isbn::is_valid(&s), isbn::is_valid(&normalized));
        prop_assert_eq!(isbn::is_valid(&s), isbn::is_valid(&s));
    }

    #[test]
    fn isbn10_round_trips_through_isbn13(n in valid_isbn10()) {
        let isbn13 = isbn::to_isbn13(&n).unwrap();
        let isbn10 = isbn::to_isbn10(&isbn13).unwrap();
        prop_assert_eq!(&isbn10, &isbn::normalize(&n));
        prop_assert_eq!(isbn::to_isbn13(&isbn10).unwrap(), isbn13);
    }

    #[test]
    fn isbn13_978_round_trips_through_isbn10(n in valid_isbn13_978()) {
        let isbn10 = isbn::to_isbn10(&n).unwrap();
        prop_assert_eq!(isbn::to_isbn13(&isbn10).unwrap(), n);
    }

    #[test]
    fn corrected_isbn13_is_a_fixed_point(s in "[0-9]{13}") {
        let once = isbn::corrected_isbn13(&s).unwrap();
        prop_assert!(isbn::is_valid(&once));
        prop_assert_eq!(isbn::corrected_isbn13(&once).unwrap(), once);
    }

    #[test]
    fn single_digit_change_breaks_isbn13(n in valid_isbn13_978(), pos in 3usize..13, delta in 1u8..10) {
        let mut bytes = n.into_bytes();
        bytes[pos] = b'0' + (bytes[pos] - b'0' + delta) % 10;
        let changed = String::from_utf8(bytes).unwrap();
        prop_assert!(!isbn::is_valid(&changed));
    }
}
