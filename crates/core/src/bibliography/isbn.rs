//! ISBN cleanup and ISBN-10 to ISBN-13 conversion.

/// Clean a raw ISBN field value into a normalized ISBN-13.
///
/// Everything except digits and `X` is stripped. Ten-character results are
/// converted to ISBN-13; anything shorter than 13 characters afterwards is
/// rejected.
pub fn clean_isbn(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            'x' | 'X' => Some('X'),
            _ => None,
        })
        .collect();

    if cleaned.len() < 10 {
        return None;
    }

    let isbn = if cleaned.len() == 10 {
        convert_isbn10_to_13(&cleaned)
    } else {
        cleaned
    };

    (isbn.len() >= 13).then_some(isbn)
}

/// Convert an ISBN-10 to its ISBN-13 form.
///
/// The ISBN-10 check digit is dropped, `978` is prepended to the first nine
/// digits and a fresh ISBN-13 check digit is appended.
pub fn convert_isbn10_to_13(isbn10: &str) -> String {
    let body: String = isbn10.chars().take(9).collect();
    let twelve = format!("978{}", body);
    let check = isbn13_check_digit(&twelve);
    format!("{}{}", twelve, check)
}

/// Check whether a 13-digit string carries a valid ISBN-13 check digit.
pub fn is_valid_isbn13(isbn: &str) -> bool {
    if isbn.len() != 13 || !isbn.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let expected = isbn13_check_digit(&isbn[..12]);
    isbn[12..].parse::<u32>().ok() == Some(expected)
}

/// Alternating 1x/3x weighted checksum over the first twelve digits.
fn isbn13_check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .chars()
        .filter_map(|c| c.to_digit(10))
        .take(12)
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d } else { d * 3 })
        .sum();
    (10 - sum % 10) % 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_isbn13_with_hyphens() {
        assert_eq!(
            clean_isbn("978-1-56931-901-7"),
            Some("9781569319017".to_string())
        );
    }

    #[test]
    fn test_clean_isbn10_converts() {
        let isbn = clean_isbn("1-56931-902-5").unwrap();
        assert_eq!(isbn.len(), 13);
        assert!(isbn.starts_with("978156931902"));
        assert_eq!(isbn, "9781569319024");
        assert!(is_valid_isbn13(&isbn));
    }

    #[test]
    fn test_clean_isbn_too_short() {
        assert_eq!(clean_isbn("123"), None);
        assert_eq!(clean_isbn(""), None);
        assert_eq!(clean_isbn("ISBN"), None);
    }

    #[test]
    fn test_clean_isbn_eleven_chars_rejected() {
        // Neither a valid ISBN-10 nor long enough for ISBN-13.
        assert_eq!(clean_isbn("12345678901"), None);
    }

    #[test]
    fn test_clean_isbn10_with_x_check_digit() {
        let isbn = clean_isbn("0-8044-2957-x").unwrap();
        assert_eq!(isbn, "9780804429573");
        assert!(is_valid_isbn13(&isbn));
    }

    #[test]
    fn test_convert_isbn10_known_value() {
        assert_eq!(convert_isbn10_to_13("0306406152"), "9780306406157");
    }

    #[test]
    fn test_converted_isbns_always_checksum_valid() {
        let samples = [
            "0306406152",
            "1569319025",
            "4088725093",
            "1421506637",
            "080442957X",
            "0000000000",
            "9999999999",
        ];
        for sample in samples {
            let converted = convert_isbn10_to_13(sample);
            assert_eq!(converted.len(), 13, "{}", sample);
            assert!(converted.chars().all(|c| c.is_ascii_digit()));
            assert!(is_valid_isbn13(&converted), "{} -> {}", sample, converted);
        }
    }

    #[test]
    fn test_is_valid_isbn13_rejects_bad_checksum() {
        assert!(is_valid_isbn13("9781569319017"));
        assert!(!is_valid_isbn13("9781569319018"));
        assert!(!is_valid_isbn13("978156931901"));
    }
}
