//! Payment card numbers and the demo test cards

use serde::{Deserialize, Serialize};
use std::fmt;

/// Demo card numbers that pass number validation regardless of length or checksum.
pub const MOCK_CARD_NUMBERS: [&str; 4] = [
    "1111 1111 1111 1111",
    "2222 2222 2222 2222",
    "3333 333333 33333",
    "4444 4444 4444 4444",
];

fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

/// Card number with spaces and hyphens removed. Not guaranteed to be valid.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CardNumber(String);

impl CardNumber {
    pub fn parse(raw: &str) -> Self { Self(strip_separators(raw.trim())) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_mock(&self) -> bool {
        MOCK_CARD_NUMBERS.iter().any(|mock| strip_separators(mock) == self.0)
    }

    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn passes_luhn(&self) -> bool { self.is_mock() || luhn_valid(&self.0) }

    pub fn last4(&self) -> &str {
        let start = self.0.len().saturating_sub(4);
        self.0.get(start..).unwrap_or_default()
    }

    pub fn brand(&self) -> CardBrand { CardBrand::detect(&self.0) }

    /// Amex-prefixed numbers take a four digit CVV.
    pub fn expected_cvv_len(&self) -> usize {
        if self.0.starts_with("34") || self.0.starts_with("37") { 4 } else { 3 }
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "****{}", self.last4()) }
}

/// Luhn checksum over a string of ASCII digits. Non-digit input never validates.
pub fn luhn_valid(digits: &str) -> bool {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) { return false; }
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand { Visa, Mastercard, Amex, Discover, Unknown }

impl CardBrand {
    pub fn detect(digits: &str) -> Self {
        let b = digits.as_bytes();
        match b {
            [b'4', ..] => Self::Visa,
            [b'5', b'1'..=b'5', ..] => Self::Mastercard,
            [b'3', b'4' | b'7', ..] => Self::Amex,
            [b'6', b'0', b'1', b'1', ..] | [b'6', b'5', ..] => Self::Discover,
            _ => Self::Unknown,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "visa" => Some(Self::Visa),
            "mastercard" => Some(Self::Mastercard),
            "amex" => Some(Self::Amex),
            "discover" => Some(Self::Discover),
            _ => None,
        }
    }
}

/// Prefilled billing details for a demo card.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockCard {
    pub brand: CardBrand,
    pub number: &'static str,
    pub expiry: &'static str,
    pub cvv: &'static str,
    pub name: &'static str,
    pub billing_address: &'static str,
    pub billing_city: &'static str,
    pub billing_state: &'static str,
    pub billing_zip_code: &'static str,
}

static MOCK_CARDS: [MockCard; 4] = [
    MockCard { brand: CardBrand::Visa, number: MOCK_CARD_NUMBERS[0], expiry: "12/28", cvv: "123", name: "Test User Visa", billing_address: "123 Test Street", billing_city: "Testville", billing_state: "CA", billing_zip_code: "12345" },
    MockCard { brand: CardBrand::Mastercard, number: MOCK_CARD_NUMBERS[1], expiry: "12/28", cvv: "123", name: "Test User MasterCard", billing_address: "456 Demo Avenue", billing_city: "Sample City", billing_state: "NY", billing_zip_code: "12345" },
    MockCard { brand: CardBrand::Amex, number: MOCK_CARD_NUMBERS[2], expiry: "12/28", cvv: "123", name: "Test User Amex", billing_address: "789 Example Boulevard", billing_city: "Test City", billing_state: "TX", billing_zip_code: "12345" },
    MockCard { brand: CardBrand::Discover, number: MOCK_CARD_NUMBERS[3], expiry: "12/28", cvv: "123", name: "Test User Discover", billing_address: "321 Sample Road", billing_city: "Demo Town", billing_state: "FL", billing_zip_code: "12345" },
];

impl MockCard {
    /// Details for a demo brand; unknown brands fall back to the Visa card.
    pub fn for_brand(brand: CardBrand) -> &'static MockCard {
        MOCK_CARDS.iter().find(|card| card.brand == brand).unwrap_or(&MOCK_CARDS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luhn_known_numbers() {
        assert!(luhn_valid("4111111111111111"));
        assert!(luhn_valid("378282246310005"));
        assert!(!luhn_valid("4111111111111112"));
        assert!(!luhn_valid("41111a1111111111"));
    }

    #[test]
    fn test_mock_cards_ignore_separators() {
        assert!(CardNumber::parse("1111-1111-1111-1111").is_mock());
        assert!(CardNumber::parse("333333333333333").is_mock());
        assert!(!CardNumber::parse("4111 1111 1111 1111").is_mock());
        assert!(CardNumber::parse("2222 2222 2222 2222").passes_luhn());
    }

    #[test]
    fn test_brand_detection() {
        assert_eq!(CardNumber::parse("4111 1111 1111 1111").brand(), CardBrand::Visa);
        assert_eq!(CardNumber::parse("5500 0000 0000 0004").brand(), CardBrand::Mastercard);
        assert_eq!(CardNumber::parse("3782 822463 10005").brand(), CardBrand::Amex);
        assert_eq!(CardNumber::parse("6011 1111 1111 1117").brand(), CardBrand::Discover);
        assert_eq!(CardNumber::parse("1111 1111 1111 1111").brand(), CardBrand::Unknown);
    }

    #[test]
    fn test_last4_ignores_separators() {
        let card = CardNumber::parse("4111-1111-1111-1234");
        assert_eq!(card.last4(), "1234");
        assert_eq!(card.to_string(), "****1234");
        assert_eq!(CardNumber::parse("12").last4(), "12");
    }

    #[test]
    fn test_cvv_length_by_prefix() {
        assert_eq!(CardNumber::parse("378282246310005").expected_cvv_len(), 4);
        assert_eq!(CardNumber::parse("3333 333333 33333").expected_cvv_len(), 3);
        assert_eq!(CardNumber::parse("4111111111111111").expected_cvv_len(), 3);
    }

    #[test]
    fn test_mock_card_lookup_falls_back_to_visa() {
        assert_eq!(MockCard::for_brand(CardBrand::Amex).name, "Test User Amex");
        assert_eq!(MockCard::for_brand(CardBrand::Unknown).brand, CardBrand::Visa);
    }
}
