//! CPF (Brazilian national identifier) handling
//!
//! A CPF is 9 base digits followed by 2 check digits. Each check digit is a
//! weighted mod-11 sum over the digits before it, with remainders below 2
//! mapping to 0.

use lazy_static::lazy_static;
use regex::Regex;

pub const CPF_LENGTH: usize = 11;

lazy_static! {
    static ref NON_DIGIT: Regex = Regex::new(r"\D").unwrap();
}

/// Strip every non-digit character
pub fn normalize(raw: &str) -> String {
    NON_DIGIT.replace_all(raw, "").into_owned()
}

/// Check length, degenerate sequences and both check digits
pub fn is_valid(cpf: &str) -> bool {
    let digits: Vec<u32> = match cpf.chars().map(|c| c.to_digit(10)).collect() {
        Some(digits) => digits,
        None => return false,
    };

    if digits.len() != CPF_LENGTH {
        return false;
    }

    // 000.000.000-00, 111.111.111-11, ... pass the checksum but are not issued
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

/// Weighted mod-11 check digit over `digits`; weights run from len+1 down to 2
fn check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

/// Render digits as `XXX.XXX.XXX-YY`
///
/// Partial input is masked progressively: only the groups typed so far get
/// their punctuation. Anything beyond 11 digits is dropped.
pub fn format(raw: &str) -> String {
    let digits: String = normalize(raw).chars().take(CPF_LENGTH).collect();

    let mut formatted = String::with_capacity(14);
    for (i, c) in digits.chars().enumerate() {
        match i {
            3 | 6 => formatted.push('.'),
            9 => formatted.push('-'),
            _ => {}
        }
        formatted.push(c);
    }
    formatted
}
