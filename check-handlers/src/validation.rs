//! Format rules for command arguments.

use regex::Regex;
use std::sync::LazyLock;

/// 17 characters, Latin letters except I, O, Q, and digits.
static VIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("VIN pattern"));

/// Letter, 3 digits, 2 letters, 2–3 digit region code. Letters are the 12 shared by
/// Cyrillic and Latin plates, accepted in either script and either case.
static REG_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[АВЕКМНОРСТУХABEKMHOPCTYX][0-9]{3}[АВЕКМНОРСТУХABEKMHOPCTYX]{2}[0-9]{2,3}$",
    )
    .expect("registration number pattern")
});

/// Exactly 10 ASCII digits.
static STS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("STS pattern"));

/// Upper-cases a VIN or registration number the way users are expected to type it.
pub fn normalize(value: &str) -> String {
    value.to_uppercase()
}

pub fn is_valid_vin(vin: &str) -> bool {
    VIN_RE.is_match(vin)
}

pub fn is_valid_reg_number(reg_number: &str) -> bool {
    REG_NUMBER_RE.is_match(reg_number)
}

pub fn is_valid_sts(sts_number: &str) -> bool {
    STS_RE.is_match(sts_number)
}
