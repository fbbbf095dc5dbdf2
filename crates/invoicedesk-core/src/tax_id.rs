//! Brazilian tax identifiers: CPF (individuals, 11 digits) and CNPJ
//! (organizations, 14 digits).
//!
//! These helpers are advisory. Draft validation only requires a non-blank
//! tax id; the directory service is the authority on what it accepts.

/// What kind of identifier a tax id looks like once punctuation is stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxIdKind {
    Cpf,
    Cnpj,
    Unknown,
}

impl TaxIdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpf => "CPF",
            Self::Cnpj => "CNPJ",
            Self::Unknown => "unknown",
        }
    }
}

const CNPJ_WEIGHTS_1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_WEIGHTS_2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Keep only ASCII digits.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

pub fn kind(raw: &str) -> TaxIdKind {
    match digits(raw).len() {
        11 => TaxIdKind::Cpf,
        14 => TaxIdKind::Cnpj,
        _ => TaxIdKind::Unknown,
    }
}

/// True when `raw` is a CPF or CNPJ whose check digits are correct.
pub fn has_valid_check_digits(raw: &str) -> bool {
    let d: Vec<u32> = digits(raw).chars().filter_map(|c| c.to_digit(10)).collect();
    // Repeated digits (000.000.000-00 etc.) pass the arithmetic but are never issued.
    if d.is_empty() || d.iter().all(|&x| x == d[0]) {
        return false;
    }
    match d.len() {
        11 => {
            let w1: Vec<u32> = (2..=10).rev().collect();
            let w2: Vec<u32> = (2..=11).rev().collect();
            check_digit(&d[..9], &w1) == d[9] && check_digit(&d[..10], &w2) == d[10]
        }
        14 => {
            check_digit(&d[..12], &CNPJ_WEIGHTS_1) == d[12]
                && check_digit(&d[..13], &CNPJ_WEIGHTS_2) == d[13]
        }
        _ => false,
    }
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        r if r < 2 => 0,
        r => 11 - r,
    }
}

/// Apply the display mask for CPF (`XXX.XXX.XXX-XX`) or CNPJ
/// (`XX.XXX.XXX/XXXX-XX`). Anything else is returned unchanged.
pub fn format(raw: &str) -> String {
    let d = digits(raw);
    match d.len() {
        11 => format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..]),
        14 => format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        ),
        _ => raw.to_string(),
    }
}
