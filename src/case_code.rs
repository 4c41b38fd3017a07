use calamine::Data;
use regex::Regex;
use std::sync::LazyLock;

static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());
static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D+").unwrap());

/// Spellings meaning "no number assigned"
const UNASSIGNED_ALIASES: [&str; 3] = ["S/N", "SN", "S. N."];

/// Code used when nothing else yields a non-empty value
const UNASSIGNED_CODE: &str = "SN";

const MAX_IDENTIFIER_LEN: usize = 30;
const MAX_NUMERIC_IDENTIFIER: f64 = 1e9;

/// An identifier cell that passed validation
#[derive(Debug, Clone, PartialEq)]
enum Identifier<'a> {
    Number(f64),
    Unassigned,
    Text(&'a str),
}

/// Derives the canonical case code for a sheet; never empty.
///
/// Tiers, first non-empty wins:
/// 1. the identifier cell (number, "S/N" alias, or the digits in its text)
/// 2. the digits in the sheet name
/// 3. the trimmed sheet name
pub fn derive_case_code(sheet_name: &str, raw: &Data) -> String {
    let sheet_digits = extract_digits(sheet_name);

    from_identifier(raw, &sheet_digits)
        .or_else(|| non_empty(sheet_digits))
        .or_else(|| non_empty(sheet_name.trim().to_string()))
        .unwrap_or_else(|| UNASSIGNED_CODE.to_string())
}

fn from_identifier(raw: &Data, sheet_digits: &str) -> Option<String> {
    match classify(raw)? {
        Identifier::Number(n) => Some(format!("{}", n.trunc() as i64)),
        Identifier::Unassigned => Some(
            non_empty(sheet_digits.to_string()).unwrap_or_else(|| UNASSIGNED_CODE.to_string()),
        ),
        Identifier::Text(s) => non_empty(extract_digits(s)),
    }
}

/// Validates the raw identifier cell; `None` if it should be ignored.
fn classify(raw: &Data) -> Option<Identifier<'_>> {
    match raw {
        Data::Float(f) => valid_number(*f),
        Data::Int(i) => valid_number(*i as f64),
        Data::String(s) => {
            let s = s.trim();
            if s.chars().count() > MAX_IDENTIFIER_LEN {
                return None;
            }
            let upper = s.to_uppercase();
            if UNASSIGNED_ALIASES.contains(&upper.as_str()) {
                Some(Identifier::Unassigned)
            } else if DIGIT.is_match(s) {
                Some(Identifier::Text(s))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn valid_number(n: f64) -> Option<Identifier<'static>> {
    // zero and huge values are spreadsheet artifacts, not case numbers
    (n != 0.0 && n < MAX_NUMERIC_IDENTIFIER).then_some(Identifier::Number(n))
}

fn extract_digits(s: &str) -> String {
    NON_DIGITS.replace_all(s, "").into_owned()
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}
