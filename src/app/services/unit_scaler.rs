//! Physical-unit prefix parsing and value scaling.
//!
//! Measurement exports record values in prefixed units ("mV", "uA"); the
//! report document expresses them in the canonical base unit. Scaling is
//! best-effort: an unrecognized unit yields a neutral factor and a value
//! that fails numeric parsing is passed through unchanged.

/// Parse a unit string into a decimal exponent and the canonical unit.
///
/// A prefix is only recognized when a non-empty base unit remains, so a
/// bare "m" stays meters rather than becoming an empty milli-unit.
/// Unrecognized or empty unit strings yield `(0, unchanged)`.
pub fn unit_scale(unit: &str) -> (i32, String) {
    let unit = unit.trim();
    let mut chars = unit.chars();
    let Some(prefix) = chars.next() else {
        return (0, String::new());
    };
    let rest: String = chars.collect();
    if rest.is_empty() {
        return (0, unit.to_string());
    }

    let exponent = match prefix {
        'f' => -15,
        'p' => -12,
        'n' => -9,
        'u' | 'µ' => -6,
        'm' => -3,
        'k' => 3,
        'M' => 6,
        'G' => 9,
        _ => return (0, unit.to_string()),
    };
    (exponent, rest)
}

/// Scale a raw decimal string by `10^exponent`.
///
/// The result is a decimal string for the report document, not a binary
/// float for further arithmetic. Parse failure returns the input unchanged.
pub fn scale_value(exponent: i32, raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(value) => format!("{}", value * 10f64.powi(exponent)),
        Err(_) => raw.to_string(),
    }
}
