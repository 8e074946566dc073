use std::sync::OnceLock;

use regex::Regex;

fn count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*([KkMmBb])?").expect("valid count regex")
    })
}

/// Parse a human-readable count ("12.3K", "4,502", "2M followers") into an
/// integer.
///
/// Takes the first numeric token (digits with optional thousands separators
/// and an optional decimal part), applies a K/M/B magnitude suffix when one
/// immediately follows, and truncates. Anything unparseable yields 0; this
/// never fails.
pub fn parse_count(text: &str) -> u64 {
    let Some(caps) = count_re().captures(text) else {
        return 0;
    };

    let number: f64 = caps[1].replace(',', "").parse().unwrap_or(0.0);
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        Some(s) if s == "K" => 1_000.0,
        Some(s) if s == "M" => 1_000_000.0,
        Some(s) if s == "B" => 1_000_000_000.0,
        _ => 1.0,
    };

    (number * multiplier) as u64
}
