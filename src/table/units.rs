//! Unit markers to integer multipliers.

/// Integer multiplier implied by a unit marker.
///
/// Every `000` group multiplies by one thousand (`'000'000` is a million),
/// `mil`/`million` is a million and anything else, including an empty
/// marker, is 1. Whole currency cells such as `HKD'000` are accepted too.
pub fn unit_multiplier(unit: &str) -> i64 {
    let thousands = unit.matches("000").count() as u32;
    if thousands > 0 {
        return 1_000_i64.saturating_pow(thousands);
    }
    if unit.to_ascii_lowercase().contains("mil") {
        return 1_000_000;
    }
    1
}
