use chrono::{DateTime, Utc};
use rand::Rng;

const BADGE_PREFIX: &str = "BN";
const SUFFIX_LEN: usize = 6;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `BN-<base36 unix millis>-<random base36>`, upper-cased.
///
/// Unique with high probability only; the `tickets.badge_number` constraint
/// is what actually enforces uniqueness.
pub fn generate_badge_number() -> String {
    badge_number_at(Utc::now(), &mut rand::thread_rng())
}

pub fn badge_number_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36_DIGITS[rng.gen_range(0..BASE36_DIGITS.len())]))
        .collect();

    format!("{BADGE_PREFIX}-{}-{suffix}", to_base36(millis)).to_uppercase()
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}
