//! Human-readable identifiers for accounts, doctors, appointments and slots.
//!
//! Uniqueness is finally enforced by the store's keys; these only need to make
//! collisions rare.

use chrono::{Datelike, Local};
use rand::Rng;

/// 10-digit patient account id.
pub fn new_aid() -> String {
    numeric_id(10)
}

/// 8-digit doctor id.
pub fn new_did() -> String {
    numeric_id(8)
}

/// 12-digit appointment id: `yyMMdd` followed by 6 random digits.
pub fn new_apid() -> String {
    let date = Local::now().format("%y%m%d");
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{}{:06}", date, random)
}

/// Positive slot id, never zero.
pub fn new_sid() -> i64 {
    rand::thread_rng().gen_range(1..=i64::from(i32::MAX))
}

/// Day-of-year prefix followed by 6 random digits, keeping the last `width` digits.
fn numeric_id(width: usize) -> String {
    let prefix = u64::from(Local::now().ordinal());
    let random: u64 = rand::thread_rng().gen_range(0..1_000_000);
    let digits = (prefix * 1_000_000 + random).to_string();
    let tail = if digits.len() > width {
        &digits[digits.len() - width..]
    } else {
        digits.as_str()
    };
    format!("{:0>width$}", tail, width = width)
}
