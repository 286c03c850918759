//! Helpers shared by the SQLite repositories.

use commipay_core::errors::Result;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::errors::StorageError;

/// Upper bound on bound parameters per `IN (...)` list; SQLite caps a
/// statement at 999 variables by default.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits `items` into slices small enough for one `eq_any` filter.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Canonical text form of a money amount, so equality filters on the text
/// column behave like numeric equality (`1000.00` and `1000` store alike).
pub fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn text_to_decimal(value: &str, column: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        StorageError::CorruptValue(format!("{} holds '{}': {}", column, value, e)).into()
    })
}

/// `%term%` with LIKE wildcards in `term` escaped by `\`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
