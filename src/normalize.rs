//! Spreadsheet date serials to SQL datetime text.
//!
//! Spreadsheets store dates as a day count from 1899-12-30. Numeric cells in a
//! `datetime` column are converted to `YYYY-MM-DD HH:MM:SS` (UTC) before the
//! type check runs; text cells are left alone.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::data::Cell;

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01.
pub const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25569.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const SQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATETIME_TYPE: &str = "datetime";

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Date serial {serial} is outside the representable range")]
pub struct NormalizeError {
    pub serial: f64,
}

pub fn serial_to_datetime(serial: f64) -> Result<String, NormalizeError> {
    if !serial.is_finite() {
        return Err(NormalizeError { serial });
    }
    let seconds = ((serial - SERIAL_EPOCH_OFFSET_DAYS) * SECONDS_PER_DAY).round();
    if seconds.abs() >= i64::MAX as f64 {
        return Err(NormalizeError { serial });
    }
    let timestamp: DateTime<Utc> =
        DateTime::from_timestamp(seconds as i64, 0).ok_or(NormalizeError { serial })?;
    Ok(timestamp.format(SQL_DATETIME_FORMAT).to_string())
}

/// Text a cell contributes to a column of `sql_type`.
///
/// Only numeric cells in columns typed exactly `datetime` are converted.
pub fn normalize_cell<'a>(cell: &'a Cell, sql_type: &str) -> Result<Cow<'a, str>, NormalizeError> {
    match cell {
        Cell::Number(serial) if sql_type == DATETIME_TYPE => {
            serial_to_datetime(*serial).map(Cow::Owned)
        }
        other => Ok(other.as_display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_day_serial_is_midnight() {
        assert_eq!(serial_to_datetime(44197.0).unwrap(), "2021-01-01 00:00:00");
        assert_eq!(serial_to_datetime(25569.0).unwrap(), "1970-01-01 00:00:00");
    }

    #[test]
    fn fractional_serial_rounds_to_nearest_second() {
        assert_eq!(serial_to_datetime(44197.5).unwrap(), "2021-01-01 12:00:00");
        let almost_one_am = 44197.0 + (3599.6 / 86_400.0);
        assert_eq!(serial_to_datetime(almost_one_am).unwrap(), "2021-01-01 01:00:00");
    }

    #[test]
    fn serials_before_unix_epoch_are_supported() {
        assert_eq!(serial_to_datetime(1.0).unwrap(), "1899-12-31 00:00:00");
    }

    #[test]
    fn non_finite_and_huge_serials_are_rejected() {
        assert!(serial_to_datetime(f64::NAN).is_err());
        assert!(serial_to_datetime(f64::INFINITY).is_err());
        assert!(serial_to_datetime(1e300).is_err());
    }

    #[test]
    fn only_numeric_cells_in_datetime_columns_are_converted() {
        let serial = Cell::Number(44197.0);
        assert_eq!(normalize_cell(&serial, "datetime").unwrap(), "2021-01-01 00:00:00");
        assert_eq!(normalize_cell(&serial, "int").unwrap(), "44197");
        assert_eq!(normalize_cell(&serial, "datetime(6)").unwrap(), "44197");

        let text = Cell::text("44197");
        assert_eq!(normalize_cell(&text, "datetime").unwrap(), "44197");
    }
}
