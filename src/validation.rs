//! Range checks applied before anything is written to the device.
//!
//! Every write path validates its whole input first, so a rejected value never
//! produces bus traffic.

use crate::datetime::HourMode;
use crate::registers::TimeRepresentation;

/// Time or calibration field that failed validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Second,
    Minute,
    Hour,
    Day,
    Weekday,
    Month,
    Year,
    Offset,
}

/// Rejected input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// The value is outside the legal range of the field
    OutOfRange(Field),
    /// A 24-hour value was given while the device is in 12-hour mode
    ModeMismatch,
    /// An hour write was requested without an hour mode
    HourModeRequired,
}

fn check(field: Field, in_range: bool) -> Result<(), ValidationError> {
    if in_range {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange(field))
    }
}

pub fn validate_second(second: u8) -> Result<(), ValidationError> {
    check(Field::Second, second <= 59)
}

pub fn validate_minute(minute: u8) -> Result<(), ValidationError> {
    check(Field::Minute, minute <= 59)
}

/// Validates an hour against its mode and the device's current representation.
///
/// A 24-hour value is refused while the device counts in 12-hour mode. An
/// AM/PM value is range checked only; it is accepted in either device mode.
pub fn validate_hour(
    hour: u8,
    mode: HourMode,
    time_representation: TimeRepresentation,
) -> Result<(), ValidationError> {
    match mode {
        HourMode::TwentyFourHour => {
            if time_representation == TimeRepresentation::TwelveHour {
                return Err(ValidationError::ModeMismatch);
            }
            check(Field::Hour, hour <= 23)
        }
        HourMode::Am | HourMode::Pm => check(Field::Hour, (1..=12).contains(&hour)),
    }
}

pub fn validate_day(day: u8) -> Result<(), ValidationError> {
    check(Field::Day, (1..=31).contains(&day))
}

pub fn validate_weekday(weekday: u8) -> Result<(), ValidationError> {
    check(Field::Weekday, weekday <= 6)
}

pub fn validate_month(month: u8) -> Result<(), ValidationError> {
    check(Field::Month, (1..=12).contains(&month))
}

pub fn validate_year(year: u8) -> Result<(), ValidationError> {
    check(Field::Year, year <= 99)
}

/// Offset must fit the register's 7-bit two's complement range.
pub fn validate_offset(offset: i8) -> Result<(), ValidationError> {
    check(Field::Offset, (-64..=63).contains(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_and_minute_bounds() {
        assert!(validate_second(0).is_ok());
        assert!(validate_second(59).is_ok());
        assert_eq!(
            validate_second(60),
            Err(ValidationError::OutOfRange(Field::Second))
        );
        assert!(validate_minute(59).is_ok());
        assert_eq!(
            validate_minute(60),
            Err(ValidationError::OutOfRange(Field::Minute))
        );
    }

    #[test]
    fn test_hour_in_24h_mode() {
        let rep = TimeRepresentation::TwentyFourHour;
        assert!(validate_hour(0, HourMode::TwentyFourHour, rep).is_ok());
        assert!(validate_hour(23, HourMode::TwentyFourHour, rep).is_ok());
        assert_eq!(
            validate_hour(24, HourMode::TwentyFourHour, rep),
            Err(ValidationError::OutOfRange(Field::Hour))
        );
    }

    #[test]
    fn test_hour_in_12h_mode() {
        let rep = TimeRepresentation::TwelveHour;
        assert!(validate_hour(1, HourMode::Am, rep).is_ok());
        assert!(validate_hour(12, HourMode::Pm, rep).is_ok());
        assert_eq!(
            validate_hour(0, HourMode::Am, rep),
            Err(ValidationError::OutOfRange(Field::Hour))
        );
        assert_eq!(
            validate_hour(13, HourMode::Pm, rep),
            Err(ValidationError::OutOfRange(Field::Hour))
        );
    }

    #[test]
    fn test_24h_value_rejected_on_12h_device() {
        assert_eq!(
            validate_hour(10, HourMode::TwentyFourHour, TimeRepresentation::TwelveHour),
            Err(ValidationError::ModeMismatch)
        );
    }

    #[test]
    fn test_am_pm_accepted_on_24h_device() {
        assert!(validate_hour(7, HourMode::Pm, TimeRepresentation::TwentyFourHour).is_ok());
    }

    #[test]
    fn test_calendar_bounds() {
        assert_eq!(validate_day(0), Err(ValidationError::OutOfRange(Field::Day)));
        assert!(validate_day(1).is_ok());
        assert!(validate_day(31).is_ok());
        assert_eq!(validate_day(32), Err(ValidationError::OutOfRange(Field::Day)));
        assert!(validate_weekday(6).is_ok());
        assert_eq!(
            validate_weekday(7),
            Err(ValidationError::OutOfRange(Field::Weekday))
        );
        assert_eq!(validate_month(0), Err(ValidationError::OutOfRange(Field::Month)));
        assert!(validate_month(12).is_ok());
        assert_eq!(validate_month(13), Err(ValidationError::OutOfRange(Field::Month)));
        assert!(validate_year(99).is_ok());
        assert_eq!(validate_year(100), Err(ValidationError::OutOfRange(Field::Year)));
    }

    #[test]
    fn test_offset_bounds() {
        assert!(validate_offset(-64).is_ok());
        assert!(validate_offset(63).is_ok());
        assert_eq!(
            validate_offset(-65),
            Err(ValidationError::OutOfRange(Field::Offset))
        );
        assert_eq!(
            validate_offset(64),
            Err(ValidationError::OutOfRange(Field::Offset))
        );
    }
}
