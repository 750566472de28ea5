//! Date and time record and the codec for the PCF8523 time registers.
//!
//! The PCF8523 keeps the time in 7 consecutive registers starting at 0x03:
//! seconds, minutes, hours, day of month, weekday, month and a 2-digit year.
//! All of them are BCD except the weekday, which is a plain 0-6 value.
//!
//! # Hour modes
//!
//! Hardware carries two bits of hour state: the 12/24 select in control
//! register 1 and the PM flag (bit 5 of the hour byte). The driver turns them
//! into one of three [`HourMode`]s:
//!
//! - In 24-hour mode bit 5 is the tens digit of the hour and is never treated
//!   as a flag.
//! - In 12-hour mode bit 5 is stripped and read as PM (set) or AM (clear).
//!
//! # Features
//!
//! - Conversion to/from chrono `NaiveDateTime`, with the century supplied by
//!   the caller
//! - Whole-record validation before anything is encoded

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd::{bcd_to_decimal, decimal_to_bcd};
use crate::registers::{Hours, RegAddr, Seconds, TimeRepresentation};
use crate::validation::{
    validate_day, validate_hour, validate_minute, validate_month, validate_second,
    validate_weekday, validate_year, ValidationError,
};

/// How an hour value is to be read.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourMode {
    /// 0-23
    #[default]
    TwentyFourHour,
    /// 1-12 before noon
    Am,
    /// 1-12 after noon
    Pm,
}

/// Splits a raw hour byte into its decimal value and mode.
pub(crate) fn decode_hour(raw: u8, time_representation: TimeRepresentation) -> (u8, HourMode) {
    let hours = Hours::from(raw);
    match time_representation {
        TimeRepresentation::TwentyFourHour => {
            (bcd_to_decimal(hours.bcd_24h()), HourMode::TwentyFourHour)
        }
        TimeRepresentation::TwelveHour => {
            let mode = if hours.pm() { HourMode::Pm } else { HourMode::Am };
            (bcd_to_decimal(hours.bcd_12h()), mode)
        }
    }
}

/// Encodes an already validated hour, setting the PM flag for [`HourMode::Pm`].
pub(crate) fn encode_hour(hour: u8, mode: HourMode) -> u8 {
    let mut hours = Hours::default();
    match mode {
        HourMode::TwentyFourHour => hours.set_bcd_24h(decimal_to_bcd(hour)),
        HourMode::Am => hours.set_bcd_12h(decimal_to_bcd(hour)),
        HourMode::Pm => {
            hours.set_bcd_12h(decimal_to_bcd(hour));
            hours.set_pm(true);
        }
    }
    hours.into()
}

/// A single time register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DatetimeField {
    Second,
    Minute,
    Hour,
    Day,
    Weekday,
    Month,
    Year,
}

impl DatetimeField {
    /// Register holding this field.
    #[must_use]
    pub const fn register(self) -> RegAddr {
        match self {
            DatetimeField::Second => RegAddr::Seconds,
            DatetimeField::Minute => RegAddr::Minutes,
            DatetimeField::Hour => RegAddr::Hours,
            DatetimeField::Day => RegAddr::Days,
            DatetimeField::Weekday => RegAddr::Weekdays,
            DatetimeField::Month => RegAddr::Months,
            DatetimeField::Year => RegAddr::Years,
        }
    }
}

/// Decodes one time register. The hour mode is only returned for the hour.
///
/// The clock-integrity flag is not checked here.
pub(crate) fn decode_datetime_field(
    field: DatetimeField,
    raw: u8,
    time_representation: TimeRepresentation,
) -> (u8, Option<HourMode>) {
    match field {
        DatetimeField::Second => (bcd_to_decimal(Seconds::from(raw).bcd()), None),
        DatetimeField::Minute => (bcd_to_decimal(raw & 0x7F), None),
        DatetimeField::Hour => {
            let (hour, mode) = decode_hour(raw, time_representation);
            (hour, Some(mode))
        }
        DatetimeField::Day => (bcd_to_decimal(raw & 0x3F), None),
        DatetimeField::Weekday => (raw & 0x07, None),
        DatetimeField::Month => (bcd_to_decimal(raw & 0x1F), None),
        DatetimeField::Year => (bcd_to_decimal(raw), None),
    }
}

/// Validates and encodes one time register.
///
/// # Errors
/// [`ValidationError::HourModeRequired`] for an hour without a mode, otherwise
/// whatever the field's range check reports.
pub(crate) fn encode_datetime_field(
    field: DatetimeField,
    value: u8,
    hour_mode: Option<HourMode>,
    time_representation: TimeRepresentation,
) -> Result<u8, ValidationError> {
    match field {
        DatetimeField::Second => validate_second(value).map(|()| decimal_to_bcd(value)),
        DatetimeField::Minute => validate_minute(value).map(|()| decimal_to_bcd(value)),
        DatetimeField::Hour => {
            let mode = hour_mode.ok_or(ValidationError::HourModeRequired)?;
            validate_hour(value, mode, time_representation)?;
            Ok(encode_hour(value, mode))
        }
        DatetimeField::Day => validate_day(value).map(|()| decimal_to_bcd(value)),
        DatetimeField::Weekday => validate_weekday(value).map(|()| value),
        DatetimeField::Month => validate_month(value).map(|()| decimal_to_bcd(value)),
        DatetimeField::Year => validate_year(value).map(|()| decimal_to_bcd(value)),
    }
}

/// A calendar time as the PCF8523 stores it.
///
/// Construction does not validate; the record is checked against the device's
/// hour representation when it is written. The weekday is not cross-checked
/// against the date, and the century lives outside the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Datetime {
    /// 0-59
    pub second: u8,
    /// 0-59
    pub minute: u8,
    /// 0-23 in 24-hour mode, 1-12 otherwise
    pub hour: u8,
    pub hour_mode: HourMode,
    /// Day of month, 1-31
    pub day: u8,
    /// 0-6, 0 being whatever day the application chooses (Sunday for chrono)
    pub weekday: u8,
    /// 1-12
    pub month: u8,
    /// Year within the century, 0-99
    pub year: u8,
}

impl Datetime {
    /// Checks every field.
    ///
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self, time_representation: TimeRepresentation) -> Result<(), ValidationError> {
        validate_second(self.second)?;
        validate_minute(self.minute)?;
        validate_hour(self.hour, self.hour_mode, time_representation)?;
        validate_day(self.day)?;
        validate_weekday(self.weekday)?;
        validate_month(self.month)?;
        validate_year(self.year)
    }

    /// Decodes the 7-byte register block starting at the seconds register.
    pub(crate) fn from_registers(data: &[u8; 7], time_representation: TimeRepresentation) -> Self {
        let (hour, hour_mode) = decode_hour(data[2], time_representation);
        Self {
            second: bcd_to_decimal(Seconds::from(data[0]).bcd()),
            minute: bcd_to_decimal(data[1] & 0x7F),
            hour,
            hour_mode,
            day: bcd_to_decimal(data[3] & 0x3F),
            weekday: data[4] & 0x07,
            month: bcd_to_decimal(data[5] & 0x1F),
            year: bcd_to_decimal(data[6]),
        }
    }

    /// Validates and encodes the record as the 7-byte register block.
    ///
    /// The seconds byte is written with the clock-integrity flag clear.
    pub(crate) fn to_registers(
        &self,
        time_representation: TimeRepresentation,
    ) -> Result<[u8; 7], ValidationError> {
        self.validate(time_representation)?;
        Ok([
            decimal_to_bcd(self.second),
            decimal_to_bcd(self.minute),
            encode_hour(self.hour, self.hour_mode),
            decimal_to_bcd(self.day),
            self.weekday,
            decimal_to_bcd(self.month),
            decimal_to_bcd(self.year),
        ])
    }

    /// The hour on a 0-23 clock, whatever the stored mode.
    #[must_use]
    pub fn hour_24(&self) -> u8 {
        match self.hour_mode {
            HourMode::TwentyFourHour => self.hour,
            HourMode::Am => self.hour % 12,
            HourMode::Pm => self.hour % 12 + 12,
        }
    }

    /// Converts to a chrono `NaiveDateTime`. `century` is the first year of
    /// the century the 2-digit year belongs to, for example 2000.
    ///
    /// Returns `None` if the fields do not form a real calendar time.
    #[must_use]
    pub fn to_naive_datetime(&self, century: i32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            century + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )?
        .and_hms_opt(
            u32::from(self.hour_24()),
            u32::from(self.minute),
            u32::from(self.second),
        )
    }

    /// Seconds since the Unix epoch, treating the record as UTC.
    #[must_use]
    pub fn timestamp(&self, century: i32) -> Option<i64> {
        self.to_naive_datetime(century)
            .map(|datetime| datetime.and_utc().timestamp())
    }

    /// Builds a record from a chrono `NaiveDateTime`.
    ///
    /// The hour is expressed in `time_representation`, the weekday counts from
    /// Sunday and the century is dropped.
    #[must_use]
    pub fn from_naive_datetime(
        datetime: &NaiveDateTime,
        time_representation: TimeRepresentation,
    ) -> Self {
        let hour = datetime.hour() as u8;
        let (hour, hour_mode) = match time_representation {
            TimeRepresentation::TwentyFourHour => (hour, HourMode::TwentyFourHour),
            TimeRepresentation::TwelveHour => match hour {
                0 => (12, HourMode::Am),
                1..=11 => (hour, HourMode::Am),
                12 => (12, HourMode::Pm),
                _ => (hour - 12, HourMode::Pm),
            },
        };
        Self {
            second: datetime.second() as u8,
            minute: datetime.minute() as u8,
            hour,
            hour_mode,
            day: datetime.day() as u8,
            weekday: datetime.weekday().num_days_from_sunday() as u8,
            month: datetime.month() as u8,
            year: datetime.year().rem_euclid(100) as u8,
        }
    }
}
