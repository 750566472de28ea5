//! Alarm record and the codec for the PCF8523 alarm registers.
//!
//! The alarm occupies 4 registers starting at 0x0A: minute, hour, day of
//! month and weekday. Each register has its own disable flag in bit 7; a
//! disabled field is ignored when the device matches the alarm, so any subset
//! of fields can take part. The weekday alarm is a plain value, the others
//! are BCD, and the hour follows the same 12/24-hour rules as the time.

use crate::bcd::{bcd_to_decimal, decimal_to_bcd};
use crate::datetime::{decode_hour, encode_hour, HourMode};
use crate::registers::{AlarmHours, AlarmRegister, RegAddr, TimeRepresentation, ALARM_DISABLE_MASK};
use crate::validation::{
    validate_day, validate_hour, validate_minute, validate_weekday, ValidationError,
};

/// A single alarm register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmField {
    Minute,
    Hour,
    Day,
    Weekday,
}

impl AlarmField {
    /// Register holding this field.
    #[must_use]
    pub const fn register(self) -> RegAddr {
        match self {
            AlarmField::Minute => RegAddr::MinuteAlarm,
            AlarmField::Hour => RegAddr::HourAlarm,
            AlarmField::Day => RegAddr::DayAlarm,
            AlarmField::Weekday => RegAddr::WeekdayAlarm,
        }
    }
}

/// Value of one alarm register as read back from the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmFieldValue {
    pub value: u8,
    pub enabled: bool,
    /// Only present for [`AlarmField::Hour`]
    pub hour_mode: Option<HourMode>,
}

pub(crate) fn decode_alarm_field(
    field: AlarmField,
    raw: u8,
    time_representation: TimeRepresentation,
) -> AlarmFieldValue {
    match field {
        AlarmField::Hour => {
            let register = AlarmHours::from(raw);
            let (value, mode) = decode_hour(register.hour(), time_representation);
            AlarmFieldValue {
                value,
                enabled: !register.disabled(),
                hour_mode: Some(mode),
            }
        }
        AlarmField::Minute | AlarmField::Day | AlarmField::Weekday => {
            let register = AlarmRegister::from(raw);
            let value = if field == AlarmField::Weekday {
                register.value()
            } else {
                bcd_to_decimal(register.value())
            };
            AlarmFieldValue {
                value,
                enabled: !register.disabled(),
                hour_mode: None,
            }
        }
    }
}

/// Validates and encodes one alarm register, disable flag included.
///
/// # Errors
/// [`ValidationError::HourModeRequired`] for an hour without a mode, otherwise
/// whatever the field's range check reports. Disabled fields are validated too.
pub(crate) fn encode_alarm_field(
    field: AlarmField,
    value: u8,
    enabled: bool,
    hour_mode: Option<HourMode>,
    time_representation: TimeRepresentation,
) -> Result<u8, ValidationError> {
    let encoded = match field {
        AlarmField::Minute => {
            validate_minute(value)?;
            decimal_to_bcd(value)
        }
        AlarmField::Hour => {
            let mode = hour_mode.ok_or(ValidationError::HourModeRequired)?;
            validate_hour(value, mode, time_representation)?;
            encode_hour(value, mode)
        }
        AlarmField::Day => {
            validate_day(value)?;
            decimal_to_bcd(value)
        }
        AlarmField::Weekday => {
            validate_weekday(value)?;
            value
        }
    };
    Ok(if enabled {
        encoded
    } else {
        encoded | ALARM_DISABLE_MASK
    })
}

/// Alarm configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alarm {
    /// 0-59
    pub minute: u8,
    pub minute_enabled: bool,
    /// 0-23 in 24-hour mode, 1-12 otherwise
    pub hour: u8,
    pub hour_mode: HourMode,
    pub hour_enabled: bool,
    /// Day of month, 1-31
    pub day: u8,
    pub day_enabled: bool,
    /// 0-6
    pub weekday: u8,
    pub weekday_enabled: bool,
}

impl Alarm {
    /// Checks every field, enabled or not.
    ///
    /// # Errors
    /// Returns the first failing field check.
    pub fn validate(&self, time_representation: TimeRepresentation) -> Result<(), ValidationError> {
        validate_minute(self.minute)?;
        validate_hour(self.hour, self.hour_mode, time_representation)?;
        validate_day(self.day)?;
        validate_weekday(self.weekday)
    }

    /// Decodes the 4-byte register block starting at the minute alarm.
    pub(crate) fn from_registers(data: &[u8; 4], time_representation: TimeRepresentation) -> Self {
        let minute = decode_alarm_field(AlarmField::Minute, data[0], time_representation);
        let hour = decode_alarm_field(AlarmField::Hour, data[1], time_representation);
        let day = decode_alarm_field(AlarmField::Day, data[2], time_representation);
        let weekday = decode_alarm_field(AlarmField::Weekday, data[3], time_representation);
        Self {
            minute: minute.value,
            minute_enabled: minute.enabled,
            hour: hour.value,
            hour_mode: hour.hour_mode.unwrap_or_default(),
            hour_enabled: hour.enabled,
            day: day.value,
            day_enabled: day.enabled,
            weekday: weekday.value,
            weekday_enabled: weekday.enabled,
        }
    }

    /// Validates and encodes the record as the 4-byte register block.
    pub(crate) fn to_registers(
        &self,
        time_representation: TimeRepresentation,
    ) -> Result<[u8; 4], ValidationError> {
        self.validate(time_representation)?;
        Ok([
            encode_alarm_field(
                AlarmField::Minute,
                self.minute,
                self.minute_enabled,
                None,
                time_representation,
            )?,
            encode_alarm_field(
                AlarmField::Hour,
                self.hour,
                self.hour_enabled,
                Some(self.hour_mode),
                time_representation,
            )?,
            encode_alarm_field(
                AlarmField::Day,
                self.day,
                self.day_enabled,
                None,
                time_representation,
            )?,
            encode_alarm_field(
                AlarmField::Weekday,
                self.weekday,
                self.weekday_enabled,
                None,
                time_representation,
            )?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    fn daily_at(hour: u8, minute: u8) -> Alarm {
        Alarm {
            minute,
            minute_enabled: true,
            hour,
            hour_mode: HourMode::TwentyFourHour,
            hour_enabled: true,
            day: 1,
            day_enabled: false,
            weekday: 0,
            weekday_enabled: false,
        }
    }

    #[test]
    fn test_alarm_to_registers() {
        let data = daily_at(7, 30)
            .to_registers(TimeRepresentation::TwentyFourHour)
            .unwrap();
        assert_eq!(data, [0x30, 0x07, 0x81, 0x80]);
    }

    #[test]
    fn test_alarm_from_registers() {
        let alarm = Alarm::from_registers(
            &[0x30, 0x07, 0x81, 0x80],
            TimeRepresentation::TwentyFourHour,
        );
        assert_eq!(alarm, daily_at(7, 30));
    }

    #[test]
    fn test_disabled_minute_keeps_value() {
        let mut alarm = daily_at(7, 45);
        alarm.minute_enabled = false;
        let data = alarm
            .to_registers(TimeRepresentation::TwentyFourHour)
            .unwrap();
        assert_eq!(data[0], 0xC5);

        let decoded = Alarm::from_registers(&data, TimeRepresentation::TwentyFourHour);
        assert!(!decoded.minute_enabled);
        assert_eq!(decoded.minute, 45);
    }

    #[test]
    fn test_twelve_hour_alarm() {
        let alarm = Alarm {
            hour: 12,
            hour_mode: HourMode::Pm,
            ..daily_at(0, 0)
        };
        let data = alarm.to_registers(TimeRepresentation::TwelveHour).unwrap();
        assert_eq!(data[1], 0x32);

        let disabled = decode_alarm_field(AlarmField::Hour, 0xB2, TimeRepresentation::TwelveHour);
        assert_eq!(
            disabled,
            AlarmFieldValue {
                value: 12,
                enabled: false,
                hour_mode: Some(HourMode::Pm),
            }
        );
    }

    #[test]
    fn test_disabled_fields_are_still_validated() {
        let mut alarm = daily_at(7, 30);
        alarm.day = 0;
        assert_eq!(
            alarm.to_registers(TimeRepresentation::TwentyFourHour),
            Err(ValidationError::OutOfRange(Field::Day))
        );

        let mut alarm = daily_at(7, 30);
        alarm.weekday = 7;
        assert_eq!(
            alarm.to_registers(TimeRepresentation::TwentyFourHour),
            Err(ValidationError::OutOfRange(Field::Weekday))
        );
    }

    #[test]
    fn test_encode_alarm_field() {
        assert_eq!(
            encode_alarm_field(
                AlarmField::Weekday,
                5,
                false,
                None,
                TimeRepresentation::TwentyFourHour
            ),
            Ok(0x85)
        );
        assert_eq!(
            encode_alarm_field(
                AlarmField::Hour,
                9,
                true,
                None,
                TimeRepresentation::TwentyFourHour
            ),
            Err(ValidationError::HourModeRequired)
        );
        assert_eq!(
            encode_alarm_field(
                AlarmField::Hour,
                9,
                true,
                Some(HourMode::TwentyFourHour),
                TimeRepresentation::TwelveHour
            ),
            Err(ValidationError::ModeMismatch)
        );
    }

    #[test]
    fn test_weekday_alarm_is_not_bcd() {
        let value =
            decode_alarm_field(AlarmField::Weekday, 0x06, TimeRepresentation::TwentyFourHour);
        assert_eq!(value.value, 6);
        assert!(value.enabled);
        assert_eq!(value.hour_mode, None);
    }
}
