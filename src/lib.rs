//! Platform-agnostic driver for the NXP PCF8523 real-time clock.
//!
//! The driver talks to the device through the `embedded-hal` 1.0 [`I2c`]
//! trait. An async variant over `embedded-hal-async` lives in [`asynch`]
//! behind the `async` feature.
//!
//! # Features
//!
//! - Date and time read/write as a whole record or one field at a time
//! - 24-hour and 12-hour (AM/PM) operation
//! - Alarm with per-field enables
//! - Power management, oscillator capacitor, stop bit and aging offset
//! - Interrupt enables and flags, with flag-preserving register updates
//! - Timer A (countdown or watchdog), timer B and the CLKOUT pin
//! - Optional logging through `log` or `defmt`
//!
//! # Example
//!
//! ```rust,ignore
//! use pcf8523::{Config, PCF8523, TimeRepresentation, DEFAULT_ADDRESS};
//!
//! let mut rtc = PCF8523::new(i2c, DEFAULT_ADDRESS, TimeRepresentation::TwentyFourHour);
//! rtc.configure(&Config::default())?;
//! if rtc.clock_integrity_lost()? {
//!     rtc.set_datetime(&datetime)?;
//! }
//! let now = rtc.datetime()?;
//! ```
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod alarm;
pub mod bcd;
pub mod datetime;
pub mod registers;
pub mod timer;
pub mod validation;

cfg_if::cfg_if! {
    if #[cfg(feature = "async")] {
        pub mod asynch;
    }
}

use embedded_hal::i2c::I2c;
use paste::paste;

pub use crate::alarm::{Alarm, AlarmField, AlarmFieldValue};
pub use crate::datetime::{Datetime, DatetimeField, HourMode};
pub use crate::registers::{
    ClockOutFrequency, Control1, Control2, Control3, InterruptFlag, InterruptSource, Offset,
    OffsetMode, OscillatorCapacitor, PowerMode, RegAddr, TimeRepresentation, TimerAFrequencyControl,
    TimerAMode, TimerBFrequencyControl, TimerBPulseWidth, TimerControl, TimerInterruptMode,
    TimerSourceFrequency,
};
pub use crate::timer::{Timer, TimerAValue, TimerBValue};
pub use crate::validation::{Field, ValidationError};

use crate::alarm::{decode_alarm_field, encode_alarm_field};
use crate::datetime::{decode_datetime_field, encode_datetime_field};
use crate::registers::{
    merge_bits, CONTROL1_12_24_MASK, CONTROL1_CAP_SEL_MASK, CONTROL1_STOP_MASK,
    CONTROL3_POWER_MODE_MASK, RESET_COMMAND, SECONDS_OS_MASK, TIMER_CONTROL_CLOCK_OUT_MASK,
    TIMER_CONTROL_TIMER_A_MODE_MASK, TIMER_CONTROL_TIMER_B_ENABLE_MASK,
};
use crate::validation::validate_offset;

/// Fixed I2C address of the PCF8523.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Longest register block the driver transfers in one write.
const MAX_BLOCK_LEN: usize = 7;

/// Device settings applied by [`PCF8523::configure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub time_representation: TimeRepresentation,
    pub power_mode: PowerMode,
    pub capacitor: OscillatorCapacitor,
    pub clock_out: ClockOutFrequency,
}

impl Default for Config {
    /// 24-hour mode, standard battery switch-over with low-battery detection,
    /// 7 pF load and CLKOUT disabled.
    fn default() -> Self {
        Self {
            time_representation: TimeRepresentation::TwentyFourHour,
            power_mode: PowerMode::SwitchOverStandardLowDetectEnabled,
            capacitor: OscillatorCapacitor::Pf7,
            clock_out: ClockOutFrequency::Disabled,
        }
    }
}

/// Driver error.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PCF8523Error<I2CE> {
    /// The bus transfer failed
    I2c(I2CE),
    /// The input was rejected before anything was sent
    Validation(ValidationError),
    /// The oscillator has stopped since the flag was last cleared, so the
    /// time cannot be trusted
    ClockIntegrityLost,
    /// The flag cannot be cleared by the host
    ReadOnlyFlag,
    /// The device returned a code with no defined meaning
    InvalidRegisterValue(u8),
}

impl<I2CE> From<I2CE> for PCF8523Error<I2CE> {
    fn from(e: I2CE) -> Self {
        PCF8523Error::I2c(e)
    }
}

impl<I2CE> PCF8523Error<I2CE> {
    pub(crate) fn validation(error: ValidationError) -> Self {
        if error == ValidationError::ModeMismatch {
            warn!("PCF8523: 24-hour value refused, device is in 12-hour mode");
        }
        PCF8523Error::Validation(error)
    }
}

/// Fails if the seconds byte carries the oscillator-stop flag.
pub(crate) fn check_clock_integrity<I2CE>(seconds: u8) -> Result<(), PCF8523Error<I2CE>> {
    if seconds & SECONDS_OS_MASK != 0 {
        warn!("PCF8523: oscillator stop flag set, refusing to return time");
        return Err(PCF8523Error::ClockIntegrityLost);
    }
    Ok(())
}

/// PCF8523 Real-Time Clock driver.
///
/// The driver caches the device's 12/24-hour setting, which every hour read
/// and write depends on. The cache changes only when a write of that bit
/// succeeds, or on an explicit [`PCF8523::sync_time_representation`].
pub struct PCF8523<I2C: I2c> {
    i2c: I2C,
    address: u8,
    time_representation: TimeRepresentation,
}

impl<I2C: I2c> PCF8523<I2C> {
    /// Creates a driver without touching the bus.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (normally [`DEFAULT_ADDRESS`])
    /// * `time_representation` - The 12/24-hour mode the device is assumed to be in
    pub fn new(i2c: I2C, address: u8, time_representation: TimeRepresentation) -> Self {
        Self {
            i2c,
            address,
            time_representation,
        }
    }

    /// Creates a driver and reads the device's current 12/24-hour mode.
    ///
    /// # Errors
    /// Returns the bus error if control register 1 cannot be read.
    pub fn from_device(i2c: I2C, address: u8) -> Result<Self, PCF8523Error<I2C::Error>> {
        let mut dev = Self::new(i2c, address, TimeRepresentation::TwentyFourHour);
        dev.sync_time_representation()?;
        Ok(dev)
    }

    /// Gives the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Cached 12/24-hour mode.
    pub fn time_representation(&self) -> TimeRepresentation {
        self.time_representation
    }

    pub fn is_twelve_hour(&self) -> bool {
        self.time_representation == TimeRepresentation::TwelveHour
    }

    /// Re-reads the 12/24-hour bit into the cache, for when something else may
    /// have changed it.
    pub fn sync_time_representation(&mut self) -> Result<TimeRepresentation, PCF8523Error<I2C::Error>> {
        self.time_representation = self.read_hour_mode()?;
        Ok(self.time_representation)
    }

    /// Configures the device according to the provided configuration.
    ///
    /// Control register 1 is written first and the cached hour mode follows
    /// it, so a failure later on leaves the cache matching the device.
    ///
    /// # Arguments
    /// * `config` - The configuration to apply
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(PCF8523Error)` on error
    pub fn configure(&mut self, config: &Config) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut control = self.control_1()?;
        control.set_capacitor(config.capacitor);
        control.set_time_representation(config.time_representation);
        debug!("PCF8523: writing control 1: {:#x}", u8::from(control));
        self.set_control_1(control)?;
        self.time_representation = config.time_representation;
        self.set_power_mode(config.power_mode)?;
        self.set_clock_out(config.clock_out)
    }

    /// Writes 0x58 to control register 1, resetting every register to its
    /// power-on value. The device comes back in 24-hour mode.
    pub fn soft_reset(&mut self) -> Result<(), PCF8523Error<I2C::Error>> {
        self.write_register(RegAddr::Control1, RESET_COMMAND)?;
        self.time_representation = TimeRepresentation::TwentyFourHour;
        Ok(())
    }

    /// Writes one register.
    pub fn write_register(&mut self, reg: RegAddr, value: u8) -> Result<(), PCF8523Error<I2C::Error>> {
        debug!("PCF8523: write {:#x} <- {:#x}", reg as u8, value);
        self.i2c.write(self.address, &[reg as u8, value])?;
        Ok(())
    }

    /// Reads one register.
    pub fn read_register(&mut self, reg: RegAddr) -> Result<u8, PCF8523Error<I2C::Error>> {
        let mut data = [0];
        self.i2c.write_read(self.address, &[reg as u8], &mut data)?;
        trace!("PCF8523: read {:#x} -> {:#x}", reg as u8, data[0]);
        Ok(data[0])
    }

    /// Writes consecutive registers in one transfer, relying on the device's
    /// address auto-increment.
    pub(crate) fn write_block(&mut self, start: RegAddr, data: &[u8]) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut buffer = [0u8; MAX_BLOCK_LEN + 1];
        buffer[0] = start as u8;
        buffer[1..=data.len()].copy_from_slice(data);
        debug!("PCF8523: write block at {:#x}, {} bytes", start as u8, data.len());
        self.i2c.write(self.address, &buffer[..=data.len()])?;
        Ok(())
    }

    /// Reads consecutive registers in one transfer.
    pub(crate) fn read_block(&mut self, start: RegAddr, data: &mut [u8]) -> Result<(), PCF8523Error<I2C::Error>> {
        self.i2c.write_read(self.address, &[start as u8], data)?;
        debug!("PCF8523: read block at {:#x}, {} bytes", start as u8, data.len());
        Ok(())
    }

    /// Read-modify-write of the bits selected by `mask`, keeping pending
    /// interrupt flags of the register intact.
    fn update_register(&mut self, reg: RegAddr, mask: u8, bits: u8) -> Result<(), PCF8523Error<I2C::Error>> {
        let current = self.read_register(reg)?;
        self.write_register(reg, merge_bits(reg, current, mask, bits))
    }

    /// Sets or clears the bits in `mask`.
    ///
    /// Interrupt flags in control registers 2 and 3 outside `mask` are written
    /// back as 1, which leaves them untouched on the device.
    pub fn set_bit(&mut self, reg: RegAddr, mask: u8, value: bool) -> Result<(), PCF8523Error<I2C::Error>> {
        self.update_register(reg, mask, if value { mask } else { 0 })
    }

    /// Returns true if any bit in `mask` is set.
    pub fn read_bit(&mut self, reg: RegAddr, mask: u8) -> Result<bool, PCF8523Error<I2C::Error>> {
        Ok(self.read_register(reg)? & mask != 0)
    }

    /// Reads the date and time.
    ///
    /// # Errors
    /// [`PCF8523Error::ClockIntegrityLost`] if the oscillator-stop flag is set.
    pub fn datetime(&mut self) -> Result<Datetime, PCF8523Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_block(RegAddr::Seconds, &mut data)?;
        check_clock_integrity(data[0])?;
        Ok(Datetime::from_registers(&data, self.time_representation))
    }

    /// Validates the record, then writes all 7 time registers in one transfer.
    /// This also clears the oscillator-stop flag.
    pub fn set_datetime(&mut self, datetime: &Datetime) -> Result<(), PCF8523Error<I2C::Error>> {
        let data = datetime
            .to_registers(self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_block(RegAddr::Seconds, &data)
    }

    /// Reads a single time field. The hour mode is returned for the hour only.
    ///
    /// # Errors
    /// [`PCF8523Error::ClockIntegrityLost`] when reading seconds with the
    /// oscillator-stop flag set.
    pub fn datetime_field(
        &mut self,
        field: DatetimeField,
    ) -> Result<(u8, Option<HourMode>), PCF8523Error<I2C::Error>> {
        let raw = self.read_register(field.register())?;
        if field == DatetimeField::Second {
            check_clock_integrity(raw)?;
        }
        Ok(decode_datetime_field(field, raw, self.time_representation))
    }

    /// Validates and writes a single time field.
    ///
    /// # Arguments
    /// * `field` - The register to write
    /// * `value` - Decimal value
    /// * `hour_mode` - Required for [`DatetimeField::Hour`], ignored otherwise
    pub fn set_datetime_field(
        &mut self,
        field: DatetimeField,
        value: u8,
        hour_mode: Option<HourMode>,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let raw = encode_datetime_field(field, value, hour_mode, self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_register(field.register(), raw)
    }

    /// Reads the alarm registers.
    pub fn alarm(&mut self) -> Result<Alarm, PCF8523Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_block(RegAddr::MinuteAlarm, &mut data)?;
        Ok(Alarm::from_registers(&data, self.time_representation))
    }

    /// Validates every field, disabled ones included, then writes all 4 alarm
    /// registers in one transfer.
    pub fn set_alarm(&mut self, alarm: &Alarm) -> Result<(), PCF8523Error<I2C::Error>> {
        let data = alarm
            .to_registers(self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_block(RegAddr::MinuteAlarm, &data)
    }

    pub fn alarm_field(&mut self, field: AlarmField) -> Result<AlarmFieldValue, PCF8523Error<I2C::Error>> {
        let raw = self.read_register(field.register())?;
        Ok(decode_alarm_field(field, raw, self.time_representation))
    }

    /// Validates and writes a single alarm field with its enable flag.
    pub fn set_alarm_field(
        &mut self,
        field: AlarmField,
        value: u8,
        enabled: bool,
        hour_mode: Option<HourMode>,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let raw = encode_alarm_field(field, value, enabled, hour_mode, self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_register(field.register(), raw)
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut bits = Control3::default();
        bits.set_power_mode(mode);
        self.update_register(RegAddr::Control3, CONTROL3_POWER_MODE_MASK, bits.into())
    }

    /// # Errors
    /// [`PCF8523Error::InvalidRegisterValue`] with the raw 3-bit code if the
    /// device holds the undefined code `0b110`.
    pub fn power_mode(&mut self) -> Result<PowerMode, PCF8523Error<I2C::Error>> {
        self.control_3()?
            .power_mode()
            .map_err(PCF8523Error::InvalidRegisterValue)
    }

    /// Switches between 12-hour and 24-hour mode. The cached mode is updated
    /// only if the write succeeds.
    ///
    /// Time and alarm registers are not converted; rewrite them afterwards.
    pub fn set_hour_mode(&mut self, time_representation: TimeRepresentation) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(
            RegAddr::Control1,
            CONTROL1_12_24_MASK,
            time_representation == TimeRepresentation::TwelveHour,
        )?;
        self.time_representation = time_representation;
        Ok(())
    }

    /// Reads the 12/24-hour bit from the device without updating the cache.
    pub fn read_hour_mode(&mut self) -> Result<TimeRepresentation, PCF8523Error<I2C::Error>> {
        Ok(self.control_1()?.time_representation())
    }

    pub fn set_capacitor(&mut self, capacitor: OscillatorCapacitor) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(
            RegAddr::Control1,
            CONTROL1_CAP_SEL_MASK,
            capacitor == OscillatorCapacitor::Pf12_5,
        )
    }

    pub fn capacitor(&mut self) -> Result<OscillatorCapacitor, PCF8523Error<I2C::Error>> {
        Ok(self.control_1()?.capacitor())
    }

    /// Returns true if the oscillator has stopped since the flag was cleared.
    pub fn clock_integrity_lost(&mut self) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(RegAddr::Seconds, SECONDS_OS_MASK)
    }

    /// Clears the oscillator-stop flag without rewriting the time.
    pub fn clear_clock_integrity_flag(&mut self) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(RegAddr::Seconds, SECONDS_OS_MASK, false)
    }

    pub fn enable_interrupt_source(
        &mut self,
        source: InterruptSource,
        enable: bool,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(source.register(), source.mask(), enable)
    }

    pub fn is_interrupt_source_enabled(&mut self, source: InterruptSource) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(source.register(), source.mask())
    }

    pub fn interrupt_flag(&mut self, flag: InterruptFlag) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(flag.register(), flag.mask())
    }

    /// Clears one interrupt flag, leaving the other flags pending.
    ///
    /// # Errors
    /// [`PCF8523Error::ReadOnlyFlag`] for [`InterruptFlag::BatteryLow`] and
    /// [`InterruptFlag::WatchdogTimerA`], without any bus access.
    pub fn clear_interrupt_flag(&mut self, flag: InterruptFlag) -> Result<(), PCF8523Error<I2C::Error>> {
        if flag.is_read_only() {
            warn!("PCF8523: flag {:#x} is read-only", flag.mask());
            return Err(PCF8523Error::ReadOnlyFlag);
        }
        self.set_bit(flag.register(), flag.mask(), false)
    }

    /// Stops (`true`) or restarts (`false`) the time circuits.
    pub fn freeze_time(&mut self, freeze: bool) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(RegAddr::Control1, CONTROL1_STOP_MASK, freeze)
    }

    pub fn is_time_frozen(&mut self) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(RegAddr::Control1, CONTROL1_STOP_MASK)
    }

    /// Sets the aging offset in correction steps (-64 to +63).
    pub fn set_offset(&mut self, mode: OffsetMode, offset: i8) -> Result<(), PCF8523Error<I2C::Error>> {
        validate_offset(offset).map_err(PCF8523Error::validation)?;
        let mut value = Offset::default();
        value.set_mode(mode);
        value.set_offset(offset);
        self.set_offset_register(value)
    }

    pub fn offset(&mut self) -> Result<(OffsetMode, i8), PCF8523Error<I2C::Error>> {
        let value = self.offset_register()?;
        Ok((value.mode(), value.offset()))
    }

    pub fn set_timer_a_mode(&mut self, mode: TimerAMode) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut bits = TimerControl::default();
        bits.set_timer_a_mode(mode);
        self.update_register(RegAddr::TimerControl, TIMER_CONTROL_TIMER_A_MODE_MASK, bits.into())
    }

    pub fn timer_a_mode(&mut self) -> Result<TimerAMode, PCF8523Error<I2C::Error>> {
        Ok(self.timer_control()?.timer_a_mode())
    }

    pub fn set_timer_b_enabled(&mut self, enabled: bool) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(RegAddr::TimerControl, TIMER_CONTROL_TIMER_B_ENABLE_MASK, enabled)
    }

    pub fn timer_b_enabled(&mut self) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(RegAddr::TimerControl, TIMER_CONTROL_TIMER_B_ENABLE_MASK)
    }

    pub fn set_timer_interrupt_mode(
        &mut self,
        timer: Timer,
        mode: TimerInterruptMode,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(
            RegAddr::TimerControl,
            timer.interrupt_mode_mask(),
            mode == TimerInterruptMode::Pulsed,
        )
    }

    pub fn timer_interrupt_mode(&mut self, timer: Timer) -> Result<TimerInterruptMode, PCF8523Error<I2C::Error>> {
        let pulsed = self.read_bit(RegAddr::TimerControl, timer.interrupt_mode_mask())?;
        Ok(TimerInterruptMode::from(u8::from(pulsed)))
    }

    /// Writes the timer A source clock and count in one transfer.
    pub fn set_timer_a_duration(&mut self, timer: &TimerAValue) -> Result<(), PCF8523Error<I2C::Error>> {
        self.write_block(RegAddr::TimerAFrequencyControl, &timer.to_registers())
    }

    pub fn timer_a_duration(&mut self) -> Result<TimerAValue, PCF8523Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_block(RegAddr::TimerAFrequencyControl, &mut data)?;
        Ok(TimerAValue::from_registers(&data))
    }

    /// Writes the timer B source clock, pulse width and count in one transfer.
    pub fn set_timer_b_duration(&mut self, timer: &TimerBValue) -> Result<(), PCF8523Error<I2C::Error>> {
        self.write_block(RegAddr::TimerBFrequencyControl, &timer.to_registers())
    }

    pub fn timer_b_duration(&mut self) -> Result<TimerBValue, PCF8523Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_block(RegAddr::TimerBFrequencyControl, &mut data)?;
        Ok(TimerBValue::from_registers(&data))
    }

    /// Selects the CLKOUT frequency, leaving the timer bits of the register
    /// as they are.
    pub fn set_clock_out(&mut self, frequency: ClockOutFrequency) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut bits = TimerControl::default();
        bits.set_clock_out(frequency);
        self.update_register(RegAddr::TimerControl, TIMER_CONTROL_CLOCK_OUT_MASK, bits.into())
    }

    pub fn clock_out(&mut self) -> Result<ClockOutFrequency, PCF8523Error<I2C::Error>> {
        Ok(self.timer_control()?.clock_out())
    }
}

// Raw register access. Setters write the byte as given, so writing control 2
// or 3 this way can clear pending flags.
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> PCF8523<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<$typ, PCF8523Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr)?))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), PCF8523Error<I2C::Error>> {
                        self.write_register($regaddr, value.into())
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (control_1, RegAddr::Control1, Control1),
    (control_2, RegAddr::Control2, Control2),
    (control_3, RegAddr::Control3, Control3),
    (offset_register, RegAddr::Offset, Offset),
    (timer_control, RegAddr::TimerControl, TimerControl),
    (timer_a_frequency_control, RegAddr::TimerAFrequencyControl, TimerAFrequencyControl),
    (timer_b_frequency_control, RegAddr::TimerBFrequencyControl, TimerBFrequencyControl)
);
