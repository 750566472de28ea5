//! Async implementation of the PCF8523 driver.
//!
//! This module provides an async interface to the PCF8523 RTC device using
//! `embedded-hal-async` traits. It is only available when the `async` feature
//! is enabled. Every operation matches its blocking counterpart in
//! [`crate::PCF8523`] and goes through the same codecs.
//!
//! # Example
//!
//! ```rust,ignore
//! use pcf8523::asynch::PCF8523;
//! use pcf8523::DEFAULT_ADDRESS;
//!
//! // Initialize device, reading the 12/24-hour mode it is in
//! let mut rtc = PCF8523::from_device(i2c, DEFAULT_ADDRESS).await?;
//!
//! // Configure asynchronously
//! rtc.configure(&config).await?;
//!
//! // Get current date/time asynchronously
//! let datetime = rtc.datetime().await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::alarm::{decode_alarm_field, encode_alarm_field};
use crate::datetime::{decode_datetime_field, encode_datetime_field};
use crate::registers::{
    merge_bits, CONTROL1_12_24_MASK, CONTROL1_CAP_SEL_MASK, CONTROL1_STOP_MASK,
    CONTROL3_POWER_MODE_MASK, RESET_COMMAND, SECONDS_OS_MASK, TIMER_CONTROL_CLOCK_OUT_MASK,
    TIMER_CONTROL_TIMER_A_MODE_MASK, TIMER_CONTROL_TIMER_B_ENABLE_MASK,
};
use crate::validation::validate_offset;
use crate::{
    check_clock_integrity, Alarm, AlarmField, AlarmFieldValue, ClockOutFrequency, Config,
    Control1, Control2, Control3, Datetime, DatetimeField, HourMode, InterruptFlag,
    InterruptSource, Offset, OffsetMode, OscillatorCapacitor, PCF8523Error, PowerMode, RegAddr,
    TimeRepresentation, Timer, TimerAFrequencyControl, TimerAMode, TimerAValue,
    TimerBFrequencyControl, TimerBValue, TimerControl, TimerInterruptMode,
};

/// Longest register block the driver transfers in one write.
const MAX_BLOCK_LEN: usize = 7;

/// PCF8523 Real-Time Clock async driver.
///
/// This struct provides the async interface to the PCF8523 RTC device.
/// It supports async I2C operations through the `embedded-hal-async` traits.
pub struct PCF8523<I2C: I2c> {
    i2c: I2C,
    address: u8,
    time_representation: TimeRepresentation,
}

impl<I2C: I2c> PCF8523<I2C> {
    /// Creates a new PCF8523 async driver instance without touching the bus.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (typically 0x68)
    /// * `time_representation` - The 12/24-hour mode the device is assumed to be in
    pub fn new(i2c: I2C, address: u8, time_representation: TimeRepresentation) -> Self {
        Self {
            i2c,
            address,
            time_representation,
        }
    }

    /// Creates a driver and reads the device's current 12/24-hour mode.
    pub async fn from_device(i2c: I2C, address: u8) -> Result<Self, PCF8523Error<I2C::Error>> {
        let mut dev = Self::new(i2c, address, TimeRepresentation::TwentyFourHour);
        dev.sync_time_representation().await?;
        Ok(dev)
    }

    /// Gives the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn time_representation(&self) -> TimeRepresentation {
        self.time_representation
    }

    pub fn is_twelve_hour(&self) -> bool {
        self.time_representation == TimeRepresentation::TwelveHour
    }

    /// Re-reads the 12/24-hour bit into the cache.
    pub async fn sync_time_representation(
        &mut self,
    ) -> Result<TimeRepresentation, PCF8523Error<I2C::Error>> {
        self.time_representation = self.read_hour_mode().await?;
        Ok(self.time_representation)
    }

    /// Configures the device according to the provided configuration.
    ///
    /// # Arguments
    /// * `config` - The configuration to apply
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(PCF8523Error)` on error
    pub async fn configure(&mut self, config: &Config) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut control = self.control_1().await?;
        control.set_capacitor(config.capacitor);
        control.set_time_representation(config.time_representation);
        debug!("PCF8523: writing control 1: {:#x}", u8::from(control));
        self.set_control_1(control).await?;
        self.time_representation = config.time_representation;
        self.set_power_mode(config.power_mode).await?;
        self.set_clock_out(config.clock_out).await
    }

    /// Resets every register to its power-on value.
    pub async fn soft_reset(&mut self) -> Result<(), PCF8523Error<I2C::Error>> {
        self.write_register(RegAddr::Control1, RESET_COMMAND).await?;
        self.time_representation = TimeRepresentation::TwentyFourHour;
        Ok(())
    }

    pub async fn write_register(
        &mut self,
        reg: RegAddr,
        value: u8,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        debug!("PCF8523: write {:#x} <- {:#x}", reg as u8, value);
        self.i2c.write(self.address, &[reg as u8, value]).await?;
        Ok(())
    }

    pub async fn read_register(&mut self, reg: RegAddr) -> Result<u8, PCF8523Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut data)
            .await?;
        trace!("PCF8523: read {:#x} -> {:#x}", reg as u8, data[0]);
        Ok(data[0])
    }

    async fn write_block(
        &mut self,
        start: RegAddr,
        data: &[u8],
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut buffer = [0u8; MAX_BLOCK_LEN + 1];
        buffer[0] = start as u8;
        buffer[1..=data.len()].copy_from_slice(data);
        debug!("PCF8523: write block at {:#x}, {} bytes", start as u8, data.len());
        self.i2c.write(self.address, &buffer[..=data.len()]).await?;
        Ok(())
    }

    async fn read_block(
        &mut self,
        start: RegAddr,
        data: &mut [u8],
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[start as u8], data)
            .await?;
        debug!("PCF8523: read block at {:#x}, {} bytes", start as u8, data.len());
        Ok(())
    }

    async fn update_register(
        &mut self,
        reg: RegAddr,
        mask: u8,
        bits: u8,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let current = self.read_register(reg).await?;
        self.write_register(reg, merge_bits(reg, current, mask, bits))
            .await
    }

    /// Sets or clears the bits in `mask`, keeping pending interrupt flags.
    pub async fn set_bit(
        &mut self,
        reg: RegAddr,
        mask: u8,
        value: bool,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.update_register(reg, mask, if value { mask } else { 0 })
            .await
    }

    pub async fn read_bit(&mut self, reg: RegAddr, mask: u8) -> Result<bool, PCF8523Error<I2C::Error>> {
        Ok(self.read_register(reg).await? & mask != 0)
    }

    /// Gets the current date and time from the device.
    ///
    /// # Returns
    /// * `Ok(Datetime)` - The current date and time
    /// * `Err(PCF8523Error::ClockIntegrityLost)` if the oscillator has stopped
    /// * `Err(PCF8523Error)` on other errors
    pub async fn datetime(&mut self) -> Result<Datetime, PCF8523Error<I2C::Error>> {
        let mut data = [0; 7];
        self.read_block(RegAddr::Seconds, &mut data).await?;
        check_clock_integrity(data[0])?;
        Ok(Datetime::from_registers(&data, self.time_representation))
    }

    /// Sets the current date and time on the device.
    ///
    /// # Arguments
    /// * `datetime` - The date and time to set
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err(PCF8523Error)` on error
    pub async fn set_datetime(&mut self, datetime: &Datetime) -> Result<(), PCF8523Error<I2C::Error>> {
        let data = datetime
            .to_registers(self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_block(RegAddr::Seconds, &data).await
    }

    pub async fn datetime_field(
        &mut self,
        field: DatetimeField,
    ) -> Result<(u8, Option<HourMode>), PCF8523Error<I2C::Error>> {
        let raw = self.read_register(field.register()).await?;
        if field == DatetimeField::Second {
            check_clock_integrity(raw)?;
        }
        Ok(decode_datetime_field(field, raw, self.time_representation))
    }

    pub async fn set_datetime_field(
        &mut self,
        field: DatetimeField,
        value: u8,
        hour_mode: Option<HourMode>,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let raw = encode_datetime_field(field, value, hour_mode, self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_register(field.register(), raw).await
    }

    pub async fn alarm(&mut self) -> Result<Alarm, PCF8523Error<I2C::Error>> {
        let mut data = [0; 4];
        self.read_block(RegAddr::MinuteAlarm, &mut data).await?;
        Ok(Alarm::from_registers(&data, self.time_representation))
    }

    pub async fn set_alarm(&mut self, alarm: &Alarm) -> Result<(), PCF8523Error<I2C::Error>> {
        let data = alarm
            .to_registers(self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_block(RegAddr::MinuteAlarm, &data).await
    }

    pub async fn alarm_field(
        &mut self,
        field: AlarmField,
    ) -> Result<AlarmFieldValue, PCF8523Error<I2C::Error>> {
        let raw = self.read_register(field.register()).await?;
        Ok(decode_alarm_field(field, raw, self.time_representation))
    }

    pub async fn set_alarm_field(
        &mut self,
        field: AlarmField,
        value: u8,
        enabled: bool,
        hour_mode: Option<HourMode>,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let raw = encode_alarm_field(field, value, enabled, hour_mode, self.time_representation)
            .map_err(PCF8523Error::validation)?;
        self.write_register(field.register(), raw).await
    }

    pub async fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut bits = Control3::default();
        bits.set_power_mode(mode);
        self.update_register(RegAddr::Control3, CONTROL3_POWER_MODE_MASK, bits.into())
            .await
    }

    pub async fn power_mode(&mut self) -> Result<PowerMode, PCF8523Error<I2C::Error>> {
        self.control_3()
            .await?
            .power_mode()
            .map_err(PCF8523Error::InvalidRegisterValue)
    }

    /// Switches between 12-hour and 24-hour mode, updating the cache only if
    /// the write succeeds.
    pub async fn set_hour_mode(
        &mut self,
        time_representation: TimeRepresentation,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(
            RegAddr::Control1,
            CONTROL1_12_24_MASK,
            time_representation == TimeRepresentation::TwelveHour,
        )
        .await?;
        self.time_representation = time_representation;
        Ok(())
    }

    pub async fn read_hour_mode(&mut self) -> Result<TimeRepresentation, PCF8523Error<I2C::Error>> {
        Ok(self.control_1().await?.time_representation())
    }

    pub async fn set_capacitor(
        &mut self,
        capacitor: OscillatorCapacitor,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(
            RegAddr::Control1,
            CONTROL1_CAP_SEL_MASK,
            capacitor == OscillatorCapacitor::Pf12_5,
        )
        .await
    }

    pub async fn capacitor(&mut self) -> Result<OscillatorCapacitor, PCF8523Error<I2C::Error>> {
        Ok(self.control_1().await?.capacitor())
    }

    pub async fn clock_integrity_lost(&mut self) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(RegAddr::Seconds, SECONDS_OS_MASK).await
    }

    pub async fn clear_clock_integrity_flag(&mut self) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(RegAddr::Seconds, SECONDS_OS_MASK, false).await
    }

    pub async fn enable_interrupt_source(
        &mut self,
        source: InterruptSource,
        enable: bool,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(source.register(), source.mask(), enable).await
    }

    pub async fn is_interrupt_source_enabled(
        &mut self,
        source: InterruptSource,
    ) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(source.register(), source.mask()).await
    }

    pub async fn interrupt_flag(&mut self, flag: InterruptFlag) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(flag.register(), flag.mask()).await
    }

    /// Clears one interrupt flag. Read-only flags are refused without any bus
    /// access.
    pub async fn clear_interrupt_flag(
        &mut self,
        flag: InterruptFlag,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        if flag.is_read_only() {
            warn!("PCF8523: flag {:#x} is read-only", flag.mask());
            return Err(PCF8523Error::ReadOnlyFlag);
        }
        self.set_bit(flag.register(), flag.mask(), false).await
    }

    pub async fn freeze_time(&mut self, freeze: bool) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(RegAddr::Control1, CONTROL1_STOP_MASK, freeze)
            .await
    }

    pub async fn is_time_frozen(&mut self) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(RegAddr::Control1, CONTROL1_STOP_MASK).await
    }

    pub async fn set_offset(
        &mut self,
        mode: OffsetMode,
        offset: i8,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        validate_offset(offset).map_err(PCF8523Error::validation)?;
        let mut value = Offset::default();
        value.set_mode(mode);
        value.set_offset(offset);
        self.set_offset_register(value).await
    }

    pub async fn offset(&mut self) -> Result<(OffsetMode, i8), PCF8523Error<I2C::Error>> {
        let value = self.offset_register().await?;
        Ok((value.mode(), value.offset()))
    }

    pub async fn set_timer_a_mode(&mut self, mode: TimerAMode) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut bits = TimerControl::default();
        bits.set_timer_a_mode(mode);
        self.update_register(RegAddr::TimerControl, TIMER_CONTROL_TIMER_A_MODE_MASK, bits.into())
            .await
    }

    pub async fn timer_a_mode(&mut self) -> Result<TimerAMode, PCF8523Error<I2C::Error>> {
        Ok(self.timer_control().await?.timer_a_mode())
    }

    pub async fn set_timer_b_enabled(&mut self, enabled: bool) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(RegAddr::TimerControl, TIMER_CONTROL_TIMER_B_ENABLE_MASK, enabled)
            .await
    }

    pub async fn timer_b_enabled(&mut self) -> Result<bool, PCF8523Error<I2C::Error>> {
        self.read_bit(RegAddr::TimerControl, TIMER_CONTROL_TIMER_B_ENABLE_MASK)
            .await
    }

    pub async fn set_timer_interrupt_mode(
        &mut self,
        timer: Timer,
        mode: TimerInterruptMode,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.set_bit(
            RegAddr::TimerControl,
            timer.interrupt_mode_mask(),
            mode == TimerInterruptMode::Pulsed,
        )
        .await
    }

    pub async fn timer_interrupt_mode(
        &mut self,
        timer: Timer,
    ) -> Result<TimerInterruptMode, PCF8523Error<I2C::Error>> {
        let pulsed = self
            .read_bit(RegAddr::TimerControl, timer.interrupt_mode_mask())
            .await?;
        Ok(TimerInterruptMode::from(u8::from(pulsed)))
    }

    pub async fn set_timer_a_duration(
        &mut self,
        timer: &TimerAValue,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.write_block(RegAddr::TimerAFrequencyControl, &timer.to_registers())
            .await
    }

    pub async fn timer_a_duration(&mut self) -> Result<TimerAValue, PCF8523Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_block(RegAddr::TimerAFrequencyControl, &mut data)
            .await?;
        Ok(TimerAValue::from_registers(&data))
    }

    pub async fn set_timer_b_duration(
        &mut self,
        timer: &TimerBValue,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        self.write_block(RegAddr::TimerBFrequencyControl, &timer.to_registers())
            .await
    }

    pub async fn timer_b_duration(&mut self) -> Result<TimerBValue, PCF8523Error<I2C::Error>> {
        let mut data = [0; 2];
        self.read_block(RegAddr::TimerBFrequencyControl, &mut data)
            .await?;
        Ok(TimerBValue::from_registers(&data))
    }

    pub async fn set_clock_out(
        &mut self,
        frequency: ClockOutFrequency,
    ) -> Result<(), PCF8523Error<I2C::Error>> {
        let mut bits = TimerControl::default();
        bits.set_clock_out(frequency);
        self.update_register(RegAddr::TimerControl, TIMER_CONTROL_CLOCK_OUT_MASK, bits.into())
            .await
    }

    pub async fn clock_out(&mut self) -> Result<ClockOutFrequency, PCF8523Error<I2C::Error>> {
        Ok(self.timer_control().await?.clock_out())
    }
}

// Register access implementations
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> PCF8523<I2C> {
            $(
                paste! {
                    #[doc = concat!("Gets the value of the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Returns"]
                    #[doc = concat!("* `Ok(", stringify!($typ), ")` - The register value on success")]
                    #[doc = "* `Err(PCF8523Error)` on error"]
                    pub async fn $name(&mut self) -> Result<$typ, PCF8523Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Sets the value of the ", stringify!($name), " register.")]
                    #[doc = "\n\nThe byte is written as given, pending flags included."]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), PCF8523Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
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

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::{Field, TimerBPulseWidth, TimerSourceFrequency, ValidationError};
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    async fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    fn sample_datetime() -> Datetime {
        Datetime {
            second: 30,
            minute: 15,
            hour: 10,
            hour_mode: HourMode::TwentyFourHour,
            day: 9,
            weekday: 6,
            month: 8,
            year: 25,
        }
    }

    #[tokio::test]
    async fn test_async_from_device() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Control1 as u8],
            vec![0x08],
        )])
        .await;
        let dev = PCF8523::from_device(mock, DEVICE_ADDRESS).await.unwrap();
        assert!(dev.is_twelve_hour());
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_configure() {
        let config = Config {
            time_representation: TimeRepresentation::TwentyFourHour,
            power_mode: PowerMode::SwitchOverDirectLowDetectEnabled,
            capacitor: OscillatorCapacitor::Pf7,
            clock_out: ClockOutFrequency::Hz1,
        };

        let mock = setup_mock(&[
            // Read control 1, leave it in 24-hour mode with 7 pF
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x88]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0x00]),
            // Power mode 0b001 with the battery switch-over flag written as 1
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control3 as u8], vec![0xE0]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control3 as u8, 0x28]),
            // CLKOUT 1 Hz
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::TimerControl as u8], vec![0x38]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::TimerControl as u8, 0x30]),
        ])
        .await;

        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwelveHour);
        dev.configure(&config).await.unwrap();
        assert!(!dev.is_twelve_hour());
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_datetime_round_trip() {
        let mock = setup_mock(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8, 0x30, 0x15, 0x10, 0x09, 0x06, 0x08, 0x25],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                vec![0x30, 0x15, 0x10, 0x09, 0x06, 0x08, 0x25],
            ),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwentyFourHour);

        dev.set_datetime(&sample_datetime()).await.unwrap();
        let read = dev.datetime().await.unwrap();
        assert_eq!(read, sample_datetime());
        assert_eq!(read.timestamp(2000), Some(1_754_734_530));
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_clock_integrity_gate() {
        let mock = setup_mock(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                vec![0x80, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0x80]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8, 0x00]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], vec![0x00]),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwentyFourHour);

        assert_eq!(dev.datetime().await, Err(PCF8523Error::ClockIntegrityLost));
        dev.clear_clock_integrity_flag().await.unwrap();
        assert_eq!(
            dev.datetime_field(DatetimeField::Second).await.unwrap(),
            (0, None)
        );
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_validation_before_bus_access() {
        let mock = setup_mock(&[]).await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwelveHour);

        assert_eq!(
            dev.set_datetime(&sample_datetime()).await,
            Err(PCF8523Error::Validation(ValidationError::ModeMismatch))
        );
        assert_eq!(
            dev.set_offset(OffsetMode::EveryTwoHours, 64).await,
            Err(PCF8523Error::Validation(ValidationError::OutOfRange(
                Field::Offset
            )))
        );
        assert_eq!(
            dev.clear_interrupt_flag(InterruptFlag::BatteryLow).await,
            Err(PCF8523Error::ReadOnlyFlag)
        );
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_set_hour_mode_failure_keeps_cache() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0x08])
                .with_error(ErrorKind::Other),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8], vec![0x00]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control1 as u8, 0x08]),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwentyFourHour);

        assert_eq!(
            dev.set_hour_mode(TimeRepresentation::TwelveHour).await,
            Err(PCF8523Error::I2c(ErrorKind::Other))
        );
        assert!(!dev.is_twelve_hour());
        dev.set_hour_mode(TimeRepresentation::TwelveHour)
            .await
            .unwrap();
        assert!(dev.is_twelve_hour());
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_alarm() {
        let alarm = Alarm {
            minute: 0,
            minute_enabled: true,
            hour: 6,
            hour_mode: HourMode::Am,
            hour_enabled: true,
            day: 15,
            day_enabled: false,
            weekday: 1,
            weekday_enabled: true,
        };
        let mock = setup_mock(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::MinuteAlarm as u8, 0x00, 0x06, 0x95, 0x01],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MinuteAlarm as u8],
                vec![0x00, 0x06, 0x95, 0x01],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::DayAlarm as u8], vec![0x95]),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwelveHour);

        dev.set_alarm(&alarm).await.unwrap();
        assert_eq!(dev.alarm().await.unwrap(), alarm);
        assert_eq!(
            dev.alarm_field(AlarmField::Day).await.unwrap(),
            AlarmFieldValue {
                value: 15,
                enabled: false,
                hour_mode: None,
            }
        );
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_interrupts() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8], vec![0x10]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8, 0xF9]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8], vec![0x11]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8], vec![0x11]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control2 as u8, 0xE9]),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwentyFourHour);

        dev.enable_interrupt_source(InterruptSource::CountdownTimerB, true)
            .await
            .unwrap();
        assert!(dev.interrupt_flag(InterruptFlag::Second).await.unwrap());
        dev.clear_interrupt_flag(InterruptFlag::Second).await.unwrap();
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_timers() {
        let timer_b = TimerBValue {
            source_frequency: TimerSourceFrequency::Hz64,
            pulse_width: TimerBPulseWidth::Ms125_000,
            value: 10,
        };
        let mock = setup_mock(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::TimerBFrequencyControl as u8, 0x41, 0x0A],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::TimerBFrequencyControl as u8],
                vec![0x41, 0x0A],
            ),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::TimerControl as u8], vec![0x38]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::TimerControl as u8, 0x3C]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::TimerControl as u8], vec![0x3C]),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwentyFourHour);

        dev.set_timer_b_duration(&timer_b).await.unwrap();
        assert_eq!(dev.timer_b_duration().await.unwrap(), timer_b);
        dev.set_timer_a_mode(TimerAMode::Watchdog).await.unwrap();
        assert_eq!(dev.timer_a_mode().await.unwrap(), TimerAMode::Watchdog);
        dev.i2c.done();
    }

    #[tokio::test]
    async fn test_async_power_mode_and_offset() {
        let mock = setup_mock(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control3 as u8], vec![0xE0]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Offset as u8, 0x3F]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Offset as u8], vec![0x3F]),
        ])
        .await;
        let mut dev = PCF8523::new(mock, DEVICE_ADDRESS, TimeRepresentation::TwentyFourHour);

        assert_eq!(
            dev.power_mode().await.unwrap(),
            PowerMode::SwitchOverDisabledLowDetectDisabled
        );
        dev.set_offset(OffsetMode::EveryTwoHours, 63).await.unwrap();
        assert_eq!(
            dev.offset().await.unwrap(),
            (OffsetMode::EveryTwoHours, 63)
        );
        dev.i2c.done();
    }
}
