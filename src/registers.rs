//! Register definitions and bitfield structures for the PCF8523 RTC.
//!
//! This module contains the register map, the bitfield wrappers for each
//! register that carries flags or packed sub-fields, and the enums for every
//! multi-bit hardware field. Several raw codes alias the same behavior on the
//! device; every decode table below maps those aliases to one canonical
//! variant.

use bitfield::bitfield;

/// Writing this byte to control register 1 performs a full software reset.
pub const RESET_COMMAND: u8 = 0x58;

/// Oscillator-stop flag in the seconds register.
pub const SECONDS_OS_MASK: u8 = 0x80;
/// Alarm field disable flag (AEN_x, 1 = field ignored).
pub const ALARM_DISABLE_MASK: u8 = 0x80;

/// Capacitor select in control register 1.
pub const CONTROL1_CAP_SEL_MASK: u8 = 0x80;
/// Stop bit in control register 1 (1 = time circuits frozen).
pub const CONTROL1_STOP_MASK: u8 = 0x20;
/// 12/24-hour select in control register 1 (1 = 12-hour mode).
pub const CONTROL1_12_24_MASK: u8 = 0x08;

/// Interrupt flags in control register 2. They are cleared by writing 0 and
/// unaffected by writing 1.
pub const CONTROL2_FLAG_MASK: u8 = 0xF8;
/// Interrupt flags in control register 3 that are cleared by writing 0.
pub const CONTROL3_FLAG_MASK: u8 = 0x08;
/// Power management bits in control register 3.
pub const CONTROL3_POWER_MODE_MASK: u8 = 0xE0;

/// Timer A interrupt mode bit in the timer control register.
pub const TIMER_CONTROL_TAM_MASK: u8 = 0x80;
/// Timer B interrupt mode bit in the timer control register.
pub const TIMER_CONTROL_TBM_MASK: u8 = 0x40;
/// Clock-out frequency bits in the timer control register.
pub const TIMER_CONTROL_CLOCK_OUT_MASK: u8 = 0x38;
/// Timer A mode bits in the timer control register.
pub const TIMER_CONTROL_TIMER_A_MODE_MASK: u8 = 0x06;
/// Timer B enable bit in the timer control register.
pub const TIMER_CONTROL_TIMER_B_ENABLE_MASK: u8 = 0x01;

/// Register addresses for the PCF8523 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Control register 1
    Control1 = 0x00,
    /// Control register 2, interrupt enables and timer/alarm flags
    Control2 = 0x01,
    /// Control register 3, power management and battery flags
    Control3 = 0x02,
    /// Seconds register (0-59) with oscillator-stop flag
    Seconds = 0x03,
    /// Minutes register (0-59)
    Minutes = 0x04,
    /// Hours register (0-23 or 1-12 + AM/PM)
    Hours = 0x05,
    /// Day of month register (1-31)
    Days = 0x06,
    /// Weekday register (0-6)
    Weekdays = 0x07,
    /// Month register (1-12)
    Months = 0x08,
    /// Year register (0-99)
    Years = 0x09,
    /// Minute alarm register
    MinuteAlarm = 0x0A,
    /// Hour alarm register
    HourAlarm = 0x0B,
    /// Day alarm register
    DayAlarm = 0x0C,
    /// Weekday alarm register
    WeekdayAlarm = 0x0D,
    /// Aging offset register
    Offset = 0x0E,
    /// Timer and clock-out control register
    TimerControl = 0x0F,
    /// Timer A source clock register
    TimerAFrequencyControl = 0x10,
    /// Timer A count register
    TimerA = 0x11,
    /// Timer B source clock and pulse width register
    TimerBFrequencyControl = 0x12,
    /// Timer B count register
    TimerB = 0x13,
}

impl RegAddr {
    /// Bits that a read-modify-write of this register must write back as 1.
    ///
    /// Interrupt flags on this part are cleared by writing 0, so writing back
    /// a stale copy of the register could clear a flag that was raised
    /// between the read and the write.
    #[must_use]
    pub const fn flag_preserve_mask(self) -> u8 {
        match self {
            RegAddr::Control2 => CONTROL2_FLAG_MASK,
            RegAddr::Control3 => CONTROL3_FLAG_MASK,
            _ => 0,
        }
    }
}

/// Computes the byte to write back for a read-modify-write.
///
/// `bits` is written into the positions selected by `mask`. Everything else is
/// kept from `current`, except that flag bits of `reg` are forced to 1 so that
/// only flags inside `mask` can be cleared.
#[must_use]
pub(crate) const fn merge_bits(reg: RegAddr, current: u8, mask: u8, bits: u8) -> u8 {
    ((current | reg.flag_preserve_mask()) & !mask) | (bits & mask)
}

/// Hour display convention selected by the 12/24 bit of control register 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeRepresentation {
    /// 24-hour format (0-23)
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for TimeRepresentation {
    /// Creates a `TimeRepresentation` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimeRepresentation::TwentyFourHour,
            1 => TimeRepresentation::TwelveHour,
            _ => panic!("Invalid value for TimeRepresentation: {}", v),
        }
    }
}
impl From<TimeRepresentation> for u8 {
    fn from(v: TimeRepresentation) -> Self {
        v as u8
    }
}

/// Load capacitance selected for the quartz crystal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OscillatorCapacitor {
    /// 7 pF
    Pf7 = 0,
    /// 12.5 pF
    Pf12_5 = 1,
}
impl From<u8> for OscillatorCapacitor {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => OscillatorCapacitor::Pf7,
            1 => OscillatorCapacitor::Pf12_5,
            _ => panic!("Invalid value for OscillatorCapacitor: {}", v),
        }
    }
}
impl From<OscillatorCapacitor> for u8 {
    fn from(v: OscillatorCapacitor) -> Self {
        v as u8
    }
}

/// Battery switch-over and battery-low detection strategy (control 3, bits 7-5).
///
/// Codes `0b010` and `0b011` both select "switch-over disabled, low detection
/// enabled" and decode to [`PowerMode::SwitchOverDisabledLowDetectEnabled`].
/// Code `0b110` is not defined by the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// Standard switch-over, battery-low detection enabled
    SwitchOverStandardLowDetectEnabled = 0b000,
    /// Direct switch-over, battery-low detection enabled
    SwitchOverDirectLowDetectEnabled = 0b001,
    /// Switch-over disabled (VDD only), battery-low detection enabled
    SwitchOverDisabledLowDetectEnabled = 0b010,
    /// Standard switch-over, battery-low detection disabled
    SwitchOverStandardLowDetectDisabled = 0b100,
    /// Direct switch-over, battery-low detection disabled
    SwitchOverDirectLowDetectDisabled = 0b101,
    /// Switch-over disabled (VDD only), battery-low detection disabled
    SwitchOverDisabledLowDetectDisabled = 0b111,
}
impl TryFrom<u8> for PowerMode {
    type Error = u8;

    /// Decodes the 3-bit power management field.
    ///
    /// # Errors
    /// Returns the raw code if it has no defined meaning.
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0b000 => Ok(PowerMode::SwitchOverStandardLowDetectEnabled),
            0b001 => Ok(PowerMode::SwitchOverDirectLowDetectEnabled),
            0b010 | 0b011 => Ok(PowerMode::SwitchOverDisabledLowDetectEnabled),
            0b100 => Ok(PowerMode::SwitchOverStandardLowDetectDisabled),
            0b101 => Ok(PowerMode::SwitchOverDirectLowDetectDisabled),
            0b111 => Ok(PowerMode::SwitchOverDisabledLowDetectDisabled),
            _ => Err(v),
        }
    }
}
impl From<PowerMode> for u8 {
    fn from(v: PowerMode) -> Self {
        v as u8
    }
}

/// Frequency driven on the CLKOUT pin (timer control, bits 5-3).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockOutFrequency {
    /// 32.768 kHz
    Hz32768 = 0b000,
    /// 16.384 kHz
    Hz16384 = 0b001,
    /// 8.192 kHz
    Hz8192 = 0b010,
    /// 4.096 kHz
    Hz4096 = 0b011,
    /// 1.024 kHz
    Hz1024 = 0b100,
    /// 32 Hz
    Hz32 = 0b101,
    /// 1 Hz
    Hz1 = 0b110,
    /// CLKOUT disabled (high impedance)
    Disabled = 0b111,
}
impl From<u8> for ClockOutFrequency {
    /// # Panics
    /// Panics if the value does not fit in 3 bits.
    fn from(v: u8) -> Self {
        match v {
            0b000 => ClockOutFrequency::Hz32768,
            0b001 => ClockOutFrequency::Hz16384,
            0b010 => ClockOutFrequency::Hz8192,
            0b011 => ClockOutFrequency::Hz4096,
            0b100 => ClockOutFrequency::Hz1024,
            0b101 => ClockOutFrequency::Hz32,
            0b110 => ClockOutFrequency::Hz1,
            0b111 => ClockOutFrequency::Disabled,
            _ => panic!("Invalid value for ClockOutFrequency: {}", v),
        }
    }
}
impl From<ClockOutFrequency> for u8 {
    fn from(v: ClockOutFrequency) -> Self {
        v as u8
    }
}

/// Source clock of timer A or timer B (TAQ / TBQ, 3 bits).
///
/// Codes `0b100` through `0b111` all select 1/3600 Hz and decode to
/// [`TimerSourceFrequency::OnePerHour`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerSourceFrequency {
    /// 4.096 kHz, about 244 µs per tick
    Hz4096 = 0b000,
    /// 64 Hz, 15.625 ms per tick
    Hz64 = 0b001,
    /// 1 Hz
    Hz1 = 0b010,
    /// 1/60 Hz, one tick per minute
    OnePerMinute = 0b011,
    /// 1/3600 Hz, one tick per hour
    OnePerHour = 0b100,
}
impl From<u8> for TimerSourceFrequency {
    /// # Panics
    /// Panics if the value does not fit in 3 bits.
    fn from(v: u8) -> Self {
        match v {
            0b000 => TimerSourceFrequency::Hz4096,
            0b001 => TimerSourceFrequency::Hz64,
            0b010 => TimerSourceFrequency::Hz1,
            0b011 => TimerSourceFrequency::OnePerMinute,
            0b100..=0b111 => TimerSourceFrequency::OnePerHour,
            _ => panic!("Invalid value for TimerSourceFrequency: {}", v),
        }
    }
}
impl From<TimerSourceFrequency> for u8 {
    fn from(v: TimerSourceFrequency) -> Self {
        v as u8
    }
}

/// Width of the timer B interrupt pulse (TBW, bits 6-4 of 0x12).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerBPulseWidth {
    /// 46.875 ms
    Ms46_875 = 0b000,
    /// 62.500 ms
    Ms62_500 = 0b001,
    /// 78.125 ms
    Ms78_125 = 0b010,
    /// 93.750 ms
    Ms93_750 = 0b011,
    /// 125.000 ms
    Ms125_000 = 0b100,
    /// 156.250 ms
    Ms156_250 = 0b101,
    /// 187.500 ms
    Ms187_500 = 0b110,
    /// 218.750 ms
    Ms218_750 = 0b111,
}
impl From<u8> for TimerBPulseWidth {
    /// # Panics
    /// Panics if the value does not fit in 3 bits.
    fn from(v: u8) -> Self {
        match v {
            0b000 => TimerBPulseWidth::Ms46_875,
            0b001 => TimerBPulseWidth::Ms62_500,
            0b010 => TimerBPulseWidth::Ms78_125,
            0b011 => TimerBPulseWidth::Ms93_750,
            0b100 => TimerBPulseWidth::Ms125_000,
            0b101 => TimerBPulseWidth::Ms156_250,
            0b110 => TimerBPulseWidth::Ms187_500,
            0b111 => TimerBPulseWidth::Ms218_750,
            _ => panic!("Invalid value for TimerBPulseWidth: {}", v),
        }
    }
}
impl From<TimerBPulseWidth> for u8 {
    fn from(v: TimerBPulseWidth) -> Self {
        v as u8
    }
}

/// Timer A function (TAC, bits 2-1 of the timer control register).
///
/// Codes `0b00` and `0b11` both disable timer A.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerAMode {
    /// Timer A disabled
    Disabled = 0b00,
    /// Timer A is a countdown timer
    Countdown = 0b01,
    /// Timer A is a watchdog timer
    Watchdog = 0b10,
}
impl From<u8> for TimerAMode {
    /// # Panics
    /// Panics if the value does not fit in 2 bits.
    fn from(v: u8) -> Self {
        match v {
            0b00 | 0b11 => TimerAMode::Disabled,
            0b01 => TimerAMode::Countdown,
            0b10 => TimerAMode::Watchdog,
            _ => panic!("Invalid value for TimerAMode: {}", v),
        }
    }
}
impl From<TimerAMode> for u8 {
    fn from(v: TimerAMode) -> Self {
        v as u8
    }
}

/// How a timer drives the interrupt pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerInterruptMode {
    /// Interrupt follows the flag until it is cleared
    Permanent = 0,
    /// Interrupt is a pulse
    Pulsed = 1,
}
impl From<u8> for TimerInterruptMode {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => TimerInterruptMode::Permanent,
            1 => TimerInterruptMode::Pulsed,
            _ => panic!("Invalid value for TimerInterruptMode: {}", v),
        }
    }
}
impl From<TimerInterruptMode> for u8 {
    fn from(v: TimerInterruptMode) -> Self {
        v as u8
    }
}

/// When the aging offset correction pulse is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OffsetMode {
    /// Correction applied once every two hours
    EveryTwoHours = 0,
    /// Correction applied once every minute
    EveryMinute = 1,
}
impl From<u8> for OffsetMode {
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => OffsetMode::EveryTwoHours,
            1 => OffsetMode::EveryMinute,
            _ => panic!("Invalid value for OffsetMode: {}", v),
        }
    }
}
impl From<OffsetMode> for u8 {
    fn from(v: OffsetMode) -> Self {
        v as u8
    }
}

/// Interrupt sources, each tied to its enable bit in a control register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptSource {
    /// Second interrupt (SIE)
    Second,
    /// Alarm interrupt (AIE)
    Alarm,
    /// Offset correction interrupt (CIE)
    Correction,
    /// Watchdog timer A interrupt (WTAIE)
    WatchdogTimerA,
    /// Countdown timer A interrupt (CTAIE)
    CountdownTimerA,
    /// Countdown timer B interrupt (CTBIE)
    CountdownTimerB,
    /// Battery switch-over interrupt (BSIE)
    BatterySwitchOver,
    /// Battery low interrupt (BLIE)
    BatteryLow,
}

impl InterruptSource {
    /// Control register holding the enable bit.
    #[must_use]
    pub const fn register(self) -> RegAddr {
        match self {
            InterruptSource::Second | InterruptSource::Alarm | InterruptSource::Correction => {
                RegAddr::Control1
            }
            InterruptSource::WatchdogTimerA
            | InterruptSource::CountdownTimerA
            | InterruptSource::CountdownTimerB => RegAddr::Control2,
            InterruptSource::BatterySwitchOver | InterruptSource::BatteryLow => RegAddr::Control3,
        }
    }

    /// Position of the enable bit.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            InterruptSource::Second | InterruptSource::WatchdogTimerA => 1 << 2,
            InterruptSource::Alarm
            | InterruptSource::CountdownTimerA
            | InterruptSource::BatterySwitchOver => 1 << 1,
            InterruptSource::Correction
            | InterruptSource::CountdownTimerB
            | InterruptSource::BatteryLow => 1 << 0,
        }
    }
}

/// Interrupt flags, each tied to its bit in a control register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptFlag {
    /// Watchdog timer A flag (WTAF), read-only, cleared by reading control 2
    WatchdogTimerA,
    /// Countdown timer A flag (CTAF)
    CountdownTimerA,
    /// Countdown timer B flag (CTBF)
    CountdownTimerB,
    /// Second interrupt flag (SF)
    Second,
    /// Alarm flag (AF)
    Alarm,
    /// Battery switch-over flag (BSF)
    BatterySwitchOver,
    /// Battery status low flag (BLF), read-only
    BatteryLow,
}

impl InterruptFlag {
    /// Control register holding the flag.
    #[must_use]
    pub const fn register(self) -> RegAddr {
        match self {
            InterruptFlag::BatterySwitchOver | InterruptFlag::BatteryLow => RegAddr::Control3,
            _ => RegAddr::Control2,
        }
    }

    /// Position of the flag bit.
    #[must_use]
    pub const fn mask(self) -> u8 {
        match self {
            InterruptFlag::WatchdogTimerA => 1 << 7,
            InterruptFlag::CountdownTimerA => 1 << 6,
            InterruptFlag::CountdownTimerB => 1 << 5,
            InterruptFlag::Second => 1 << 4,
            InterruptFlag::Alarm | InterruptFlag::BatterySwitchOver => 1 << 3,
            InterruptFlag::BatteryLow => 1 << 2,
        }
    }

    /// Flags the host cannot clear by writing.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, InterruptFlag::WatchdogTimerA | InterruptFlag::BatteryLow)
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Control register 1: oscillator, stop, hour format and interrupt enables.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control1(u8);
    impl Debug;
    /// Crystal load capacitance
    pub from into OscillatorCapacitor, capacitor, set_capacitor: 7, 7;
    /// Time circuits frozen
    pub stop, set_stop: 5;
    /// Software reset trigger bit
    pub software_reset, set_software_reset: 4;
    /// 12/24-hour select
    pub from into TimeRepresentation, time_representation, set_time_representation: 3, 3;
    /// Second interrupt enable
    pub second_interrupt_enable, set_second_interrupt_enable: 2;
    /// Alarm interrupt enable
    pub alarm_interrupt_enable, set_alarm_interrupt_enable: 1;
    /// Correction interrupt enable
    pub correction_interrupt_enable, set_correction_interrupt_enable: 0;
}
from_register_u8!(Control1);

#[cfg(feature = "defmt")]
impl defmt::Format for Control1 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control1({}, {}, stop={}, SIE={}, AIE={}, CIE={})",
            self.capacitor(),
            self.time_representation(),
            self.stop(),
            self.second_interrupt_enable(),
            self.alarm_interrupt_enable(),
            self.correction_interrupt_enable()
        );
    }
}

bitfield! {
    /// Control register 2: timer and alarm flags plus timer interrupt enables.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control2(u8);
    impl Debug;
    /// Watchdog timer A flag (read-only)
    pub watchdog_timer_a_flag, set_watchdog_timer_a_flag: 7;
    /// Countdown timer A flag
    pub countdown_timer_a_flag, set_countdown_timer_a_flag: 6;
    /// Countdown timer B flag
    pub countdown_timer_b_flag, set_countdown_timer_b_flag: 5;
    /// Second interrupt flag
    pub second_flag, set_second_flag: 4;
    /// Alarm flag
    pub alarm_flag, set_alarm_flag: 3;
    /// Watchdog timer A interrupt enable
    pub watchdog_timer_a_interrupt_enable, set_watchdog_timer_a_interrupt_enable: 2;
    /// Countdown timer A interrupt enable
    pub countdown_timer_a_interrupt_enable, set_countdown_timer_a_interrupt_enable: 1;
    /// Countdown timer B interrupt enable
    pub countdown_timer_b_interrupt_enable, set_countdown_timer_b_interrupt_enable: 0;
}
from_register_u8!(Control2);

#[cfg(feature = "defmt")]
impl defmt::Format for Control2 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control2(WTAF={}, CTAF={}, CTBF={}, SF={}, AF={}, WTAIE={}, CTAIE={}, CTBIE={})",
            self.watchdog_timer_a_flag(),
            self.countdown_timer_a_flag(),
            self.countdown_timer_b_flag(),
            self.second_flag(),
            self.alarm_flag(),
            self.watchdog_timer_a_interrupt_enable(),
            self.countdown_timer_a_interrupt_enable(),
            self.countdown_timer_b_interrupt_enable()
        );
    }
}

bitfield! {
    /// Control register 3: power management and battery flags.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control3(u8);
    impl Debug;
    /// Raw power management code, see [`PowerMode`]
    pub power_mode_bits, set_power_mode_bits: 7, 5;
    /// Battery switch-over flag
    pub battery_switch_over_flag, set_battery_switch_over_flag: 3;
    /// Battery low flag (read-only)
    pub battery_low_flag, set_battery_low_flag: 2;
    /// Battery switch-over interrupt enable
    pub battery_switch_over_interrupt_enable, set_battery_switch_over_interrupt_enable: 1;
    /// Battery low interrupt enable
    pub battery_low_interrupt_enable, set_battery_low_interrupt_enable: 0;
}
from_register_u8!(Control3);

impl Control3 {
    /// Decoded power management mode.
    ///
    /// # Errors
    /// Returns the raw 3-bit code if it is undefined.
    pub fn power_mode(&self) -> Result<PowerMode, u8> {
        PowerMode::try_from(self.power_mode_bits())
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) {
        self.set_power_mode_bits(mode.into());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Control3 {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Control3(PM={=u8:b},BSF={}, BLF={}, BSIE={}, BLIE={})",
            self.power_mode_bits(),
            self.battery_switch_over_flag(),
            self.battery_low_flag(),
            self.battery_switch_over_interrupt_enable(),
            self.battery_low_interrupt_enable()
        );
    }
}

bitfield! {
    /// Seconds register with the oscillator-stop (clock integrity) flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Seconds(u8);
    impl Debug;
    /// Clock integrity is not guaranteed
    pub clock_integrity_lost, set_clock_integrity_lost: 7;
    /// BCD seconds (0-59)
    pub bcd, set_bcd: 6, 0;
}
from_register_u8!(Seconds);

bitfield! {
    /// Hours register. Bit 5 is the PM flag in 12-hour mode and the 20-hour
    /// digit in 24-hour mode.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// PM flag (12-hour mode only)
    pub pm, set_pm: 5;
    /// BCD hour in 24-hour mode (0-23)
    pub bcd_24h, set_bcd_24h: 5, 0;
    /// BCD hour in 12-hour mode (1-12)
    pub bcd_12h, set_bcd_12h: 4, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// One of the minute, day or weekday alarm registers.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmRegister(u8);
    impl Debug;
    /// Field does not take part in alarm matching
    pub disabled, set_disabled: 7;
    /// Field value (BCD, or binary for the weekday alarm)
    pub value, set_value: 6, 0;
}
from_register_u8!(AlarmRegister);

bitfield! {
    /// Hour alarm register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Field does not take part in alarm matching
    pub disabled, set_disabled: 7;
    /// Hour byte with the disable flag removed
    pub hour, set_hour: 5, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Aging offset register: 7-bit two's complement offset and mode.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Offset(u8);
    impl Debug;
    /// Correction interval
    pub from into OffsetMode, mode, set_mode: 7, 7;
    /// Raw 7-bit offset
    pub offset_bits, set_offset_bits: 6, 0;
}
from_register_u8!(Offset);

impl Offset {
    /// Offset in correction steps (-64 to +63).
    #[must_use]
    pub fn offset(&self) -> i8 {
        // Move the 7-bit sign into bit 7, then shift back arithmetically.
        ((self.offset_bits() << 1) as i8) >> 1
    }

    /// Stores the low 7 bits of `offset`.
    pub fn set_offset(&mut self, offset: i8) {
        self.set_offset_bits((offset as u8) & 0x7F);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Offset {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Offset({}, {})", self.offset(), self.mode());
    }
}

bitfield! {
    /// Timer and clock-out control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TimerControl(u8);
    impl Debug;
    /// Interrupt mode of timer A and the second interrupt
    pub from into TimerInterruptMode, timer_a_interrupt_mode, set_timer_a_interrupt_mode: 7, 7;
    /// Interrupt mode of timer B
    pub from into TimerInterruptMode, timer_b_interrupt_mode, set_timer_b_interrupt_mode: 6, 6;
    /// CLKOUT frequency
    pub from into ClockOutFrequency, clock_out, set_clock_out: 5, 3;
    /// Timer A function
    pub from into TimerAMode, timer_a_mode, set_timer_a_mode: 2, 1;
    /// Timer B enabled
    pub timer_b_enabled, set_timer_b_enabled: 0;
}
from_register_u8!(TimerControl);

#[cfg(feature = "defmt")]
impl defmt::Format for TimerControl {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "TimerControl(TAM={}, TBM={}, COF={}, TAC={}, TBC={})",
            self.timer_a_interrupt_mode(),
            self.timer_b_interrupt_mode(),
            self.clock_out(),
            self.timer_a_mode(),
            self.timer_b_enabled()
        );
    }
}

bitfield! {
    /// Timer A source clock register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TimerAFrequencyControl(u8);
    impl Debug;
    /// Source clock
    pub from into TimerSourceFrequency, source_frequency, set_source_frequency: 2, 0;
}
from_register_u8!(TimerAFrequencyControl);

bitfield! {
    /// Timer B source clock and interrupt pulse width register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TimerBFrequencyControl(u8);
    impl Debug;
    /// Interrupt pulse width
    pub from into TimerBPulseWidth, pulse_width, set_pulse_width: 6, 4;
    /// Source clock
    pub from into TimerSourceFrequency, source_frequency, set_source_frequency: 2, 0;
}
from_register_u8!(TimerBFrequencyControl);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_preserve_mask_only_on_flag_registers() {
        assert_eq!(RegAddr::Control2.flag_preserve_mask(), 0xF8);
        assert_eq!(RegAddr::Control3.flag_preserve_mask(), 0x08);
        assert_eq!(RegAddr::Control1.flag_preserve_mask(), 0);
        assert_eq!(RegAddr::Seconds.flag_preserve_mask(), 0);
        assert_eq!(RegAddr::TimerControl.flag_preserve_mask(), 0);
    }

    #[test]
    fn test_merge_bits_keeps_pending_flags() {
        // Enabling CTAIE with no flags pending must not write 0 to any flag.
        assert_eq!(merge_bits(RegAddr::Control2, 0x00, 0x02, 0x02), 0xFA);
        // Clearing AF leaves the other flags written as 1.
        assert_eq!(merge_bits(RegAddr::Control2, 0x48, 0x08, 0x00), 0xF0);
        // Plain registers are untouched outside the mask.
        assert_eq!(merge_bits(RegAddr::TimerControl, 0xC7, 0x38, 0x28), 0xEF);
        assert_eq!(merge_bits(RegAddr::Control1, 0xFF, 0x20, 0x00), 0xDF);
    }

    #[test]
    fn test_power_mode_aliases() {
        assert_eq!(
            PowerMode::try_from(0b010),
            Ok(PowerMode::SwitchOverDisabledLowDetectEnabled)
        );
        assert_eq!(
            PowerMode::try_from(0b011),
            Ok(PowerMode::SwitchOverDisabledLowDetectEnabled)
        );
        assert_eq!(
            PowerMode::try_from(0b111),
            Ok(PowerMode::SwitchOverDisabledLowDetectDisabled)
        );
        assert_eq!(PowerMode::try_from(0b110), Err(0b110));
        assert_eq!(u8::from(PowerMode::SwitchOverDirectLowDetectDisabled), 0b101);
    }

    #[test]
    fn test_control3_power_mode_position() {
        let mut control = Control3::from(0x0C);
        control.set_power_mode(PowerMode::SwitchOverStandardLowDetectDisabled);
        assert_eq!(u8::from(control), 0x8C);
        assert_eq!(
            control.power_mode(),
            Ok(PowerMode::SwitchOverStandardLowDetectDisabled)
        );
        assert!(control.battery_switch_over_flag());
        assert!(control.battery_low_flag());
    }

    #[test]
    fn test_timer_source_frequency_aliases() {
        for raw in 0b100u8..=0b111 {
            assert_eq!(
                TimerSourceFrequency::from(raw),
                TimerSourceFrequency::OnePerHour
            );
        }
        assert_eq!(TimerSourceFrequency::from(0b011), TimerSourceFrequency::OnePerMinute);
    }

    #[test]
    fn test_timer_a_mode_aliases() {
        assert_eq!(TimerAMode::from(0b00), TimerAMode::Disabled);
        assert_eq!(TimerAMode::from(0b11), TimerAMode::Disabled);
        assert_eq!(TimerAMode::from(0b01), TimerAMode::Countdown);
        assert_eq!(TimerAMode::from(0b10), TimerAMode::Watchdog);
    }

    #[test]
    fn test_control1_conversions() {
        let control = Control1::from(0xA8);
        assert_eq!(control.capacitor(), OscillatorCapacitor::Pf12_5);
        assert!(control.stop());
        assert_eq!(control.time_representation(), TimeRepresentation::TwelveHour);
        assert!(!control.second_interrupt_enable());

        let mut control = Control1::default();
        control.set_time_representation(TimeRepresentation::TwelveHour);
        control.set_alarm_interrupt_enable(true);
        assert_eq!(u8::from(control), 0x0A);
    }

    #[test]
    fn test_offset_sign_extension() {
        let offset = Offset::from(0x40);
        assert_eq!(offset.offset(), -64);
        assert_eq!(offset.mode(), OffsetMode::EveryTwoHours);

        let offset = Offset::from(0xBF);
        assert_eq!(offset.offset(), 63);
        assert_eq!(offset.mode(), OffsetMode::EveryMinute);

        let offset = Offset::from(0xFF);
        assert_eq!(offset.offset(), -1);

        let mut offset = Offset::default();
        offset.set_offset(-10);
        offset.set_mode(OffsetMode::EveryMinute);
        assert_eq!(u8::from(offset), 0x80 | 0x76);
        assert_eq!(offset.offset(), -10);
    }

    #[test]
    fn test_timer_control_fields() {
        let control = TimerControl::from(0b1010_1011);
        assert_eq!(control.timer_a_interrupt_mode(), TimerInterruptMode::Pulsed);
        assert_eq!(control.timer_b_interrupt_mode(), TimerInterruptMode::Permanent);
        assert_eq!(control.clock_out(), ClockOutFrequency::Hz32);
        assert_eq!(control.timer_a_mode(), TimerAMode::Countdown);
        assert!(control.timer_b_enabled());
    }

    #[test]
    fn test_timer_b_frequency_control_fields_are_independent() {
        let mut control = TimerBFrequencyControl::default();
        control.set_pulse_width(TimerBPulseWidth::Ms218_750);
        control.set_source_frequency(TimerSourceFrequency::Hz1);
        assert_eq!(u8::from(control), 0x72);

        let control = TimerBFrequencyControl::from(0x41);
        assert_eq!(control.pulse_width(), TimerBPulseWidth::Ms125_000);
        assert_eq!(control.source_frequency(), TimerSourceFrequency::Hz64);
    }

    #[test]
    fn test_interrupt_source_positions() {
        assert_eq!(InterruptSource::Second.register(), RegAddr::Control1);
        assert_eq!(InterruptSource::Second.mask(), 0x04);
        assert_eq!(InterruptSource::CountdownTimerA.register(), RegAddr::Control2);
        assert_eq!(InterruptSource::CountdownTimerA.mask(), 0x02);
        assert_eq!(InterruptSource::BatteryLow.register(), RegAddr::Control3);
        assert_eq!(InterruptSource::BatteryLow.mask(), 0x01);
    }

    #[test]
    fn test_interrupt_flag_positions() {
        assert_eq!(InterruptFlag::WatchdogTimerA.mask(), 0x80);
        assert_eq!(InterruptFlag::Alarm.register(), RegAddr::Control2);
        assert_eq!(InterruptFlag::Alarm.mask(), 0x08);
        assert_eq!(InterruptFlag::BatterySwitchOver.register(), RegAddr::Control3);
        assert_eq!(InterruptFlag::BatterySwitchOver.mask(), 0x08);
        assert_eq!(InterruptFlag::BatteryLow.mask(), 0x04);
        assert!(InterruptFlag::BatteryLow.is_read_only());
        assert!(InterruptFlag::WatchdogTimerA.is_read_only());
        assert!(!InterruptFlag::Alarm.is_read_only());
    }

    #[test]
    fn test_hours_register_views() {
        let hours = Hours::from(0x23);
        assert_eq!(hours.bcd_24h(), 0x23);
        assert!(hours.pm());
        assert_eq!(hours.bcd_12h(), 0x03);

        let alarm = AlarmHours::from(0x92);
        assert!(alarm.disabled());
        assert_eq!(alarm.hour(), 0x12);
    }

    #[test]
    #[should_panic(expected = "Invalid value for TimeRepresentation: 2")]
    fn test_invalid_time_representation_conversion() {
        let _ = TimeRepresentation::from(2);
    }
}
