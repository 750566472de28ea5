//! Timer A and timer B durations.
//!
//! Each timer is a source clock register followed by an 8-bit count register.
//! Timer B's source register also carries the width of its interrupt pulse.

use core::time::Duration;

use crate::registers::{
    TimerAFrequencyControl, TimerBFrequencyControl, TimerBPulseWidth, TimerSourceFrequency,
    TIMER_CONTROL_TAM_MASK, TIMER_CONTROL_TBM_MASK,
};

/// One of the two countdown timers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timer {
    A,
    B,
}

impl Timer {
    /// Interrupt mode bit in the timer control register.
    #[must_use]
    pub const fn interrupt_mode_mask(self) -> u8 {
        match self {
            Timer::A => TIMER_CONTROL_TAM_MASK,
            Timer::B => TIMER_CONTROL_TBM_MASK,
        }
    }
}

impl TimerSourceFrequency {
    /// Time taken by `ticks` periods of this source clock.
    #[must_use]
    pub fn duration_of(self, ticks: u8) -> Duration {
        let ticks = u64::from(ticks);
        match self {
            TimerSourceFrequency::Hz4096 => Duration::from_nanos(ticks * 1_000_000_000 / 4096),
            TimerSourceFrequency::Hz64 => Duration::from_nanos(ticks * 15_625_000),
            TimerSourceFrequency::Hz1 => Duration::from_secs(ticks),
            TimerSourceFrequency::OnePerMinute => Duration::from_secs(ticks * 60),
            TimerSourceFrequency::OnePerHour => Duration::from_secs(ticks * 3600),
        }
    }
}

/// Timer A source clock and count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerAValue {
    pub source_frequency: TimerSourceFrequency,
    pub value: u8,
}

impl TimerAValue {
    pub(crate) fn from_registers(data: &[u8; 2]) -> Self {
        Self {
            source_frequency: TimerAFrequencyControl::from(data[0]).source_frequency(),
            value: data[1],
        }
    }

    pub(crate) fn to_registers(self) -> [u8; 2] {
        let mut control = TimerAFrequencyControl::default();
        control.set_source_frequency(self.source_frequency);
        [control.into(), self.value]
    }

    /// Period programmed into the timer.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.source_frequency.duration_of(self.value)
    }
}

/// Timer B source clock, interrupt pulse width and count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerBValue {
    pub source_frequency: TimerSourceFrequency,
    pub pulse_width: TimerBPulseWidth,
    pub value: u8,
}

impl TimerBValue {
    pub(crate) fn from_registers(data: &[u8; 2]) -> Self {
        let control = TimerBFrequencyControl::from(data[0]);
        Self {
            source_frequency: control.source_frequency(),
            pulse_width: control.pulse_width(),
            value: data[1],
        }
    }

    pub(crate) fn to_registers(self) -> [u8; 2] {
        let mut control = TimerBFrequencyControl::default();
        control.set_source_frequency(self.source_frequency);
        control.set_pulse_width(self.pulse_width);
        [control.into(), self.value]
    }

    /// Period programmed into the timer.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.source_frequency.duration_of(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_a_registers() {
        let timer = TimerAValue {
            source_frequency: TimerSourceFrequency::OnePerMinute,
            value: 5,
        };
        assert_eq!(timer.to_registers(), [0x03, 0x05]);
        assert_eq!(TimerAValue::from_registers(&[0x03, 0x05]), timer);
        // Upper bits of the source register are not part of the frequency.
        assert_eq!(
            TimerAValue::from_registers(&[0xF9, 0x05]).source_frequency,
            TimerSourceFrequency::Hz64
        );
    }

    #[test]
    fn test_timer_b_registers() {
        let timer = TimerBValue {
            source_frequency: TimerSourceFrequency::Hz64,
            pulse_width: TimerBPulseWidth::Ms125_000,
            value: 10,
        };
        assert_eq!(timer.to_registers(), [0x41, 0x0A]);
        assert_eq!(TimerBValue::from_registers(&[0x41, 0x0A]), timer);
    }

    #[test]
    fn test_timer_b_alias_decodes_to_one_per_hour() {
        let timer = TimerBValue::from_registers(&[0x77, 0x01]);
        assert_eq!(timer.source_frequency, TimerSourceFrequency::OnePerHour);
        assert_eq!(timer.pulse_width, TimerBPulseWidth::Ms218_750);
    }

    #[test]
    fn test_durations() {
        assert_eq!(
            TimerSourceFrequency::Hz64.duration_of(10),
            Duration::from_micros(156_250)
        );
        assert_eq!(
            TimerSourceFrequency::Hz4096.duration_of(64),
            Duration::from_nanos(15_625_000)
        );
        let timer = TimerAValue {
            source_frequency: TimerSourceFrequency::OnePerHour,
            value: 2,
        };
        assert_eq!(timer.duration(), Duration::from_secs(7200));
    }

    #[test]
    fn test_interrupt_mode_masks() {
        assert_eq!(Timer::A.interrupt_mode_mask(), 0x80);
        assert_eq!(Timer::B.interrupt_mode_mask(), 0x40);
    }
}
