//! Shunt range and coupling mode selection.
//!
//! The relay board is driven by three lines: two select the shunt
//! (1K, 100R or 1R) and one selects DC or AC coupling.

use core::convert::TryFrom;

use embedded_hal::digital::v2::OutputPin;

use super::set_level;
use crate::config::ADC_FULL_SCALE;
use crate::error::Error;

/// Multiplier from a raw sample to amps
pub type ScaleFactor = f32;

/// Shunt selection. Discriminants are the operator-facing selector digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Range {
    /// 1K shunt, 0 to 5 mA
    Low = 1,
    /// 100R shunt, 0 to 50 mA
    Mid = 2,
    /// 1R shunt, 0 to 4 A
    High = 3,
}

impl Range {
    /// Current at a full-scale reading
    pub const fn full_scale_amps(self) -> f32 {
        match self {
            Range::Low => 0.005,
            Range::Mid => 0.05,
            Range::High => 4.0,
        }
    }

    pub const fn shunt_ohms(self) -> u16 {
        match self {
            Range::Low => 1000,
            Range::Mid => 100,
            Range::High => 1,
        }
    }

    /// A raw sample of 1024 maps to the full-scale current.
    pub fn scale_factor(self) -> ScaleFactor {
        self.full_scale_amps() / ADC_FULL_SCALE as f32
    }

    /// Levels of (line A, line B). MID and HIGH share line A, the pattern
    /// is 00 / 10 / 11 and not a Gray code.
    pub const fn selector_lines(self) -> (bool, bool) {
        match self {
            Range::Low => (false, false),
            Range::Mid => (true, false),
            Range::High => (true, true),
        }
    }
}

impl TryFrom<u8> for Range {
    type Error = Error;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(Range::Low),
            2 => Ok(Range::Mid),
            3 => Ok(Range::High),
            other => Err(Error::InvalidRange(other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    Dc = 1,
    Ac = 2,
}

impl Mode {
    /// 1 selects DC, every other selector AC
    pub const fn from_selector(selector: u8) -> Self {
        if selector == 1 {
            Mode::Dc
        } else {
            Mode::Ac
        }
    }

    /// Level of the coupling relay line
    pub const fn selector_line(self) -> bool {
        matches!(self, Mode::Ac)
    }
}

/// Drives the relay selector outputs.
pub trait Selector {
    fn configure_outputs(&mut self, range: Range) -> Result<(), Error>;
    fn configure_mode(&mut self, mode: Mode) -> Result<(), Error>;

    fn scale_factor_for(&self, range: Range) -> ScaleFactor {
        range.scale_factor()
    }
}

/// [`Selector`] on three GPIO outputs.
pub struct RangeSelector<A, B, M> {
    line_a: A,
    line_b: B,
    mode: M,
}

impl<A, B, M> RangeSelector<A, B, M>
where
    A: OutputPin,
    B: OutputPin,
    M: OutputPin,
{
    pub fn new(line_a: A, line_b: B, mode: M) -> Self {
        Self {
            line_a,
            line_b,
            mode,
        }
    }

    pub fn release(self) -> (A, B, M) {
        (self.line_a, self.line_b, self.mode)
    }
}

impl<A, B, M> Selector for RangeSelector<A, B, M>
where
    A: OutputPin,
    B: OutputPin,
    M: OutputPin,
{
    fn configure_outputs(&mut self, range: Range) -> Result<(), Error> {
        let (a, b) = range.selector_lines();
        set_level(&mut self.line_a, a)?;
        set_level(&mut self.line_b, b)
    }

    fn configure_mode(&mut self, mode: Mode) -> Result<(), Error> {
        set_level(&mut self.mode, mode.selector_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};

    #[test]
    fn scale_factor_maps_full_scale_sample_to_full_scale_current() {
        assert_eq!(Range::Low.scale_factor() * 1024.0, 0.005);
        assert_eq!(Range::Mid.scale_factor() * 1024.0, 0.05);
        assert_eq!(Range::High.scale_factor() * 1024.0, 4.0);
    }

    #[test]
    fn selector_digits_outside_one_to_three_are_rejected() {
        assert_eq!(Range::try_from(1), Ok(Range::Low));
        assert_eq!(Range::try_from(2), Ok(Range::Mid));
        assert_eq!(Range::try_from(3), Ok(Range::High));
        for bad in [0u8, 4, 9, 255] {
            assert_eq!(Range::try_from(bad), Err(Error::InvalidRange(bad)));
        }
    }

    #[test]
    fn mode_selector_treats_everything_but_one_as_ac() {
        assert_eq!(Mode::from_selector(1), Mode::Dc);
        assert_eq!(Mode::from_selector(2), Mode::Ac);
        assert_eq!(Mode::from_selector(0), Mode::Ac);
    }

    fn expect_outputs(range: Range, a: State, b: State) {
        let mut line_a = PinMock::new(&[PinTransaction::set(a)]);
        let mut line_b = PinMock::new(&[PinTransaction::set(b)]);
        let mut mode = PinMock::new(&[]);

        let mut selector = RangeSelector::new(line_a.clone(), line_b.clone(), mode.clone());
        selector.configure_outputs(range).unwrap();

        line_a.done();
        line_b.done();
        mode.done();
    }

    #[test]
    fn range_encoding_is_00_10_11() {
        expect_outputs(Range::Low, State::Low, State::Low);
        expect_outputs(Range::Mid, State::High, State::Low);
        expect_outputs(Range::High, State::High, State::High);
    }

    #[test]
    fn mode_line_is_low_for_dc_and_high_for_ac() {
        let mut mode = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut line_a = PinMock::new(&[]);
        let mut line_b = PinMock::new(&[]);
        let mut selector = RangeSelector::new(line_a.clone(), line_b.clone(), mode.clone());

        selector.configure_mode(Mode::Dc).unwrap();
        selector.configure_mode(Mode::Ac).unwrap();

        line_a.done();
        line_b.done();
        mode.done();
    }
}
