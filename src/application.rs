//! Measurement loop and operator menu.
//!
//! A session configures the relays once, then samples, scales and renders
//! the current until the exit key is pressed. Everything runs on one
//! polling loop; the ADC, the display bus and the keypad rows are only ever
//! driven from here.

use core::convert::TryFrom;

use ufmt::uwrite;

use crate::config::{
    EXIT_HINT, EXIT_HINT_COLUMN, EXIT_KEY, MEASURE_CHANNEL, VALUE_FIELD_WIDTH, VALUE_LABEL,
};
use crate::drivers::{KeySource, Lcd, LcdBus, Mode, Range, ScaleFactor, Selector};
use crate::error::Error;
use crate::hal::{AdcRegisters, AnalogReader};

const VALUE_ROW: u8 = 1;
const RANGE_PROMPT: &str = "Range 1:5m 2:50m";
const RANGE_PROMPT_2: &str = "3:4A";
const MODE_PROMPT: &str = "Mode 1:DC 2:AC";

/// Operator choice from the menu. The range digit is not validated yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionRequest {
    pub range: u8,
    pub mode: Mode,
}

pub struct Ammeter<R, S, L, K> {
    adc: AnalogReader<R>,
    selector: S,
    lcd: Lcd<L>,
    keys: K,
}

impl<R, S, L, K> Ammeter<R, S, L, K>
where
    R: AdcRegisters,
    S: Selector,
    L: LcdBus,
    K: KeySource,
{
    pub fn new(adc: AnalogReader<R>, selector: S, lcd: Lcd<L>, keys: K) -> Self {
        Self {
            adc,
            selector,
            lcd,
            keys,
        }
    }

    pub fn release(self) -> (AnalogReader<R>, S, Lcd<L>, K) {
        (self.adc, self.selector, self.lcd, self.keys)
    }

    /// Run one measurement session until the exit key.
    ///
    /// `range` is the operator's selector digit; anything outside 1..=3 is
    /// rejected after the display has been set up and before any relay
    /// line is touched.
    pub fn run_session(&mut self, range: u8, mode: Mode) -> Result<(), Error> {
        self.lcd.initialize()?;
        self.adc.initialize();
        self.render_labels()?;

        let range = Range::try_from(range).map_err(|error| {
            warn!("rejected range selector {}", range);
            error
        })?;
        info!("session start: {} {}", range, mode);

        self.selector.configure_mode(mode)?;
        self.selector.configure_outputs(range)?;
        let factor = self.selector.scale_factor_for(range);

        loop {
            self.measure_once(factor)?;

            if let Some(key) = self.keys.poll_key()? {
                if key == EXIT_KEY {
                    break;
                }
            }
        }

        info!("session end");
        Ok(())
    }

    /// Sample, scale and render one reading on the value row.
    pub fn measure_once(&mut self, factor: ScaleFactor) -> Result<f32, Error> {
        self.lcd.set_cursor(VALUE_ROW, 0)?;
        let sample = self.adc.read(MEASURE_CHANNEL)?;
        let value = sample as f32 * factor;
        self.lcd.print_float(value, VALUE_FIELD_WIDTH)?;
        Ok(value)
    }

    /// Ask for a range digit, then a mode digit. Other keys are ignored.
    pub fn select_session(&mut self) -> Result<SessionRequest, Error> {
        self.lcd.clear()?;
        self.lcd.write_str(RANGE_PROMPT)?;
        self.lcd.set_cursor(1, 0)?;
        self.lcd.write_str(RANGE_PROMPT_2)?;
        let range = self.wait_for_digit()?;

        self.lcd.clear()?;
        self.lcd.write_str(MODE_PROMPT)?;
        let mode = Mode::from_selector(self.wait_for_digit()?);

        debug!("selected range {} mode {}", range, mode);
        Ok(SessionRequest { range, mode })
    }

    /// Put a short description of `error` on the value row.
    pub fn show_error(&mut self, error: Error) -> Result<(), Error> {
        self.lcd.set_cursor(VALUE_ROW, 0)?;
        uwrite!(self.lcd, "{}", error)
    }

    fn render_labels(&mut self) -> Result<(), Error> {
        self.lcd.set_cursor(0, 0)?;
        self.lcd.write_str(VALUE_LABEL)?;
        self.lcd.set_cursor(VALUE_ROW, EXIT_HINT_COLUMN)?;
        self.lcd.write_str(EXIT_HINT)
    }

    fn wait_for_digit(&mut self) -> Result<u8, Error> {
        loop {
            if let Some(digit) = self.keys.wait_for_key()?.digit() {
                return Ok(digit);
            }
        }
    }
}
