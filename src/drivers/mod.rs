pub mod keypad;
pub mod lcd;
pub mod range;

pub use keypad::{key_at, KeyEvent, KeyMatrix, KeySource, Keypad, PinMatrix, ScanState};
pub use lcd::{CursorPosition, DataPort, Lcd, LcdBus, ParallelBus, Register};
pub use range::{Mode, Range, RangeSelector, ScaleFactor, Selector};

use embedded_hal::digital::v2::OutputPin;

use crate::error::Error;

/// Drive `pin` to the given level
pub(crate) fn set_level<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), Error> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| Error::Pin)
}
