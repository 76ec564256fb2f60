//! 4x4 matrix keypad.
//!
//! Rows are driven low one at a time, columns are active-low inputs with
//! pull-ups. A press is confirmed after the debounce delay, the first row
//! that pulls a column low wins, and the keypad then waits for every key to
//! be released before it reports another press.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use super::set_level;
use crate::config::KEY_DEBOUNCE_MS;
use crate::error::Error;

/// Column bits read back when no key is down
pub const COLUMNS_IDLE: u8 = 0x0F;

/// Row drive pattern with every row pulled low
pub const ALL_ROWS: u8 = 0x00;

pub const KEY_MAP: [[u8; 4]; 4] = [
    *b"789/",
    *b"456*",
    *b"123-",
    *b" 0=+",
];

/// One debounced key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent(u8);

impl KeyEvent {
    pub fn symbol(&self) -> char {
        self.0 as char
    }

    /// Value of a digit key
    pub fn digit(&self) -> Option<u8> {
        self.symbol().to_digit(10).map(|d| d as u8)
    }
}

impl PartialEq<char> for KeyEvent {
    fn eq(&self, other: &char) -> bool {
        self.symbol() == *other
    }
}

/// Decode a row index and the 4-bit column reading of that row.
///
/// 1110 is column 0, 1101 column 1, 1011 column 2 and every other
/// pattern column 3.
pub fn key_at(row: usize, columns: u8) -> KeyEvent {
    let column = match columns & COLUMNS_IDLE {
        0x0E => 0,
        0x0D => 1,
        0x0B => 2,
        _ => 3,
    };
    KeyEvent(KEY_MAP[row & 0x03][column])
}

/// Electrical access to the matrix.
pub trait KeyMatrix {
    /// Drive the rows. Bit `n` low pulls row `n` low.
    fn drive_rows(&mut self, pattern: u8) -> Result<(), Error>;
    /// Column levels in the low nibble, a pressed key reads as 0.
    fn read_columns(&mut self) -> Result<u8, Error>;
}

/// [`KeyMatrix`] on four row outputs and four column inputs.
pub struct PinMatrix<R, C> {
    rows: [R; 4],
    columns: [C; 4],
}

impl<R: OutputPin, C: InputPin> PinMatrix<R, C> {
    pub fn new(rows: [R; 4], columns: [C; 4]) -> Self {
        Self { rows, columns }
    }

    pub fn release(self) -> ([R; 4], [C; 4]) {
        (self.rows, self.columns)
    }
}

impl<R: OutputPin, C: InputPin> KeyMatrix for PinMatrix<R, C> {
    fn drive_rows(&mut self, pattern: u8) -> Result<(), Error> {
        for (n, row) in self.rows.iter_mut().enumerate() {
            set_level(row, pattern & (1 << n) != 0)?;
        }
        Ok(())
    }

    fn read_columns(&mut self) -> Result<u8, Error> {
        let mut bits = 0;
        for (n, column) in self.columns.iter().enumerate() {
            if column.is_high().map_err(|_| Error::Pin)? {
                bits |= 1 << n;
            }
        }
        Ok(bits)
    }
}

/// Scanner state between two polls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanState {
    /// No key down
    Idle,
    /// A column went low, waiting out contact bounce
    DebouncePress,
    /// Press confirmed, looking for its row
    RowScan,
    /// Press reported, waiting for all keys up
    ReleaseWait,
}

/// Anything the measurement loop can take key presses from.
pub trait KeySource {
    /// Returns the next press, or `None` if there is none right now.
    fn poll_key(&mut self) -> Result<Option<KeyEvent>, Error>;

    /// Poll until a key is pressed. Never times out.
    fn wait_for_key(&mut self) -> Result<KeyEvent, Error> {
        loop {
            if let Some(key) = self.poll_key()? {
                return Ok(key);
            }
        }
    }
}

pub struct Keypad<M, D> {
    matrix: M,
    delay: D,
    state: ScanState,
}

impl<M, D> Keypad<M, D>
where
    M: KeyMatrix,
    D: DelayMs<u16>,
{
    pub fn new(matrix: M, delay: D) -> Self {
        Self {
            matrix,
            delay,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn release(self) -> (M, D) {
        (self.matrix, self.delay)
    }

    fn any_column_low(&mut self) -> Result<bool, Error> {
        self.matrix.drive_rows(ALL_ROWS)?;
        Ok(self.matrix.read_columns()? & COLUMNS_IDLE != COLUMNS_IDLE)
    }

    /// Drive each row low in turn; the lowest row with a low column wins.
    fn scan_rows(&mut self) -> Result<Option<KeyEvent>, Error> {
        for row in 0..4 {
            self.matrix.drive_rows(!(1u8 << row) & COLUMNS_IDLE)?;
            let columns = self.matrix.read_columns()? & COLUMNS_IDLE;
            if columns != COLUMNS_IDLE {
                return Ok(Some(key_at(row, columns)));
            }
        }
        Ok(None)
    }
}

impl<M, D> KeySource for Keypad<M, D>
where
    M: KeyMatrix,
    D: DelayMs<u16>,
{
    fn poll_key(&mut self) -> Result<Option<KeyEvent>, Error> {
        loop {
            match self.state {
                ScanState::ReleaseWait => {
                    if self.any_column_low()? {
                        return Ok(None);
                    }
                    self.state = ScanState::Idle;
                }
                ScanState::Idle => {
                    if !self.any_column_low()? {
                        return Ok(None);
                    }
                    self.state = ScanState::DebouncePress;
                }
                ScanState::DebouncePress => {
                    self.delay.delay_ms(KEY_DEBOUNCE_MS);
                    self.state = if self.any_column_low()? {
                        ScanState::RowScan
                    } else {
                        ScanState::Idle
                    };
                    if self.state == ScanState::Idle {
                        return Ok(None);
                    }
                }
                ScanState::RowScan => {
                    let key = self.scan_rows()?;
                    self.matrix.drive_rows(ALL_ROWS)?;
                    return Ok(match key {
                        Some(key) => {
                            debug!("key {}", key);
                            self.state = ScanState::ReleaseWait;
                            Some(key)
                        }
                        None => {
                            // Released between the debounce check and the scan
                            self.state = ScanState::Idle;
                            None
                        }
                    });
                }
            }
        }
    }
}
