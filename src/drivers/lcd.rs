//! HD44780-compatible 2x16 character display on an 8-bit parallel bus.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use super::set_level;
use crate::config::{LCD_COLUMNS, LCD_INIT_SETTLE_MS, LCD_ROWS, LCD_SETTLE_MS};
use crate::error::Error;
use crate::format::Field;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Clear = 0x01,
    ReturnHome = 0x02,
    EntryModeIncrement = 0x06,
    DisplayOnCursorOff = 0x0C,
    FunctionSet8Bit2Line = 0x38,
    SetDdramAddress = 0x80,
}

const ROW_BASE: [u8; LCD_ROWS as usize] = [0x00, 0x40];

/// Target of a bus write, selected by the RS line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Register {
    Command,
    Data,
}

/// Strobes bytes into the display controller.
///
/// Implementations must hold the bus idle for the controller's settle
/// time after every write, so callers never have to insert delays between
/// consecutive operations.
pub trait LcdBus {
    fn write(&mut self, register: Register, byte: u8) -> Result<(), Error>;
    /// Additional wait, used during initialization
    fn pause(&mut self, ms: u16);
}

/// Eight data lines driven as one byte.
pub trait DataPort {
    fn write_byte(&mut self, byte: u8) -> Result<(), Error>;
}

impl<P: OutputPin> DataPort for [P; 8] {
    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        for (bit, pin) in self.iter_mut().enumerate() {
            set_level(pin, byte & (1 << bit) != 0)?;
        }
        Ok(())
    }
}

/// [`LcdBus`] over a data port plus RS, RW and EN control lines.
pub struct ParallelBus<D, RS, RW, EN, DL> {
    data: D,
    rs: RS,
    rw: RW,
    en: EN,
    delay: DL,
}

impl<D, RS, RW, EN, DL> ParallelBus<D, RS, RW, EN, DL>
where
    D: DataPort,
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    DL: DelayMs<u16>,
{
    pub fn new(data: D, rs: RS, rw: RW, en: EN, delay: DL) -> Self {
        Self {
            data,
            rs,
            rw,
            en,
            delay,
        }
    }

    pub fn release(self) -> (D, RS, RW, EN, DL) {
        (self.data, self.rs, self.rw, self.en, self.delay)
    }
}

impl<D, RS, RW, EN, DL> LcdBus for ParallelBus<D, RS, RW, EN, DL>
where
    D: DataPort,
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    DL: DelayMs<u16>,
{
    fn write(&mut self, register: Register, byte: u8) -> Result<(), Error> {
        self.data.write_byte(byte)?;

        set_level(&mut self.rs, register == Register::Data)?;
        self.rw.set_low().map_err(|_| Error::Pin)?;

        // Latch on the falling edge of EN
        self.en.set_high().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(LCD_SETTLE_MS);
        self.en.set_low().map_err(|_| Error::Pin)?;
        self.delay.delay_ms(LCD_SETTLE_MS);
        Ok(())
    }

    fn pause(&mut self, ms: u16) {
        self.delay.delay_ms(ms);
    }
}

/// Position on the 2x16 character grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorPosition {
    row: u8,
    column: u8,
}

impl CursorPosition {
    pub const HOME: CursorPosition = CursorPosition { row: 0, column: 0 };

    /// `None` unless `row < 2` and `column < 16`
    pub fn new(row: u8, column: u8) -> Option<Self> {
        if row < LCD_ROWS && column < LCD_COLUMNS {
            Some(Self { row, column })
        } else {
            None
        }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    /// Set-DDRAM-address command byte for this position
    pub fn address(&self) -> u8 {
        Command::SetDdramAddress as u8 | (ROW_BASE[self.row as usize] + self.column)
    }
}

pub struct Lcd<B> {
    bus: B,
}

impl<B: LcdBus> Lcd<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// 8-bit mode with two lines, cleared, cursor home, display on.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.command(Command::FunctionSet8Bit2Line)?;
        self.command(Command::Clear)?;
        self.command(Command::ReturnHome)?;
        self.command(Command::EntryModeIncrement)?;
        self.move_to(CursorPosition::HOME)?;
        self.bus.pause(LCD_INIT_SETTLE_MS);
        self.command(Command::DisplayOnCursorOff)?;
        self.bus.pause(LCD_INIT_SETTLE_MS);
        Ok(())
    }

    pub fn command(&mut self, command: Command) -> Result<(), Error> {
        self.bus.write(Register::Command, command as u8)
    }

    /// Clear and put the cursor at the top left
    pub fn clear(&mut self) -> Result<(), Error> {
        self.command(Command::Clear)?;
        self.command(Command::ReturnHome)?;
        self.move_to(CursorPosition::HOME)
    }

    /// Positions outside the grid are ignored without touching the bus.
    pub fn set_cursor(&mut self, row: u8, column: u8) -> Result<(), Error> {
        match CursorPosition::new(row, column) {
            Some(position) => self.move_to(position),
            None => {
                trace!("cursor ({}, {}) off screen, ignored", row, column);
                Ok(())
            }
        }
    }

    pub fn move_to(&mut self, position: CursorPosition) -> Result<(), Error> {
        self.bus.write(Register::Command, position.address())
    }

    pub fn write_char(&mut self, byte: u8) -> Result<(), Error> {
        self.bus.write(Register::Data, byte)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        bytes.iter().try_for_each(|&byte| self.write_char(byte))
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), Error> {
        self.write_bytes(s.as_bytes())
    }

    /// Writes exactly `width` characters, see [`Field::integer`].
    pub fn print_integer(&mut self, value: u32, width: u8) -> Result<(), Error> {
        self.write_bytes(Field::integer(value, width).as_bytes())
    }

    /// Writes exactly `width` characters, see [`Field::float`].
    pub fn print_float(&mut self, value: f32, width: u8) -> Result<(), Error> {
        self.write_bytes(Field::float(value, width).as_bytes())
    }
}

impl<B: LcdBus> ufmt::uWrite for Lcd<B> {
    type Error = Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        Lcd::write_str(self, s)
    }
}
