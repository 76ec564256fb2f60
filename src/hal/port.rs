//! Whole-port peripherals: the LCD data bus and the keypad matrix.

use avr_device::atmega128a::{PORTB, PORTC};

use crate::drivers::keypad::{KeyMatrix, COLUMNS_IDLE};
use crate::drivers::lcd::DataPort;
use crate::error::Error;

/// LCD D0..D7 on PB0..PB7
pub struct LcdDataPort {
    port: PORTB,
}

impl LcdDataPort {
    pub fn new(port: PORTB) -> Self {
        unsafe {
            port.ddrb.write(|w| w.bits(0xFF));
        }
        Self { port }
    }
}

impl DataPort for LcdDataPort {
    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        unsafe {
            self.port.portb.write(|w| w.bits(byte));
        }
        Ok(())
    }
}

/// Keypad rows on PC4..PC7 (outputs), columns on PC0..PC3 (inputs with
/// pull-ups).
pub struct KeypadPort {
    port: PORTC,
}

impl KeypadPort {
    pub fn new(port: PORTC) -> Self {
        unsafe {
            port.ddrc.write(|w| w.bits(0xF0));
            port.portc.write(|w| w.bits(0xFF));
        }
        Self { port }
    }
}

impl KeyMatrix for KeypadPort {
    fn drive_rows(&mut self, pattern: u8) -> Result<(), Error> {
        unsafe {
            self.port.portc.write(|w| w.bits((pattern << 4) | COLUMNS_IDLE));
        }
        // Let the input synchronizer catch up
        avr_device::asm::nop();
        Ok(())
    }

    fn read_columns(&mut self) -> Result<u8, Error> {
        Ok(self.port.pinc.read().bits() & COLUMNS_IDLE)
    }
}
