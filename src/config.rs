//! Configuration constants for the ammeter firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// Number of codes of the 10-bit converter
pub const ADC_FULL_SCALE: u16 = 1024;

/// Analog line carrying the shunt voltage
pub const MEASURE_CHANNEL: crate::hal::AdcChannel = crate::hal::AdcChannel::Adc0;

/// LCD geometry
pub const LCD_ROWS: u8 = 2;
pub const LCD_COLUMNS: u8 = 16;

/// Settle time after every LCD command or data strobe, in milliseconds
pub const LCD_SETTLE_MS: u16 = 1;

/// Extra settle time after the display-on step of initialization
pub const LCD_INIT_SETTLE_MS: u16 = 10;

/// Keypad debounce time in milliseconds
pub const KEY_DEBOUNCE_MS: u16 = 20;

/// Width of the readout field on the value row
pub const VALUE_FIELD_WIDTH: u8 = 6;

/// Decimals printed for floating point readouts
pub const FLOAT_DECIMALS: u8 = 3;

/// Key that ends a measurement session
pub const EXIT_KEY: char = '9';

/// Static labels of the measurement screen
pub const VALUE_LABEL: &str = "Current value : ";
pub const EXIT_HINT: &str = "9->";
pub const EXIT_HINT_COLUMN: u8 = 13;

/// How long an error message stays on screen before the menu returns
pub const ERROR_HOLD_MS: u16 = 1000;
