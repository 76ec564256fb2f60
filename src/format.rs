//! Fixed-width readout fields.
//!
//! A field is exactly `width` characters wide. The number is formatted
//! left-aligned into a space-filled buffer, characters past the field are
//! dropped and every character that is not a digit (or the decimal point,
//! for floats) is replaced by a space. Overflow is therefore silent: a value
//! too wide for the field loses its trailing characters and a sign turns
//! into a blank.

use core::convert::Infallible;

use ufmt::{uWrite, uwrite};

use crate::config::{FLOAT_DECIMALS, LCD_COLUMNS};

/// Widest field the display can show
pub const MAX_FIELD_WIDTH: usize = LCD_COLUMNS as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    buf: [u8; MAX_FIELD_WIDTH],
    width: usize,
}

impl Field {
    fn blank(width: u8) -> Self {
        Self {
            buf: [b' '; MAX_FIELD_WIDTH],
            width: (width as usize).min(MAX_FIELD_WIDTH),
        }
    }

    /// Unsigned decimal, digits only
    pub fn integer(value: u32, width: u8) -> Self {
        let mut field = Self::blank(width);
        let mut writer = FieldWriter::new(&mut field.buf[..field.width]);
        uwrite!(writer, "{}", value).ok();
        field.keep_only(false);
        field
    }

    /// `%4.3f`-style decimal, digits and the decimal point only
    pub fn float(value: f32, width: u8) -> Self {
        let mut field = Self::blank(width);
        let mut writer = FieldWriter::new(&mut field.buf[..field.width]);
        write_fixed_point(&mut writer, value, FLOAT_DECIMALS).ok();
        field.keep_only(true);
        field
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.width]
    }

    pub fn len(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    fn keep_only(&mut self, allow_point: bool) {
        for byte in self.buf[..self.width].iter_mut() {
            let keep = byte.is_ascii_digit() || (allow_point && *byte == b'.');
            if !keep {
                *byte = b' ';
            }
        }
    }
}

/// Writes into a fixed slice and drops whatever does not fit.
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl uWrite for FieldWriter<'_> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            if let Some(slot) = self.buf.get_mut(self.pos) {
                *slot = byte;
            }
            self.pos = self.pos.saturating_add(1);
        }
        Ok(())
    }
}

/// Sign, integer part, point and `decimals` digits rounded half up.
/// Magnitudes beyond `u32::MAX / 10^decimals` saturate.
fn write_fixed_point<W>(w: &mut W, value: f32, decimals: u8) -> Result<(), W::Error>
where
    W: uWrite + ?Sized,
{
    if value.is_nan() {
        return w.write_str("nan");
    }
    if value < 0.0 {
        w.write_char('-')?;
    }
    if value.is_infinite() {
        return w.write_str("inf");
    }

    let magnitude = if value < 0.0 { -value } else { value };
    let scale = 10u32.pow(decimals as u32);
    let scaled = (magnitude * scale as f32 + 0.5) as u32;

    uwrite!(w, "{}", scaled / scale)?;
    if decimals == 0 {
        return Ok(());
    }

    w.write_char('.')?;
    let frac = scaled % scale;
    let mut divisor = scale / 10;
    while divisor > 0 {
        let digit = (frac / divisor % 10) as u8;
        w.write_char((b'0' + digit) as char)?;
        divisor /= 10;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(field: &Field) -> &str {
        core::str::from_utf8(field.as_bytes()).unwrap()
    }

    #[test]
    fn float_fills_exactly_the_field() {
        let field = Field::float(3.14159, 6);
        assert_eq!(field.len(), 6);
        assert_eq!(text(&field), "3.142 ");
        assert!(field
            .as_bytes()
            .iter()
            .all(|b| b.is_ascii_digit() || *b == b'.' || *b == b' '));
    }

    #[test]
    fn float_drops_characters_past_the_field() {
        assert_eq!(text(&Field::float(1234.5678, 6)), "1234.5");
        assert_eq!(text(&Field::float(3.99609375, 3)), "3.9");
    }

    #[test]
    fn float_blanks_sign_and_non_numbers() {
        assert_eq!(text(&Field::float(-1.5, 6)), " 1.500");
        assert_eq!(text(&Field::float(f32::NAN, 6)), "      ");
        assert_eq!(text(&Field::float(f32::INFINITY, 6)), "      ");
    }

    #[test]
    fn float_shows_milliamp_readings() {
        // 1000 counts on the 5mA range
        assert_eq!(text(&Field::float(1000.0 * 0.005 / 1024.0, 6)), "0.005 ");
        assert_eq!(text(&Field::float(0.0, 6)), "0.000 ");
    }

    #[test]
    fn integer_pads_with_spaces_and_truncates() {
        assert_eq!(text(&Field::integer(42, 5)), "42   ");
        assert_eq!(text(&Field::integer(1234567, 4)), "1234");
        assert_eq!(text(&Field::integer(0, 1)), "0");
    }

    #[test]
    fn width_is_clamped_to_the_display() {
        assert_eq!(Field::integer(7, 40).len(), MAX_FIELD_WIDTH);
        assert!(Field::float(1.0, 0).is_empty());
    }
}
