//! Error type shared by the drivers and the measurement loop

/// Failures the firmware can report.
///
/// Only [`Error::InvalidRange`] is part of normal operation. Display
/// overflow and similar anomalies degrade silently instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Range selector outside 1..=3
    InvalidRange(u8),
    /// ADC did not finish within the configured poll limit
    ConversionTimeout,
    /// A GPIO implementation reported a failure
    Pin,
}

impl ufmt::uDisplay for Error {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        match self {
            Error::InvalidRange(_) => f.write_str("Invalid range"),
            Error::ConversionTimeout => f.write_str("ADC timeout"),
            Error::Pin => f.write_str("Pin fault"),
        }
    }
}
