use core::convert::Infallible;

use crate::error::Error;

/// Raw 10-bit conversion result (0..=1023)
pub type Sample = u16;

const SAMPLE_MASK: u16 = 0x03FF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcChannel {
    Adc0 = 0,
    Adc1 = 1,
    Adc2 = 2,
    Adc3 = 3,
    Adc4 = 4,
    Adc5 = 5,
    Adc6 = 6,
    Adc7 = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AdcReference {
    Avcc = 1, // AVCC with external cap at AREF
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AdcPrescaler {
    Div128 = 7,
}

/// Register-level access to a successive-approximation converter.
///
/// Implemented by the ATmega128 [`Adc`] and by test doubles.
pub trait AdcRegisters {
    /// Select reference and clock prescaler and enable the converter.
    fn configure(&mut self, reference: AdcReference, prescaler: AdcPrescaler);
    /// Route `channel` to the converter and start a single conversion.
    fn start_conversion(&mut self, channel: AdcChannel);
    /// `true` once the conversion started last has finished.
    fn conversion_complete(&mut self) -> bool;
    /// Result of the last finished conversion.
    fn result(&mut self) -> u16;
}

/// Blocking single-conversion reader on top of [`AdcRegisters`].
///
/// Not reentrant: a conversion in flight owns the channel multiplexer until
/// it has been collected.
pub struct AnalogReader<R> {
    regs: R,
    pending: Option<AdcChannel>,
    poll_limit: Option<u32>,
}

impl<R: AdcRegisters> AnalogReader<R> {
    pub fn new(regs: R) -> Self {
        Self {
            regs,
            pending: None,
            poll_limit: None,
        }
    }

    /// Give up with [`Error::ConversionTimeout`] after `limit` unsuccessful
    /// completion polls. Without a limit `read` waits forever.
    pub fn with_poll_limit(mut self, limit: u32) -> Self {
        self.poll_limit = Some(limit);
        self
    }

    /// Reference = AVCC, 16MHz / 128 = 125kHz conversion clock
    pub fn initialize(&mut self) {
        self.regs.configure(AdcReference::Avcc, AdcPrescaler::Div128);
        self.pending = None;
    }

    /// One non-blocking step of a conversion on `channel`.
    ///
    /// Starts a conversion unless one is already running for this channel.
    pub fn poll(&mut self, channel: AdcChannel) -> nb::Result<Sample, Infallible> {
        if self.pending != Some(channel) {
            self.regs.start_conversion(channel);
            self.pending = Some(channel);
        }

        if !self.regs.conversion_complete() {
            return Err(nb::Error::WouldBlock);
        }

        self.pending = None;
        Ok(self.regs.result() & SAMPLE_MASK)
    }

    /// Convert `channel` and busy-wait for the result.
    pub fn read(&mut self, channel: AdcChannel) -> Result<Sample, Error> {
        let mut polls: u32 = 0;
        loop {
            match self.poll(channel) {
                Ok(sample) => return Ok(sample),
                Err(nb::Error::WouldBlock) => {}
                Err(nb::Error::Other(never)) => match never {},
            }

            polls = polls.saturating_add(1);
            if let Some(limit) = self.poll_limit {
                if polls >= limit {
                    warn!("ADC conversion did not complete after {} polls", polls);
                    self.pending = None;
                    return Err(Error::ConversionTimeout);
                }
            }
        }
    }

    pub fn release(self) -> R {
        self.regs
    }
}

#[cfg(target_arch = "avr")]
pub use self::avr::Adc;

#[cfg(target_arch = "avr")]
mod avr {
    use super::*;
    use avr_device::atmega128a::ADC;

    const ADEN: u8 = 0x80;
    const ADSC: u8 = 0x40;

    pub struct Adc {
        _private: (),
    }

    impl Adc {
        pub fn new(_adc: ADC) -> Self {
            Self { _private: () }
        }
    }

    impl AdcRegisters for Adc {
        fn configure(&mut self, reference: AdcReference, prescaler: AdcPrescaler) {
            unsafe {
                let p = ADC::ptr();
                (*p).admux.write(|w| w.bits((reference as u8) << 6));
                (*p).adcsra.write(|w| w.bits(ADEN | prescaler as u8));
            }
        }

        fn start_conversion(&mut self, channel: AdcChannel) {
            unsafe {
                let p = ADC::ptr();

                // Clear older channel, keep reference bits
                (*p).admux.modify(|r, w| {
                    w.bits((r.bits() & 0xE0) | (channel as u8))
                });

                // Start a single conversion
                (*p).adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
            }
        }

        fn conversion_complete(&mut self) -> bool {
            unsafe { (*ADC::ptr()).adcsra.read().bits() & ADSC == 0 }
        }

        fn result(&mut self) -> u16 {
            unsafe {
                let p = ADC::ptr();
                // ADCL must be read first
                let low = (*p).adcl.read().bits() as u16;
                let high = (*p).adch.read().bits() as u16;
                (high << 8) | low
            }
        }
    }
}
