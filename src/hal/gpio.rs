use avr_device::atmega128a::{PORTA, PORTD};
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub trait PinMode {}
pub struct Input;
pub struct Output;
impl PinMode for Input {}
impl PinMode for Output {}

/// Single port pin with its direction tracked in the type.
#[derive(Debug)]
pub struct Pin<PORT, const PIN: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const P: u8, MODE> Pin<PORT, P, MODE> {
    /// The caller must own the port the pin belongs to.
    pub(crate) const fn new() -> Self {
        Pin {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

macro_rules! impl_port {
    ($PORT:ident, $port:ident, $ddr:ident, $pin:ident) => {
        impl<const P: u8, MODE: PinMode> Pin<$PORT, P, MODE> {
            pub fn into_output(self) -> Pin<$PORT, P, Output> {
                // Set DDRx bit
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Pin::new()
            }

            pub fn into_input(self) -> Pin<$PORT, P, Input> {
                // Clear DDRx bit and disable pull-up
                unsafe {
                    (*$PORT::ptr()).$ddr.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Pin::new()
            }
        }

        impl<const P: u8> OutputPin for Pin<$PORT, P, Output> {
            type Error = Infallible;

            #[inline]
            fn set_high(&mut self) -> Result<(), Self::Error> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() | (1 << P)));
                }
                Ok(())
            }

            #[inline]
            fn set_low(&mut self) -> Result<(), Self::Error> {
                unsafe {
                    (*$PORT::ptr()).$port.modify(|r, w| w.bits(r.bits() & !(1 << P)));
                }
                Ok(())
            }
        }

        impl<const P: u8> InputPin for Pin<$PORT, P, Input> {
            type Error = Infallible;

            #[inline]
            fn is_high(&self) -> Result<bool, Self::Error> {
                unsafe { Ok(((*$PORT::ptr()).$pin.read().bits() & (1 << P)) != 0) }
            }

            #[inline]
            fn is_low(&self) -> Result<bool, Self::Error> {
                self.is_high().map(|high| !high)
            }
        }
    };
}

impl_port!(PORTA, porta, ddra, pina);
impl_port!(PORTD, portd, ddrd, pind);

// Ammeter board pin assignment
pub mod board {
    use super::*;

    // Relay selector lines (PORTA)
    pub type RangeLineA = Pin<PORTA, 3, Output>; // 1K / lower ranges
    pub type RangeLineB = Pin<PORTA, 4, Output>; // 100R / 1R
    pub type ModeLine = Pin<PORTA, 5, Output>;   // DC / AC relay

    // LCD control lines (PORTD)
    pub type LcdRs = Pin<PORTD, 5, Output>;
    pub type LcdRw = Pin<PORTD, 6, Output>;
    pub type LcdEn = Pin<PORTD, 7, Output>;

    pub struct SelectorPins {
        pub range_a: RangeLineA,
        pub range_b: RangeLineB,
        pub mode: ModeLine,
    }

    pub struct LcdControlPins {
        pub rs: LcdRs,
        pub rw: LcdRw,
        pub en: LcdEn,
    }

    /// Claim the selector lines. Consumes PORTA so nothing else drives it.
    pub fn selector_pins(_porta: PORTA) -> SelectorPins {
        SelectorPins {
            range_a: Pin::<PORTA, 3, Input>::new().into_output(),
            range_b: Pin::<PORTA, 4, Input>::new().into_output(),
            mode: Pin::<PORTA, 5, Input>::new().into_output(),
        }
    }

    /// Claim the LCD control lines. Consumes PORTD.
    pub fn lcd_control_pins(_portd: PORTD) -> LcdControlPins {
        LcdControlPins {
            rs: Pin::<PORTD, 5, Input>::new().into_output(),
            rw: Pin::<PORTD, 6, Input>::new().into_output(),
            en: Pin::<PORTD, 7, Input>::new().into_output(),
        }
    }
}
