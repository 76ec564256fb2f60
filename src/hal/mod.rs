pub mod adc;

#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod port;
#[cfg(target_arch = "avr")]
pub mod timer;

// Re-export commonly used types
pub use adc::{AdcChannel, AdcPrescaler, AdcReference, AdcRegisters, AnalogReader, Sample};

#[cfg(target_arch = "avr")]
pub use adc::Adc;
#[cfg(target_arch = "avr")]
pub use gpio::board;
#[cfg(target_arch = "avr")]
pub use port::{KeypadPort, LcdDataPort};
#[cfg(target_arch = "avr")]
pub use timer::{delay_ms, Delay};
