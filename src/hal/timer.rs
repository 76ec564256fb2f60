use avr_device::atmega128a::TC0;
use embedded_hal::blocking::delay::DelayMs;

use crate::config::CPU_FREQ_HZ;

/// Timer0 clock select. Timer0 on the ATmega128 has its own prescaler
/// table (it can run from the asynchronous oscillator), so CS0 = 4 is /64.
#[derive(Clone, Copy)]
pub enum Prescaler {
    Div64 = 4,
}

const PRESCALER_MASK: u8 = 0x07;

// 16MHz / 64 = 250kHz, 250 ticks = 1ms
const TICKS_PER_MS: u8 = (CPU_FREQ_HZ / 64 / 1000) as u8;

pub struct Timer0 {
    _private: (),
}

impl Timer0 {
    pub fn new() -> Self {
        unsafe {
            // Normal mode, stopped
            let p = TC0::ptr();
            (*p).tccr0.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
        }
        Self { _private: () }
    }

    pub fn start(&mut self, prescaler: Prescaler) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.modify(|r, w| {
                w.bits((r.bits() & !PRESCALER_MASK) | (prescaler as u8 & PRESCALER_MASK))
            });
        }
    }

    pub fn stop(&mut self) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.modify(|r, w| w.bits(r.bits() & !PRESCALER_MASK));
        }
    }

    pub fn set_counter(&mut self, value: u8) {
        unsafe {
            (*TC0::ptr()).tcnt0.write(|w| w.bits(value));
        }
    }

    pub fn get_counter(&self) -> u8 {
        unsafe { (*TC0::ptr()).tcnt0.read().bits() }
    }
}

impl Default for Timer0 {
    fn default() -> Self {
        Self::new()
    }
}

/// Millisecond busy-wait on Timer0
pub fn delay_ms(ms: u16) {
    let mut timer = Timer0::new();

    timer.set_counter(0);
    timer.start(Prescaler::Div64);

    for _ in 0..ms {
        while timer.get_counter() < TICKS_PER_MS {}
        timer.set_counter(0);
    }

    timer.stop();
}

/// `embedded-hal` delay provider backed by [`delay_ms`].
///
/// Every instance drives the same Timer0; only one may be waiting at a time,
/// which the single polling loop guarantees.
pub struct Delay {
    _private: (),
}

impl Delay {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayMs<u16> for Delay {
    fn delay_ms(&mut self, ms: u16) {
        delay_ms(ms);
    }
}

impl DelayMs<u8> for Delay {
    fn delay_ms(&mut self, ms: u8) {
        delay_ms(ms as u16);
    }
}
