#![cfg_attr(not(test), no_std)]

//! Firmware core for a three-range handheld ammeter.
//!
//! The shunt voltage is sampled by the 10-bit ADC, scaled by the factor of
//! the selected range and shown on a 2x16 character LCD. A 4x4 keypad picks
//! range and coupling mode and ends a measurement session.
//!
//! Drivers are generic over `embedded-hal` 0.2 traits and small register
//! traits, so the measurement loop runs unchanged against the ATmega128
//! peripherals in [`hal`] or against test doubles on the host.

#[macro_use]
mod fmt;

pub mod application;
pub mod config;
pub mod drivers;
pub mod error;
pub mod format;
pub mod hal;

pub use application::{Ammeter, SessionRequest};
pub use error::Error;
