#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    use ammeter_firmware::config::ERROR_HOLD_MS;
    use ammeter_firmware::drivers::{Keypad, Lcd, ParallelBus, RangeSelector};
    use ammeter_firmware::hal::{board, delay_ms, Adc, AnalogReader, Delay, KeypadPort, LcdDataPort};
    use ammeter_firmware::Ammeter;
    use avr_device::atmega128a::Peripherals;

    let Some(dp) = Peripherals::take() else {
        #[allow(clippy::empty_loop)]
        loop {}
    };

    // Relay selector on PA3..PA5
    let selector_pins = board::selector_pins(dp.PORTA);
    let selector = RangeSelector::new(
        selector_pins.range_a,
        selector_pins.range_b,
        selector_pins.mode,
    );

    // LCD data on PORTB, RS/RW/EN on PD5..PD7
    let control = board::lcd_control_pins(dp.PORTD);
    let lcd = Lcd::new(ParallelBus::new(
        LcdDataPort::new(dp.PORTB),
        control.rs,
        control.rw,
        control.en,
        Delay::new(),
    ));

    let adc = AnalogReader::new(Adc::new(dp.ADC));
    let keypad = Keypad::new(KeypadPort::new(dp.PORTC), Delay::new());

    let mut ammeter = Ammeter::new(adc, selector, lcd, keypad);

    loop {
        let request = match ammeter.select_session() {
            Ok(request) => request,
            Err(_) => continue,
        };

        if let Err(error) = ammeter.run_session(request.range, request.mode) {
            ammeter.show_error(error).ok();
            delay_ms(ERROR_HOLD_MS);
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("ammeter_firmware only runs on the ATmega128; build with --target avr-atmega128");
}
