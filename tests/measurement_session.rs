//! End-to-end sessions over the pin-level drivers: keypad matrix, parallel
//! LCD bus and relay selector lines, with only the ADC registers faked.

use std::cell::RefCell;
use std::rc::Rc;

use ammeter_firmware::drivers::{
    KeyMatrix, Keypad, Lcd, Mode, ParallelBus, RangeSelector, ScanState,
};
use ammeter_firmware::hal::{AdcChannel, AdcPrescaler, AdcReference, AdcRegisters, AnalogReader};
use ammeter_firmware::{Ammeter, Error};
use embedded_hal::digital::v2::OutputPin;
use embedded_hal_mock::delay::MockNoop;
use embedded_hal_mock::pin::{Mock as PinMock, State, Transaction as PinTransaction};

/// Converter returning a fixed sample after a few completion polls.
struct SlowAdc {
    sample: u16,
    latency: u32,
    remaining: u32,
    channels: Rc<RefCell<Vec<AdcChannel>>>,
}

impl AdcRegisters for SlowAdc {
    fn configure(&mut self, reference: AdcReference, prescaler: AdcPrescaler) {
        assert_eq!(reference, AdcReference::Avcc);
        assert_eq!(prescaler, AdcPrescaler::Div128);
    }

    fn start_conversion(&mut self, channel: AdcChannel) {
        self.channels.borrow_mut().push(channel);
        self.remaining = self.latency;
    }

    fn conversion_complete(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }

    fn result(&mut self) -> u16 {
        self.sample
    }
}

/// Output line that remembers every level it was driven to.
#[derive(Clone, Default)]
struct Line(Rc<RefCell<Vec<bool>>>);

impl Line {
    fn history(&self) -> Vec<bool> {
        self.0.borrow().clone()
    }
}

impl OutputPin for Line {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(true);
        Ok(())
    }
}

/// LCD data port capturing the bytes strobed with RS high.
#[derive(Clone, Default)]
struct Capture {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl ammeter_firmware::drivers::DataPort for Capture {
    fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.bytes.borrow_mut().push(byte);
        Ok(())
    }
}

/// Keypad that reports the '9' key held down after `idle_probes` idle scans.
struct ExitAfter {
    idle_probes: usize,
    probes: usize,
    driven: u8,
}

impl KeyMatrix for ExitAfter {
    fn drive_rows(&mut self, pattern: u8) -> Result<(), Error> {
        self.driven = pattern;
        Ok(())
    }

    fn read_columns(&mut self) -> Result<u8, Error> {
        if self.driven == 0 {
            self.probes += 1;
        }
        // '9' is row 0, column 2
        let pressed = self.probes > self.idle_probes && self.driven & 0x01 == 0;
        Ok(if pressed { 0b1011 } else { 0x0F })
    }
}

struct Rig {
    rs: Line,
    line_a: Line,
    line_b: Line,
    mode: Line,
    data: Capture,
    channels: Rc<RefCell<Vec<AdcChannel>>>,
}

type Meter = Ammeter<
    SlowAdc,
    RangeSelector<Line, Line, Line>,
    ParallelBus<Capture, Line, Line, Line, MockNoop>,
    Keypad<ExitAfter, MockNoop>,
>;

fn rig(sample: u16, idle_probes: usize) -> (Meter, Rig) {
    let rig = Rig {
        rs: Line::default(),
        line_a: Line::default(),
        line_b: Line::default(),
        mode: Line::default(),
        data: Capture::default(),
        channels: Rc::default(),
    };

    let adc = AnalogReader::new(SlowAdc {
        sample,
        latency: 3,
        remaining: 0,
        channels: rig.channels.clone(),
    });
    let selector = RangeSelector::new(rig.line_a.clone(), rig.line_b.clone(), rig.mode.clone());
    let lcd = Lcd::new(ParallelBus::new(
        rig.data.clone(),
        rig.rs.clone(),
        Line::default(),
        Line::default(),
        MockNoop::new(),
    ));
    let keypad = Keypad::new(
        ExitAfter {
            idle_probes,
            probes: 0,
            driven: 0x0F,
        },
        MockNoop::new(),
    );

    (Ammeter::new(adc, selector, lcd, keypad), rig)
}

/// Bytes written while RS was high
fn shown(rig: &Rig) -> String {
    let rs = rig.rs.history();
    let bytes = rig.data.bytes.borrow();
    bytes
        .iter()
        .zip(rs.iter())
        .filter(|(_, data)| **data)
        .map(|(byte, _)| *byte as char)
        .collect()
}

#[test]
fn half_scale_on_low_range_reads_two_and_a_half_milliamps() {
    let (mut meter, rig) = rig(512, 2);
    assert_eq!(meter.run_session(1, Mode::Dc), Ok(()));

    // DC, then LOW = (0, 0)
    assert_eq!(rig.mode.history(), [false]);
    assert_eq!(rig.line_a.history(), [false]);
    assert_eq!(rig.line_b.history(), [false]);

    let text = shown(&rig);
    let readings = text.strip_prefix("Current value : 9->").unwrap();
    assert_eq!(readings.len() % 6, 0);
    assert!(readings.len() >= 6);
    for field in readings.as_bytes().chunks(6) {
        // 512 * 0.005 / 1024 = 0.0025, rounded half up to three decimals
        assert_eq!(field, b"0.003 ");
    }

    assert!(rig.channels.borrow().iter().all(|c| *c == AdcChannel::Adc0));

    let (_, _, _, keypad) = meter.release();
    assert_eq!(keypad.state(), ScanState::ReleaseWait);
}

#[test]
fn high_range_ac_drives_both_range_lines_and_the_mode_line() {
    let (mut meter, rig) = rig(1023, 0);
    assert_eq!(meter.run_session(3, Mode::Ac), Ok(()));

    assert_eq!(rig.mode.history(), [true]);
    assert_eq!(rig.line_a.history(), [true]);
    assert_eq!(rig.line_b.history(), [true]);
    assert_eq!(shown(&rig), "Current value : 9->3.996 ");
}

#[test]
fn mid_range_is_one_zero() {
    let (mut meter, rig) = rig(0, 0);
    assert_eq!(meter.run_session(2, Mode::Dc), Ok(()));
    assert_eq!(rig.line_a.history(), [true]);
    assert_eq!(rig.line_b.history(), [false]);
    assert_eq!(shown(&rig), "Current value : 9->0.000 ");
}

#[test]
fn invalid_range_never_touches_the_selector_lines() {
    for selector in [0u8, 4, 9] {
        let (mut meter, rig) = rig(512, 0);
        assert_eq!(
            meter.run_session(selector, Mode::Dc),
            Err(Error::InvalidRange(selector))
        );
        assert!(rig.line_a.history().is_empty());
        assert!(rig.line_b.history().is_empty());
        assert!(rig.mode.history().is_empty());
        assert!(rig.channels.borrow().is_empty());
    }
}

#[test]
fn display_bus_keeps_rw_low_and_pulses_enable() {
    let mut rw = PinMock::new(&[
        PinTransaction::set(State::Low),
        PinTransaction::set(State::Low),
    ]);
    let mut en = PinMock::new(&[
        PinTransaction::set(State::High),
        PinTransaction::set(State::Low),
        PinTransaction::set(State::High),
        PinTransaction::set(State::Low),
    ]);
    let data = Capture::default();
    let rs = Line::default();

    let mut lcd = Lcd::new(ParallelBus::new(
        data.clone(),
        rs.clone(),
        rw.clone(),
        en.clone(),
        MockNoop::new(),
    ));
    lcd.set_cursor(1, 0).unwrap();
    lcd.set_cursor(1, 16).unwrap();
    lcd.write_char(b'9').unwrap();

    assert_eq!(*data.bytes.borrow(), [0xC0, b'9']);
    assert_eq!(rs.history(), [false, true]);
    rw.done();
    en.done();
}
