//! Status LED sinks over ESP-IDF GPIO.
//!
//! Polarity is handled here so the controller only ever says on/off.

use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_svc::sys::EspError;

use crate::config::IndicatorWiring;
use crate::feedback::FeedbackSink;

type Led = PinDriver<'static, AnyOutputPin, Output>;

fn output(pin: u8, active_low: bool) -> Result<Led, EspError> {
    // SAFETY: indicator pins come from the board profile and are checked
    // against the sequencer pin by `TransmitConfig::validate`.
    let mut led = PinDriver::output(unsafe { AnyOutputPin::new(pin as i32) })?;
    drive(&mut led, false, active_low)?;
    Ok(led)
}

fn drive(led: &mut Led, on: bool, active_low: bool) -> Result<(), EspError> {
    if on != active_low {
        led.set_high()
    } else {
        led.set_low()
    }
}

/// Single status LED: toggles per pass, off during cooldown.
pub struct GpioIndicator {
    led: Led,
    active_low: bool,
    on: bool,
}

impl GpioIndicator {
    pub fn new(pin: u8, active_low: bool) -> Result<Self, EspError> {
        Ok(Self {
            led: output(pin, active_low)?,
            active_low,
            on: false,
        })
    }
}

impl FeedbackSink for GpioIndicator {
    type Error = EspError;

    fn pass_complete(&mut self) -> Result<(), EspError> {
        let on = !self.on;
        self.set_activity(on)
    }

    fn set_activity(&mut self, on: bool) -> Result<(), EspError> {
        drive(&mut self.led, on, self.active_low)?;
        self.on = on;
        Ok(())
    }
}

/// RGB LED: red toggles per pass, blue blinks through cooldown.
pub struct RgbIndicator {
    red: Led,
    // Held off; claimed so nothing else drives it.
    _green: Led,
    blue: Led,
    active_low: bool,
    red_on: bool,
}

impl RgbIndicator {
    pub fn new(red: u8, green: u8, blue: u8, active_low: bool) -> Result<Self, EspError> {
        Ok(Self {
            red: output(red, active_low)?,
            _green: output(green, active_low)?,
            blue: output(blue, active_low)?,
            active_low,
            red_on: false,
        })
    }
}

impl FeedbackSink for RgbIndicator {
    type Error = EspError;

    fn pass_complete(&mut self) -> Result<(), EspError> {
        let on = !self.red_on;
        self.set_activity(on)
    }

    fn set_activity(&mut self, on: bool) -> Result<(), EspError> {
        drive(&mut self.red, on, self.active_low)?;
        self.red_on = on;
        Ok(())
    }

    fn set_idle(&mut self, on: bool) -> Result<(), EspError> {
        drive(&mut self.blue, on, self.active_low)
    }
}

/// Indicator built from the board wiring.
pub enum BoardIndicator {
    None,
    Single(GpioIndicator),
    Rgb(RgbIndicator),
}

impl BoardIndicator {
    pub fn from_wiring(wiring: IndicatorWiring) -> Result<Self, EspError> {
        Ok(match wiring {
            IndicatorWiring::None => BoardIndicator::None,
            IndicatorWiring::Single { pin, active_low } => {
                BoardIndicator::Single(GpioIndicator::new(pin, active_low)?)
            }
            IndicatorWiring::Rgb { red, green, blue, active_low } => {
                BoardIndicator::Rgb(RgbIndicator::new(red, green, blue, active_low)?)
            }
        })
    }
}

impl FeedbackSink for BoardIndicator {
    type Error = EspError;

    fn pass_complete(&mut self) -> Result<(), EspError> {
        match self {
            BoardIndicator::None => Ok(()),
            BoardIndicator::Single(led) => led.pass_complete(),
            BoardIndicator::Rgb(led) => led.pass_complete(),
        }
    }

    fn set_activity(&mut self, on: bool) -> Result<(), EspError> {
        match self {
            BoardIndicator::None => Ok(()),
            BoardIndicator::Single(led) => led.set_activity(on),
            BoardIndicator::Rgb(led) => led.set_activity(on),
        }
    }

    fn set_idle(&mut self, on: bool) -> Result<(), EspError> {
        match self {
            BoardIndicator::None | BoardIndicator::Single(_) => Ok(()),
            BoardIndicator::Rgb(led) => led.set_idle(on),
        }
    }
}
