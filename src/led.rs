use std::thread;
use std::time::Duration;

use rppal::gpio::OutputPin;

const BLINK_DURATION: Duration = Duration::from_millis(100);

/// Mirror the door state: lit while the door is open.
pub fn set(led: &mut OutputPin, on: bool) {
    if on {
        led.set_high();
    } else {
        led.set_low();
    }
}

/// Boot self-test blink.
pub fn flash(led: &mut OutputPin, times: u8) {
    (0..times).for_each(|_| {
        led.set_high();
        thread::sleep(BLINK_DURATION);
        led.set_low();
        thread::sleep(BLINK_DURATION);
    })
}
