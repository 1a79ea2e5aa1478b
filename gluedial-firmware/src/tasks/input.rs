//! Input polling task
//!
//! Samples the encoder and button every millisecond and publishes the
//! detent counter, debounced button level and press edge counter for the
//! control task.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Ticker};

use gluedial_core::config::InputConfig;
use gluedial_drivers::button::Button;
use gluedial_drivers::encoder::Encoder;

use crate::channels::{BUTTON_PRESSED, BUTTON_PRESSES, ENCODER_COUNT};

/// Poll interval in milliseconds
pub const POLL_INTERVAL_MS: u64 = 1;

/// Input task - owns the dial pins
#[embassy_executor::task]
pub async fn input_task(
    enc_a: Input<'static>,
    enc_b: Input<'static>,
    button: Input<'static>,
    config: InputConfig,
) {
    info!("Input task started");

    let mut encoder = Encoder::new(enc_a, enc_b, config.encoder_reverse);
    let mut button = Button::new(button, config.button_active_low, config.button_debounce_ms);

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let start = Instant::now();
    let mut was_pressed = false;

    loop {
        ticker.next().await;
        let now_ms = start.elapsed().as_millis() as u32;

        if encoder.poll() != 0 {
            ENCODER_COUNT.store(encoder.count(), Ordering::Relaxed);
        }

        let pressed = button.poll(now_ms);
        if pressed != was_pressed {
            trace!("Button {}", if pressed { "down" } else { "up" });
            if pressed {
                BUTTON_PRESSES.fetch_add(1, Ordering::Relaxed);
            }
            BUTTON_PRESSED.store(pressed, Ordering::Relaxed);
            was_pressed = pressed;
        }
    }
}
