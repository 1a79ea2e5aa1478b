//! Buzzer task
//!
//! Plays queued tones on a passive piezo by toggling a GPIO at the tone
//! frequency. Tones play back to back in queue order.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Instant, Timer};

use crate::channels::TONE_CHANNEL;

/// Buzzer task - owns the piezo pin
#[embassy_executor::task]
pub async fn buzzer_task(mut pin: Output<'static>) {
    info!("Buzzer task started");

    loop {
        let tone = TONE_CHANNEL.receive().await;

        let half_period = Duration::from_micros(500_000 / tone.frequency_hz() as u64);
        let end = Instant::now() + Duration::from_millis(tone.duration_ms() as u64);

        while Instant::now() < end {
            pin.toggle();
            Timer::after(half_period).await;
        }
        pin.set_low();
    }
}
