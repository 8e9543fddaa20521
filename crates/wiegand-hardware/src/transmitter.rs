//! Blocking 26-bit Wiegand transmitter.
//!
//! Both data lines idle high. A bit is sent as one low pulse on D1 for a one
//! or on D0 for a zero, followed by an inter-bit gap with the line high:
//!
//! ```text
//!        ┌──┐        ┌───────────────────┐
//! D0 ────┘  └────────┘                   └──  (zero)
//!        ↑50us↑  250us  ↑
//! ```
//!
//! A full frame is 26 pulses and takes about 7.8 ms. The caller thread is
//! blocked for that time; async callers run it on a blocking worker.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use tracing::{debug, info, trace};
use wiegand_core::constants::{PULSE_INTERVAL_US, PULSE_WIDTH_US};
use wiegand_core::{Bit, Payload24};
use wiegand_protocol::Wiegand26;

use crate::error::{HardwareError, Result};
use crate::traits::FrameWriter;

/// Low time and high gap of one bit pulse, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    pub width_us: u32,
    pub interval_us: u32,
}

impl PulseTiming {
    /// Time on the wire for one full frame.
    #[must_use]
    pub fn frame_duration_us(&self) -> u32 {
        u32::from(Wiegand26::BITS) * (self.width_us + self.interval_us)
    }
}

impl Default for PulseTiming {
    fn default() -> Self {
        Self {
            width_us: PULSE_WIDTH_US,
            interval_us: PULSE_INTERVAL_US,
        }
    }
}

/// Wiegand writer driving two output pins.
#[derive(Debug)]
pub struct WiegandTransmitter<D0, D1, D> {
    d0: D0,
    d1: D1,
    delay: D,
    timing: PulseTiming,
}

impl<D0, D1, D> WiegandTransmitter<D0, D1, D>
where
    D0: OutputPin,
    D1: OutputPin,
    D: DelayNs,
{
    /// Create a transmitter with the standard 50/250 us pulse timing.
    ///
    /// The pins are not touched until [`set_idle`](Self::set_idle) or the
    /// first transmit.
    pub fn new(d0: D0, d1: D1, delay: D) -> Self {
        Self {
            d0,
            d1,
            delay,
            timing: PulseTiming::default(),
        }
    }

    /// Override the pulse timing.
    #[must_use]
    pub fn with_timing(mut self, timing: PulseTiming) -> Self {
        self.timing = timing;
        self
    }

    #[must_use]
    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    /// Drive both lines high.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Pin`] if either pin cannot be driven.
    pub fn set_idle(&mut self) -> Result<()> {
        self.d0.set_high().map_err(|e| pin_error("D0", &e))?;
        self.d1.set_high().map_err(|e| pin_error("D1", &e))
    }

    /// Frame `payload` with parity and emit all 26 bits.
    ///
    /// Returns the frame that was sent.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Pin`] on the first pin failure; the bits
    /// before it have already been emitted.
    pub fn transmit(&mut self, payload: Payload24) -> Result<Wiegand26> {
        let frame = Wiegand26::new(payload);
        info!("Wiegand write card: {}", payload);
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!("Wiegand frame bits: {:026b}", frame.raw());
        }

        for (index, bit) in frame.bits().enumerate() {
            trace!(index, %bit, "pulse");
            match bit {
                Bit::Zero => pulse(&mut self.d0, &mut self.delay, self.timing)
                    .map_err(|e| pin_error("D0", &e))?,
                Bit::One => pulse(&mut self.d1, &mut self.delay, self.timing)
                    .map_err(|e| pin_error("D1", &e))?,
            }
        }

        Ok(frame)
    }

    /// Give back the pins and the delay provider.
    pub fn release(self) -> (D0, D1, D) {
        (self.d0, self.d1, self.delay)
    }
}

impl<D0, D1, D> FrameWriter for WiegandTransmitter<D0, D1, D>
where
    D0: OutputPin,
    D1: OutputPin,
    D: DelayNs,
{
    fn set_idle(&mut self) -> Result<()> {
        WiegandTransmitter::set_idle(self)
    }

    fn write(&mut self, payload: Payload24) -> Result<()> {
        self.transmit(payload).map(|_| ())
    }
}

fn pulse<P, D>(pin: &mut P, delay: &mut D, timing: PulseTiming) -> core::result::Result<(), P::Error>
where
    P: OutputPin,
    D: DelayNs,
{
    pin.set_low()?;
    delay.delay_us(timing.width_us);
    pin.set_high()?;
    delay.delay_us(timing.interval_us);
    Ok(())
}

fn pin_error<E: embedded_hal::digital::Error>(line: &str, error: &E) -> HardwareError {
    HardwareError::pin(format!("{line}: {:?}", error.kind()))
}
