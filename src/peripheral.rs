use alloc::sync::Arc;
use core::{fmt::Debug, time::Duration};

use crate::{protocol, signal::Signal};

/// Clock setup of the serial peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Rate at which data bits leave the peripheral.
    pub bit_rate: u32,
    /// Data width of a single slot, in bits.
    pub slot_bits: u32,
    /// Number of slots per peripheral frame.
    pub slots: u32,
}

impl ClockConfig {
    /// The clock setup WS2812B pulse trains require:
    /// 16-bit stereo frames at 2.4 MBit/s.
    pub const WS2812B: Self = Self {
        bit_rate: protocol::BIT_RATE,
        slot_bits: protocol::SLOT_BITS,
        slots: protocol::SLOTS,
    };

    /// The frame rate ("sample rate" for audio peripherals) that yields [`bit_rate`](Self::bit_rate).
    pub const fn sample_rate(&self) -> u32 {
        self.bit_rate / self.slot_bits / self.slots
    }
}

/// A synchronous serial transmitter (usually an I2S peripheral) that
/// streams the frame buffer onto the data pin.
///
/// Implementations only need to shift out the bytes they are given;
/// word select and bit clock outputs are not used.
pub trait SerialTx {
    /// The error type of the peripheral.
    type Error: Debug;

    /// Configures the peripheral's clocks.
    ///
    /// Called exactly once, before any other method.
    fn configure(&mut self, clock: &ClockConfig) -> Result<(), Self::Error>;

    /// Starts the peripheral.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Stops the peripheral. The data line has to stay low while stopped.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Queues bytes for transmission.
    ///
    /// Blocks until all bytes are accepted by the hardware or the timeout expires.
    /// Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<usize, Self::Error>;

    /// Loads bytes into the transmit queue while the peripheral is disabled,
    /// so the transfer starts without a gap once it gets enabled.
    ///
    /// Returns the number of bytes loaded. Peripherals without preloading return `0`.
    fn preload(&mut self, _data: &[u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }

    /// Registers the notifier that has to be triggered once the last queued byte left the peripheral.
    ///
    /// Returns `false` if the peripheral cannot report completion; in that case the
    /// driver keeps retransmitting the latest frame until no new update arrived.
    fn register_completion(&mut self, _notifier: CompletionNotifier) -> bool {
        false
    }
}

/// Reports finished transfers to the transmission task.
///
/// Handed to the peripheral through [`SerialTx::register_completion`].
#[derive(Clone)]
pub struct CompletionNotifier {
    done: Arc<Signal>,
}

impl CompletionNotifier {
    pub(crate) fn new(done: Arc<Signal>) -> Self {
        Self { done }
    }

    /// Signals to the transmission task that a transfer completed.
    ///
    /// Does not block and is safe to call from an interrupt handler;
    /// the transfer-done interrupt of the peripheral should call it.
    pub fn notify(&self) {
        self.done.raise();
    }
}

impl Debug for CompletionNotifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompletionNotifier").finish_non_exhaustive()
    }
}
