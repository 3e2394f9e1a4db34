use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::{
    cell::RefCell,
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
};

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;
use futures::channel::oneshot;

use crate::{
    config::Config,
    errors::{DeinitError, InitError},
    frame::{AllocError, FrameBuffer},
    peripheral::{ClockConfig, CompletionNotifier, SerialTx},
    pixel::{Color, PixelUpdate},
    protocol,
    signal::Signal,
    spawner::Spawner,
    task::Transmitter,
};

/// The live frame, written by [`Neopixel::set_pixel`] and copied by the transmission task.
pub(crate) struct LiveFrame {
    pub buffer: FrameBuffer,
    /// Set whenever the buffer changed since the transmission task last copied it.
    pub dirty: bool,
}

/// State shared between a [`Neopixel`] handle and its transmission task.
pub(crate) struct Shared {
    pub frame: Mutex<RefCell<LiveFrame>>,
    /// Raised once per update, and on termination.
    pub update: Signal,
    pub terminate: AtomicBool,
}

/// A WS2812B LED strip driver based on a serial (I2S) transmit peripheral.
///
/// Pixel updates are written into a frame buffer, and a background
/// transmission task streams the latest frame to the strip.
pub struct Neopixel<P: SerialTx> {
    shared: Arc<Shared>,
    pixels: u32,
    frame_len: usize,
    exited: Option<oneshot::Receiver<P>>,
    deinit_attempts: u32,
    deinit_retry_delay_ms: u32,
}

impl<P> Neopixel<P>
where
    P: SerialTx + Send + 'static,
{
    /// Initializes the driver with the default [`Config`].
    ///
    /// See [`init_with_config`](Self::init_with_config).
    pub fn init(pixels: u32, tx: P, spawner: &impl Spawner) -> Result<Self, InitError<P::Error>> {
        Self::init_with_config(pixels, tx, spawner, Config::default())
    }

    /// Initializes the driver for a strip of `pixels` LEDs.
    ///
    /// Configures the peripheral for WS2812B timing and starts the transmission
    /// task through `spawner`. All pixels start switched off, and the dark frame
    /// gets sent right away.
    ///
    /// On failure, everything created so far, including `tx`, is dropped.
    pub fn init_with_config(
        pixels: u32,
        mut tx: P,
        spawner: &impl Spawner,
        config: Config,
    ) -> Result<Self, InitError<P::Error>> {
        let clock = ClockConfig::WS2812B;

        log::debug!("Initializing neopixel driver.");
        log::debug!("    Pixels: {}", pixels);
        log::debug!("    Lane order: {:?}", config.lane_order);
        log::debug!("    Bit rate: {} Hz", clock.bit_rate);
        log::debug!(
            "    Sample rate: {} Hz ({} x {} bit slots)",
            clock.sample_rate(),
            clock.slots,
            clock.slot_bits
        );

        let buffer = FrameBuffer::new(pixels, config.lane_order).map_err(|e| {
            log::error!("Unable to allocate frame buffer: {:?}", e);
            allocation_failed(pixels, e)
        })?;
        let frame_len = buffer.len();

        let mut working = Vec::new();
        working.try_reserve_exact(frame_len).map_err(|_| {
            log::error!("Unable to allocate working buffer.");
            InitError::Allocation { bytes: frame_len }
        })?;
        working.resize(frame_len, 0);

        tx.configure(&clock).map_err(|error| {
            log::error!("Unable to configure peripheral: {:?}", error);
            InitError::Configure { error }
        })?;

        let done = Arc::new(Signal::new());
        let notified = tx.register_completion(CompletionNotifier::new(done.clone()));
        log::debug!(
            "    Completion: {}",
            if notified { "notified" } else { "retransmit" }
        );

        let shared = Arc::new(Shared {
            frame: Mutex::new(RefCell::new(LiveFrame {
                buffer,
                dirty: true,
            })),
            update: Signal::new(),
            terminate: AtomicBool::new(false),
        });

        let (ack, exited) = oneshot::channel();
        let task = Transmitter::new(
            shared.clone(),
            tx,
            working,
            notified.then_some(done),
            config.write_timeout,
            ack,
        );
        spawner
            .spawn(config.task_name, config.task_priority, Box::pin(task.run()))
            .map_err(|source| InitError::TaskSpawn { source })?;

        // Put the dark frame on the wire
        shared.update.raise();

        log::debug!("Refresh rate: {} Hz", protocol::refresh_rate(frame_len));

        Ok(Self {
            shared,
            pixels,
            frame_len,
            exited: Some(exited),
            deinit_attempts: config.deinit_attempts,
            deinit_retry_delay_ms: config.deinit_retry_delay_ms,
        })
    }
}

fn allocation_failed<E: Debug>(pixels: u32, error: AllocError) -> InitError<E> {
    match error {
        AllocError::Overflow => InitError::PixelCountOverflow { pixels },
        AllocError::OutOfMemory { bytes } => InitError::Allocation { bytes },
    }
}

impl<P: SerialTx> Neopixel<P> {
    /// Sets one or more pixels.
    ///
    /// All updates are applied at once, and the transmission task is woken up
    /// a single time. Updates with an index outside of the strip are skipped;
    /// the remaining updates still get applied.
    ///
    /// Returns `false` if at least one update was skipped.
    pub fn set_pixel(&self, updates: &[PixelUpdate]) -> bool {
        let (skipped, first_skipped) = critical_section::with(|cs| {
            let mut live = self.shared.frame.borrow_ref_mut(cs);

            let mut skipped = 0usize;
            let mut first_skipped = None;
            for update in updates {
                if live.buffer.set(update.index, update.color).is_err() {
                    skipped += 1;
                    first_skipped.get_or_insert(update.index);
                }
            }
            live.dirty = true;

            (skipped, first_skipped)
        });

        self.shared.update.raise();

        match first_skipped {
            Some(index) => {
                log::warn!(
                    "Skipped {} invalid pixel(s), first was #{} (strip has {} pixels).",
                    skipped,
                    index,
                    self.pixels
                );
                false
            }
            None => true,
        }
    }

    /// Reads back the color of a single pixel, as currently stored in the frame buffer.
    ///
    /// Returns `None` if the index is outside of the strip.
    pub fn get_pixel(&self, index: u32) -> Option<Color> {
        critical_section::with(|cs| self.shared.frame.borrow_ref(cs).buffer.get(index))
    }

    /// The maximum number of [`set_pixel`](Self::set_pixel) calls per second that
    /// are guaranteed to each produce a visible frame.
    ///
    /// Calling it more often is fine; intermediate states may simply never be shown.
    pub fn refresh_rate(&self) -> u32 {
        protocol::refresh_rate(self.frame_len)
    }

    /// Number of pixels on the strip.
    pub fn pixel_count(&self) -> u32 {
        self.pixels
    }

    /// Number of bytes sent to the peripheral per frame, including the reset gap.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Stops the transmission task and returns the peripheral.
    ///
    /// Waits for the task to acknowledge, polling [`Config::deinit_attempts`]
    /// times with [`Config::deinit_retry_delay_ms`] in between. If the task does
    /// not respond in time, its resources stay with the task and
    /// [`DeinitError::TerminationTimeout`] is returned.
    pub fn deinit(mut self, delay: &mut impl DelayNs) -> Result<P, DeinitError> {
        self.request_termination();

        let Some(mut exited) = self.exited.take() else {
            return Err(DeinitError::TaskVanished);
        };

        for _ in 0..self.deinit_attempts {
            match exited.try_recv() {
                Ok(Some(tx)) => {
                    log::debug!("Neopixel driver deinitialized.");
                    return Ok(tx);
                }
                Ok(None) => delay.delay_ms(self.deinit_retry_delay_ms),
                Err(oneshot::Canceled) => {
                    log::error!("Transmission task ended without returning the peripheral.");
                    return Err(DeinitError::TaskVanished);
                }
            }
        }

        log::error!(
            "Transmission task did not terminate after {} attempts; leaving its resources behind.",
            self.deinit_attempts
        );
        Err(DeinitError::TerminationTimeout {
            attempts: self.deinit_attempts,
        })
    }

    fn request_termination(&self) {
        self.shared.terminate.store(true, Ordering::Release);
        self.shared.update.raise();
    }
}

impl<P: SerialTx> Drop for Neopixel<P> {
    fn drop(&mut self) {
        self.request_termination();
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn allocation_failures_map_to_init_errors() {
        let overflow: InitError<()> = allocation_failed(u32::MAX, AllocError::Overflow);
        assert!(matches!(
            overflow,
            InitError::PixelCountOverflow { pixels: u32::MAX }
        ));

        let oom: InitError<()> = allocation_failed(100, AllocError::OutOfMemory { bytes: 996 });
        assert!(matches!(oom, InitError::Allocation { bytes: 996 }));
        assert_eq!(
            oom.to_string(),
            "unable to allocate 996 bytes for the frame buffer"
        );
    }
}
