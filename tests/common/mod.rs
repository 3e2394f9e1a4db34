#![allow(dead_code)]

use std::{
    mem,
    sync::{Arc, Condvar, Mutex, MutexGuard},
    time::Duration,
};

use ws2812_i2s::{
    encoder,
    protocol::{BYTES_PER_COLOR, BYTES_PER_PIXEL},
    ClockConfig, Color, CompletionNotifier, SerialTx,
};

#[derive(Debug)]
pub struct MockError;

#[derive(Debug, Default)]
pub struct Wire {
    pub frames: Vec<Vec<u8>>,
    pub clock: Option<ClockConfig>,
    pub enabled: bool,
    pub stalled: bool,
    pub blocked: bool,
    pub released: bool,
}

/// Everything the mock peripheral put on the wire.
#[derive(Debug, Default)]
pub struct Recorder {
    wire: Mutex<Wire>,
    changed: Condvar,
}

impl Recorder {
    pub fn lock(&self) -> MutexGuard<'_, Wire> {
        self.wire.lock().unwrap()
    }

    /// Waits until `condition` holds, for at most two seconds.
    pub fn wait_until(&self, mut condition: impl FnMut(&Wire) -> bool) -> bool {
        let (_wire, timeout) = self
            .changed
            .wait_timeout_while(self.lock(), Duration::from_secs(2), |wire| !condition(wire))
            .unwrap();
        !timeout.timed_out()
    }

    pub fn set_stalled(&self, stalled: bool) {
        self.lock().stalled = stalled;
        self.changed.notify_all();
    }

    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.lock().frames.last().cloned()
    }

    fn update(&self, f: impl FnOnce(&mut Wire)) {
        f(&mut self.lock());
        self.changed.notify_all();
    }
}

pub struct MockTx {
    recorder: Arc<Recorder>,
    reports_completion: bool,
    preload_limit: usize,
    fail_configure: bool,
    notifier: Option<CompletionNotifier>,
    pending: Vec<u8>,
}

impl MockTx {
    /// A peripheral that reports finished transfers.
    pub fn new() -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let tx = Self {
            recorder: recorder.clone(),
            reports_completion: true,
            preload_limit: 0,
            fail_configure: false,
            notifier: None,
            pending: Vec::new(),
        };
        (tx, recorder)
    }

    /// A peripheral without completion reports.
    pub fn without_completion() -> (Self, Arc<Recorder>) {
        let (mut tx, recorder) = Self::new();
        tx.reports_completion = false;
        (tx, recorder)
    }

    pub fn with_preload(mut self, limit: usize) -> Self {
        self.preload_limit = limit;
        self
    }

    pub fn failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.recorder.lock().enabled
    }
}

impl SerialTx for MockTx {
    type Error = MockError;

    fn configure(&mut self, clock: &ClockConfig) -> Result<(), Self::Error> {
        if self.fail_configure {
            return Err(MockError);
        }
        let clock = *clock;
        self.recorder.update(|wire| wire.clock = Some(clock));
        Ok(())
    }

    fn enable(&mut self) -> Result<(), Self::Error> {
        self.recorder.update(|wire| wire.enabled = true);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.recorder.update(|wire| wire.enabled = false);
        Ok(())
    }

    fn write(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, Self::Error> {
        let mut wire = self.recorder.lock();
        if wire.stalled {
            wire.blocked = true;
            self.recorder.changed.notify_all();
            while wire.stalled {
                wire = self.recorder.changed.wait(wire).unwrap();
            }
            wire.blocked = false;
        }

        let mut frame = mem::take(&mut self.pending);
        frame.extend_from_slice(data);
        wire.frames.push(frame);
        drop(wire);
        self.recorder.changed.notify_all();

        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
        Ok(data.len())
    }

    fn preload(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        let len = data.len().min(self.preload_limit);
        self.pending.extend_from_slice(&data[..len]);
        Ok(len)
    }

    fn register_completion(&mut self, notifier: CompletionNotifier) -> bool {
        if self.reports_completion {
            self.notifier = Some(notifier);
        }
        self.reports_completion
    }
}

impl Drop for MockTx {
    fn drop(&mut self) {
        self.recorder.update(|wire| wire.released = true);
    }
}

/// Decodes a pixel from a frame as it was handed to a lane-swapping peripheral.
pub fn pixel_on_wire(frame: &[u8], index: usize) -> Option<Color> {
    let wire: Vec<u8> = (index * BYTES_PER_PIXEL..(index + 1) * BYTES_PER_PIXEL)
        .map(|offset| frame[offset ^ 1])
        .collect();
    channels_to_color(&wire)
}

/// Decodes a pixel from a frame as it was handed to a linear peripheral.
pub fn pixel_on_linear_wire(frame: &[u8], index: usize) -> Option<Color> {
    channels_to_color(&frame[index * BYTES_PER_PIXEL..(index + 1) * BYTES_PER_PIXEL])
}

fn channels_to_color(wire: &[u8]) -> Option<Color> {
    let mut channels = wire
        .chunks_exact(BYTES_PER_COLOR)
        .map(|chunk| encoder::decode(chunk.try_into().unwrap()));
    let green = channels.next()??;
    let red = channels.next()??;
    let blue = channels.next()??;
    Some(Color::rgb(red, green, blue))
}
