use alloc::{sync::Arc, vec::Vec};
use core::{sync::atomic::Ordering, time::Duration};

use futures::channel::oneshot;

use crate::{driver::Shared, peripheral::SerialTx, signal::Signal};

/// The background task that moves frames from the live buffer to the peripheral.
pub(crate) struct Transmitter<P: SerialTx> {
    shared: Arc<Shared>,
    transfer: Transfer<P>,
    /// Raised by the peripheral when a transfer finished.
    /// `None` if the peripheral cannot report completion.
    done: Option<Arc<Signal>>,
    exited: oneshot::Sender<P>,
}

struct Transfer<P: SerialTx> {
    tx: P,
    /// Private copy of the live buffer; only ever touched by this task.
    working: Vec<u8>,
    write_timeout: Duration,
}

impl<P: SerialTx> Transmitter<P> {
    pub fn new(
        shared: Arc<Shared>,
        tx: P,
        working: Vec<u8>,
        done: Option<Arc<Signal>>,
        write_timeout: Duration,
        exited: oneshot::Sender<P>,
    ) -> Self {
        Self {
            shared,
            transfer: Transfer {
                tx,
                working,
                write_timeout,
            },
            done,
            exited,
        }
    }

    pub async fn run(self) {
        let Self {
            shared,
            mut transfer,
            done,
            exited,
        } = self;

        log::debug!("Transmission task started.");

        loop {
            shared.update.wait().await;

            if shared.terminate.load(Ordering::Acquire) {
                break;
            }

            match &done {
                Some(done) => transfer.send_and_wait(&shared, done).await,
                None => transfer.send_until_settled(&shared),
            }
        }

        log::debug!("Transmission task finished.");

        if exited.send(transfer.tx).is_err() {
            log::debug!("Driver handle is gone, releasing the peripheral.");
        }
    }
}

impl<P: SerialTx> Transfer<P> {
    /// Copies the live buffer into the working buffer, if it changed since the last copy.
    fn snapshot(&mut self, shared: &Shared) -> bool {
        critical_section::with(|cs| {
            let mut live = shared.frame.borrow_ref_mut(cs);
            if !live.dirty {
                return false;
            }
            self.working.copy_from_slice(live.buffer.as_bytes());
            live.dirty = false;
            true
        })
    }

    /// Sends the latest frame once and waits for the peripheral to report completion.
    async fn send_and_wait(&mut self, shared: &Shared, done: &Signal) {
        self.snapshot(shared);

        done.clear();
        let started = match self.start() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Unable to start transfer: {:?}", e);
                false
            }
        };
        if started {
            done.wait().await;
        }

        self.stop();
    }

    /// Sends frames until a frame got sent that was not updated in the meantime.
    ///
    /// Without completion reports there is no way to tell when the last frame
    /// left the peripheral, so the latest frame is sent one more time after
    /// the live buffer stopped changing.
    fn send_until_settled(&mut self, shared: &Shared) {
        loop {
            let updated = self.snapshot(shared);

            if let Err(e) = self.start() {
                log::error!("Unable to start transfer: {:?}", e);
            }
            self.stop();

            if !updated {
                break;
            }
        }
    }

    fn start(&mut self) -> Result<(), P::Error> {
        let preloaded = self.tx.preload(&self.working)?.min(self.working.len());
        self.tx.enable()?;

        let remaining = self.working.get(preloaded..).unwrap_or_default();
        if !remaining.is_empty() {
            let written = self.tx.write(remaining, self.write_timeout)?;
            if written < remaining.len() {
                log::warn!(
                    "Peripheral accepted only {} of {} bytes.",
                    written,
                    remaining.len()
                );
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Err(e) = self.tx.disable() {
            log::error!("Unable to disable peripheral: {:?}", e);
        }
    }
}
