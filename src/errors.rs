use core::fmt::Debug;

use snafu::prelude::*;

/// Errors of the [`Neopixel::init`](crate::Neopixel::init) function.
#[derive(Debug, Snafu)]
pub enum InitError<E: Debug> {
    /// The frame buffer length for the given pixel count does not fit into memory.
    #[snafu(display("a frame of {pixels} pixels does not fit into memory"))]
    PixelCountOverflow {
        /// The requested pixel count.
        pixels: u32,
    },
    /// The frame buffers could not be allocated.
    #[snafu(display("unable to allocate {bytes} bytes for the frame buffer"))]
    Allocation {
        /// Size of the failed allocation.
        bytes: usize,
    },
    /// The serial peripheral rejected the clock configuration.
    #[snafu(display("unable to configure the serial peripheral: {error:?}"))]
    Configure {
        /// The error reported by the peripheral.
        error: E,
    },
    /// The transmission task could not be started.
    #[snafu(display("unable to start the transmission task"))]
    TaskSpawn {
        /// The error reported by the spawner.
        source: SpawnError,
    },
}

/// Returned by a [`Spawner`](crate::Spawner) that was unable to start a task.
#[derive(Debug, Snafu)]
#[snafu(display("unable to spawn task '{name}'"))]
pub struct SpawnError {
    name: &'static str,
}

impl SpawnError {
    /// Creates an error for the task with the given name.
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The name of the task that failed to start.
    pub fn task_name(&self) -> &'static str {
        self.name
    }
}

/// Errors of the [`Neopixel::deinit`](crate::Neopixel::deinit) function.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum DeinitError {
    /// The transmission task did not acknowledge termination in time.
    ///
    /// The task still owns the peripheral and the frame buffers; they are
    /// leaked instead of being freed underneath it.
    #[snafu(display("transmission task did not terminate after {attempts} attempts"))]
    TerminationTimeout {
        /// Number of times the acknowledgement was polled.
        attempts: u32,
    },
    /// The transmission task ended without handing back the peripheral.
    TaskVanished,
}
