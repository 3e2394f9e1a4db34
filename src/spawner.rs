use futures::future::BoxFuture;

use crate::errors::SpawnError;

/// Starts long-running tasks on the host scheduler.
///
/// The transmission task never returns until its driver is torn down, so
/// implementations need to give it its own thread or executor task.
///
/// The task has to run at an elevated priority, above the code producing pixel
/// updates, or frames can be delayed arbitrarily. Spawners for embedded
/// executors must map `priority` onto a real task priority.
/// `ThreadSpawner` does not meet this requirement.
pub trait Spawner {
    /// Starts `task` with the given name and priority.
    ///
    /// Higher numbers mean higher priority.
    fn spawn(
        &self,
        name: &'static str,
        priority: u8,
        task: BoxFuture<'static, ()>,
    ) -> Result<(), SpawnError>;
}

#[cfg(feature = "std")]
mod thread {
    use std::{thread, time::Duration};

    use futures::future::BoxFuture;

    use super::Spawner;
    use crate::errors::SpawnError;

    /// Runs every task on its own operating system thread.
    ///
    /// The requested priority is only logged, so the transmission task runs at
    /// normal thread priority. This does not satisfy the priority requirement
    /// of [`Spawner`]; it is meant for host testing and demos.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ThreadSpawner;

    impl Spawner for ThreadSpawner {
        fn spawn(
            &self,
            name: &'static str,
            priority: u8,
            task: BoxFuture<'static, ()>,
        ) -> Result<(), SpawnError> {
            log::debug!("Spawning thread '{}' (priority {}).", name, priority);

            thread::Builder::new()
                .name(name.into())
                .spawn(move || futures::executor::block_on(task))
                .map(drop)
                .map_err(|e| {
                    log::error!("Unable to spawn thread '{}': {}", name, e);
                    SpawnError::new(name)
                })
        }
    }

    /// A delay based on [`std::thread::sleep`].
    #[derive(Debug, Clone, Copy, Default)]
    pub struct StdDelay;

    impl embedded_hal::delay::DelayNs for StdDelay {
        fn delay_ns(&mut self, ns: u32) {
            thread::sleep(Duration::from_nanos(ns.into()));
        }

        fn delay_ms(&mut self, ms: u32) {
            thread::sleep(Duration::from_millis(ms.into()));
        }
    }
}

#[cfg(feature = "std")]
pub use thread::{StdDelay, ThreadSpawner};
