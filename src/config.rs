use core::time::Duration;

use crate::frame::LaneOrder;

/// Tunables of a [`Neopixel`](crate::Neopixel) driver.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the transmission task.
    pub task_name: &'static str,
    /// Scheduling priority of the transmission task.
    ///
    /// Has to be above the priority of ordinary application tasks;
    /// a starved transmission task produces broken pulse timings.
    pub task_priority: u8,
    /// Byte order of the serial peripheral.
    pub lane_order: LaneOrder,
    /// Maximum time a single write to the peripheral may block.
    pub write_timeout: Duration,
    /// How often [`deinit`](crate::Neopixel::deinit) checks whether the task terminated.
    pub deinit_attempts: u32,
    /// Delay between two termination checks, in milliseconds.
    pub deinit_retry_delay_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task_name: "neopixel",
            task_priority: 5,
            lane_order: LaneOrder::Swapped16,
            write_timeout: Duration::from_millis(1000),
            deinit_attempts: 50,
            deinit_retry_delay_ms: 10,
        }
    }
}
