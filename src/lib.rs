#![no_std]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod encoder;
/// WS2812B timing constants.
pub mod protocol;

mod config;
mod driver;
mod errors;
mod frame;
mod peripheral;
mod pixel;
mod signal;
mod spawner;
mod task;

pub use config::Config;
pub use driver::Neopixel;
pub use errors::{DeinitError, InitError, SpawnError};
pub use frame::LaneOrder;
pub use peripheral::{ClockConfig, CompletionNotifier, SerialTx};
pub use pixel::{Color, PixelUpdate};
pub use spawner::Spawner;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub use spawner::{StdDelay, ThreadSpawner};
