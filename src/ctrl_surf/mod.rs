//! Control surface synchronization.
//!
//! The [`Synchronizer`] turns messages from the device into host actions
//! and keeps the device's LEDs and knob rings in line with the host's state.

pub mod descriptor;
pub use descriptor::Descriptor;

pub mod dispatch;
pub use dispatch::ActionDispatch;

pub mod element;
pub use element::{Element, Event};

pub mod error;
pub use error::Error;

mod flash;

pub mod synchronizer;
pub use synchronizer::{Synchronizer, Timing};

pub mod transport;
pub use transport::{MidirTransport, Transport};

#[cfg(test)]
pub(crate) mod testing;
