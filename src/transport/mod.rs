//! Serial channel abstraction.
//!
//! The acquisition loop talks to the device through the [`LineTransport`]
//! trait; [`SerialChannel`] backs it with real hardware and [`MockChannel`]
//! scripts it for tests.

mod error;
mod mock;
mod serial;
mod traits;

pub use error::TransportError;
pub use mock::{MockChannel, MockReply};
pub use serial::SerialChannel;
pub use traits::{DataBits, LineTransport, Parity, SerialSettings, StopBits};
