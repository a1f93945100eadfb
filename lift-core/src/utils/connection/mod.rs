//! Network side of the lift.
//!
//! # Modules
//! - `protocol`: text command parsing and confirmation encoding.
//! - `transport`: the non-blocking datagram seam used by the scheduler.
//! - `udp`: `embassy-net` implementation of that seam.
//! - `identity`: SSID derivation from the chip identity.

pub mod identity;
/// Text command protocol spoken over UDP.
pub mod protocol;
pub mod transport;
pub mod udp;

pub use protocol::{Command, Confirmation, ParseError};
pub use transport::{DatagramTransport, Received, TransportFault};
pub use udp::UdpTransport;
