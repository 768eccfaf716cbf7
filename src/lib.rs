//! Client for GRAPHIX multi-channel vacuum gauge controllers.
//!
//! The controller speaks a framed ASCII protocol over its serial line: a
//! select character (SI for reads, SO for writes), a semicolon-separated
//! body like `"1;29"`, a one-byte checksum and an EOT terminator. Replies
//! lead with ACK or NACK and carry the same tail.
//!
//! The crate is layered the way the wire is: [`proto`] holds the pure
//! codec, [`port`] the byte stream, [`link`] the one-transaction-at-a-time
//! engine, and [`gauge`] the typed (channel, parameter) addressing on top.
//!
//! ```no_run
//! use std::sync::Arc;
//! use graphix_link::{open_port, ControllerInfo, Gauge, Link, Sensor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = open_port("/dev/ttyGraphix", 38_400)?;
//! let gauge = Gauge::new(Arc::new(Link::new(Box::new(port))));
//!
//! let info = ControllerInfo::read(&gauge)?;
//! for ch in 1..=info.channel_count {
//!     let sensor = Sensor::init(gauge.clone(), ch)?;
//!     println!("{}: {:.3e} {}", sensor.name(), sensor.pressure()?, info.display_unit);
//! }
//! # Ok(())
//! # }
//! ```

pub mod gauge;
pub mod link;
pub mod port;
pub mod proto;

pub use gauge::{ControllerInfo, Gauge, GaugeError, Parameter, Sensor, Target};
pub use link::{DEFAULT_SETTLE, Link, LinkConfig};
pub use port::{SerialTransport, Transport, TransportError, open_port};
pub use proto::command::{Command, Direction};
pub use proto::frame::Reply;
