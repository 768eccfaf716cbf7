//! The request/response transaction engine for one controller connection.

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use log::trace;

use crate::port::{Transport, TransportError};
use crate::proto::command::Command;
use crate::proto::frame::{self, Reply};

/// Stock wait between write and read.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(20);

/// Spacing between reads in the optional deadline loop.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Timing knobs for an exchange.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Fixed wait between write and read. Port reads are non-blocking and
    /// the instrument's turnaround is bounded but non-zero, so this is an
    /// unconditional delay, not a poll-until-ready loop. Reading earlier
    /// risks picking up a partial frame.
    pub settle: Duration,
    /// When set, keep reading after the settle wait until a trailing EOT
    /// shows up or the deadline passes. Off by default: stock behavior is a
    /// single read, degrading to `Malformed` when the instrument is slow.
    pub response_deadline: Option<Duration>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            settle: DEFAULT_SETTLE,
            response_deadline: None,
        }
    }
}

/// One serial connection to a controller.
///
/// The protocol has no sequence numbers or multiplexing; two frames
/// interleaved on the line are unrecoverable. The transport therefore sits
/// behind a mutex held across the whole write-settle-read span, and
/// concurrent callers serialize in submission order.
pub struct Link {
    io: Mutex<Box<dyn Transport>>,
    config: LinkConfig,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_config(transport, LinkConfig::default())
    }

    pub fn with_config(transport: Box<dyn Transport>, config: LinkConfig) -> Self {
        Self {
            io: Mutex::new(transport),
            config,
        }
    }

    /// Run one transaction: encode, write, settle, read, decode.
    ///
    /// Transport failures abort the exchange and surface as `Err`; the
    /// connection stays usable and nothing is retried here. [`Reply::Nack`]
    /// and [`Reply::Malformed`] are ordinary outcomes, not errors.
    pub fn exchange(&self, cmd: &Command) -> Result<Reply, TransportError> {
        let frame = frame::encode(cmd);
        // A poisoned lock only means another caller panicked mid-exchange;
        // the port itself is still fine to use.
        let mut io = self.io.lock().unwrap_or_else(|e| e.into_inner());

        trace!("tx {}", printable(&frame));
        io.write_all(&frame)?;

        thread::sleep(self.config.settle);

        let mut raw = Vec::new();
        io.read_available(&mut raw)?;
        if let Some(deadline) = self.config.response_deadline {
            let started = Instant::now();
            while raw.last() != Some(&frame::EOT) && started.elapsed() < deadline {
                thread::sleep(POLL_INTERVAL);
                io.read_available(&mut raw)?;
            }
        }
        trace!("rx {}", printable(&raw));

        Ok(frame::decode(&raw))
    }
}

fn printable(bytes: &[u8]) -> String {
    bytes.iter().flat_map(|&b| (b as char).escape_default()).collect()
}
