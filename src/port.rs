use std::io::{self, Read, Write};
use std::time::Duration;

use log::debug;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use thiserror::Error;

/// Byte-stream failures, kept apart from protocol-level outcomes. Fatal to
/// the transaction in flight, not to the connection.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },
    #[error("serial write: {0}")]
    Write(#[source] io::Error),
    #[error("serial read: {0}")]
    Read(#[source] io::Error),
}

/// The byte stream the transaction engine talks through. Implementations
/// carry no protocol knowledge; timing is the engine's job, not theirs.
pub trait Transport: Send {
    /// Write the whole buffer.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Append whatever has already arrived to `buf` without waiting.
    /// Returns the number of bytes taken, possibly zero.
    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, TransportError>;
}

/// Serial line transport. Closing is dropping.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

/// Open `path` at `baud`, 8N1, no flow control. The short timeout keeps
/// reads near non-blocking; the engine supplies the settle wait.
pub fn open_port(path: &str, baud: u32) -> Result<SerialTransport, TransportError> {
    let port = serialport::new(path, baud)
        .timeout(Duration::from_millis(10))
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .open()
        .map_err(|source| TransportError::Open {
            path: path.to_string(),
            source,
        })?;
    debug!("opened {path} at {baud} baud");
    Ok(SerialTransport { port })
}

impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes).map_err(TransportError::Write)?;
        self.port.flush().map_err(TransportError::Write)
    }

    fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, TransportError> {
        let pending = self
            .port
            .bytes_to_read()
            .map_err(|e| TransportError::Read(e.into()))? as usize;
        if pending == 0 {
            return Ok(0);
        }
        let start = buf.len();
        buf.resize(start + pending, 0);
        match self.port.read(&mut buf[start..]) {
            Ok(n) => {
                buf.truncate(start + n);
                Ok(n)
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                buf.truncate(start);
                Ok(0)
            }
            Err(e) => {
                buf.truncate(start);
                Err(TransportError::Read(e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Instrument double for engine and addressing tests.

    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::{Transport, TransportError};

    #[derive(Default)]
    pub(crate) struct MockState {
        /// Canned responses, one entry per expected write; each entry is the
        /// chunk sequence successive reads will hand back.
        pub script: VecDeque<Vec<Vec<u8>>>,
        /// Every buffer passed to `write_all`, in order.
        pub writes: Vec<Vec<u8>>,
        /// Set when a write lands before the previous reply was drained.
        pub overlapped: bool,
        /// Make the next writes fail at the byte-stream level.
        pub fail_writes: bool,
        in_flight: bool,
        current: VecDeque<Vec<u8>>,
    }

    pub(crate) struct MockPort {
        responder: Option<Box<dyn Fn(&[u8]) -> Vec<u8> + Send>>,
        state: Arc<Mutex<MockState>>,
    }

    impl MockPort {
        /// Fixed replies, one whole frame per transaction.
        pub fn scripted(replies: impl IntoIterator<Item = Vec<u8>>) -> Self {
            let state = MockState {
                script: replies.into_iter().map(|r| vec![r]).collect(),
                ..Default::default()
            };
            Self {
                responder: None,
                state: Arc::new(Mutex::new(state)),
            }
        }

        /// Fixed replies delivered in pieces across successive reads.
        pub fn chunked(replies: impl IntoIterator<Item = Vec<Vec<u8>>>) -> Self {
            let state = MockState {
                script: replies.into_iter().collect(),
                ..Default::default()
            };
            Self {
                responder: None,
                state: Arc::new(Mutex::new(state)),
            }
        }

        /// Compute each reply from the frame that was written.
        pub fn responding(f: impl Fn(&[u8]) -> Vec<u8> + Send + 'static) -> Self {
            Self {
                responder: Some(Box::new(f)),
                state: Arc::new(Mutex::new(MockState::default())),
            }
        }

        pub fn handle(&self) -> Arc<Mutex<MockState>> {
            self.state.clone()
        }
    }

    impl Transport for MockPort {
        fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            let mut st = self.state.lock().unwrap();
            if st.fail_writes {
                return Err(TransportError::Write(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "wire gone",
                )));
            }
            if st.in_flight {
                st.overlapped = true;
            }
            st.in_flight = true;
            st.writes.push(bytes.to_vec());
            st.current = match &self.responder {
                Some(f) => VecDeque::from([f(bytes)]),
                None => st.script.pop_front().unwrap_or_default().into(),
            };
            Ok(())
        }

        fn read_available(&mut self, buf: &mut Vec<u8>) -> Result<usize, TransportError> {
            let mut st = self.state.lock().unwrap();
            match st.current.pop_front() {
                Some(chunk) => {
                    if st.current.is_empty() {
                        st.in_flight = false;
                    }
                    buf.extend_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => {
                    st.in_flight = false;
                    Ok(0)
                }
            }
        }
    }
}
