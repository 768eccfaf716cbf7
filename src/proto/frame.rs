//! Wire framing for the controller protocol.
//!
//! A transmit frame is `[selector][body][checksum][EOT]` where the selector
//! is SI for reads and SO for writes, and the checksum covers selector+body.
//! A response carries ACK or NACK ahead of its payload and ends with the
//! same checksum+EOT tail.

use super::checksum::checksum;
use super::command::{Command, Direction};

/// End of transmission, terminates every frame.
pub const EOT: u8 = 0x04;
/// Shift-in, selects a parameter read.
pub const SI: u8 = 0x0F;
/// Shift-out, selects a parameter write.
pub const SO: u8 = 0x0E;
/// Parameter value accepted.
pub const ACK: u8 = 0x06;
/// Parameter value not accepted.
pub const NACK: u8 = 0x15;

/// Shortest well-formed response: marker + checksum + EOT.
pub const MIN_RESPONSE_LEN: usize = 3;

/// Decoded instrument response. Exactly one variant per transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledged, with payload text.
    Data(String),
    /// Acknowledged with no payload, a bare write confirmation.
    Empty,
    /// Not acknowledged; the payload carries the instrument's diagnostic.
    Nack(String),
    /// Neither ACK nor NACK present, or the frame is truncated.
    Malformed,
}

/// Encode a command into the exact byte sequence to transmit.
pub fn encode(cmd: &Command) -> Vec<u8> {
    let selector = match cmd.direction() {
        Direction::Read => SI,
        Direction::Write => SO,
    };
    let mut out = Vec::with_capacity(cmd.body().len() + 3);
    out.push(selector);
    out.extend_from_slice(cmd.body().as_bytes());
    out.push(checksum(&out));
    out.push(EOT);
    out
}

/// Decode a raw response into a [`Reply`].
///
/// ACK anywhere in the stream wins; NACK counts only when no ACK is
/// present. The trailing checksum byte is stripped without re-validation,
/// the instrument's own ACK/NACK is taken as authoritative. Callers wanting
/// defense in depth can recompute [`checksum`] over the frame themselves.
pub fn decode(raw: &[u8]) -> Reply {
    if raw.len() < MIN_RESPONSE_LEN {
        return Reply::Malformed;
    }
    if let Some(pos) = raw.iter().position(|&b| b == ACK) {
        match strip_payload(raw, pos) {
            Some([]) => Reply::Empty,
            Some(payload) => Reply::Data(latin1(payload)),
            None => Reply::Malformed,
        }
    } else if let Some(pos) = raw.iter().position(|&b| b == NACK) {
        match strip_payload(raw, pos) {
            Some(payload) => Reply::Nack(latin1(payload)),
            None => Reply::Malformed,
        }
    } else {
        Reply::Malformed
    }
}

/// Payload between the marker and the trailing checksum+EOT tail. `None`
/// when the frame ends early or lacks its terminator.
fn strip_payload(raw: &[u8], marker: usize) -> Option<&[u8]> {
    if *raw.last()? != EOT {
        return None;
    }
    let end = raw.len() - 2; // checksum byte sits just before EOT
    if marker + 1 > end {
        return None;
    }
    Some(&raw[marker + 1..end])
}

// Responses are single-byte text; map each byte to its code point rather
// than guessing at UTF-8.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a synthetic response the way the instrument would.
    fn response(marker: u8, payload: &[u8]) -> Vec<u8> {
        let mut raw = Vec::with_capacity(payload.len() + 3);
        raw.push(marker);
        raw.extend_from_slice(payload);
        raw.push(checksum(&raw));
        raw.push(EOT);
        raw
    }

    #[test]
    fn encode_read_frame() {
        let frame = encode(&Command::read("1;5"));
        assert_eq!(frame, vec![SI, b'1', b';', b'5', b'O', EOT]);
    }

    #[test]
    fn encode_write_frame_layout() {
        let frame = encode(&Command::write("1;5;Gauge-A"));
        assert_eq!(frame[0], SO);
        assert_eq!(&frame[1..12], b"1;5;Gauge-A");
        assert_eq!(frame[12], 190); // pinned: 255 - ((0x0E + sum of body) % 256)
        assert_eq!(frame[13], EOT);
        assert_eq!(frame.len(), 14);
    }

    #[test]
    fn decode_ack_with_payload() {
        assert_eq!(
            decode(&response(ACK, b"3.14")),
            Reply::Data("3.14".into())
        );
    }

    #[test]
    fn decode_ack_empty() {
        assert_eq!(decode(&response(ACK, b"")), Reply::Empty);
    }

    #[test]
    fn decode_nack_carries_detail() {
        assert_eq!(
            decode(&response(NACK, b"range")),
            Reply::Nack("range".into())
        );
    }

    #[test]
    fn decode_nack_at_minimum_length() {
        // exactly marker + checksum + EOT, detail is empty but valid
        assert_eq!(decode(&response(NACK, b"")), Reply::Nack(String::new()));
    }

    #[test]
    fn ack_wins_over_nack() {
        let mut raw = vec![ACK];
        raw.extend_from_slice(&[NACK, b'x']);
        raw.push(checksum(&raw));
        raw.push(EOT);
        match decode(&raw) {
            Reply::Data(_) => {}
            other => panic!("expected Data, got {other:?}"),
        }
    }

    #[test]
    fn roundtrip_body_through_synthetic_ack() {
        for body in ["1;29", "0;8", "2;5;COLD-HEAD", ""] {
            let reply = decode(&response(ACK, body.as_bytes()));
            if body.is_empty() {
                assert_eq!(reply, Reply::Empty);
            } else {
                assert_eq!(reply, Reply::Data(body.into()));
            }
        }
    }

    #[test]
    fn no_marker_is_malformed() {
        assert_eq!(decode(b""), Reply::Malformed);
        assert_eq!(decode(b"xy"), Reply::Malformed);
        assert_eq!(decode(b"no markers here\x04"), Reply::Malformed);
        // garbage of assorted lengths
        for len in 0..16usize {
            let raw: Vec<u8> = (0..len).map(|i| 0x30 + i as u8).collect();
            assert_eq!(decode(&raw), Reply::Malformed, "len {len}");
        }
    }

    #[test]
    fn truncated_frames_are_malformed() {
        // shorter than marker + checksum + EOT
        assert_eq!(decode(&[ACK, EOT]), Reply::Malformed);
        // missing terminator
        assert_eq!(decode(&[ACK, b'1', b'5', b'K']), Reply::Malformed);
        // marker with no room for the checksum tail
        assert_eq!(decode(&[b'x', ACK, EOT]), Reply::Malformed);
    }

    #[test]
    fn checksum_is_not_revalidated() {
        // stock behavior trusts ACK/NACK even with a corrupt checksum byte
        let mut raw = response(ACK, b"7.5e-3");
        let ck = raw.len() - 2;
        raw[ck] ^= 0xFF;
        assert_eq!(decode(&raw), Reply::Data("7.5e-3".into()));
    }

    #[test]
    fn latin1_payload_survives() {
        // 0xB5 is micro in Latin-1; must not be mangled as UTF-8
        let reply = decode(&response(ACK, &[0xB5, b'b', b'a', b'r']));
        assert_eq!(reply, Reply::Data("\u{B5}bar".into()));
    }
}
