/// One-byte checksum used on both directions of the wire.
///
/// Sum of all input bytes modulo 256, complemented from 255. A result below
/// 32 is lifted by 32 so the checksum never lands on a control character.
/// Total over any input, including the empty slice.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    let c = 255 - sum;
    if c < 32 { c + 32 } else { c }
}
