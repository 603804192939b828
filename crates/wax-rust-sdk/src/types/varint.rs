//! Unsigned LEB128 variable-length integers.
//!
//! Every list length, byte-string length and resource-limit field of a
//! packed transaction uses this encoding.

/// Stateless varint writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarintCodec;

impl VarintCodec {
    /// Encodes `value` into a fresh buffer.
    pub fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity(10);
        Self::write(value, &mut out);
        out
    }

    /// Appends the encoding of `value` to `out`.
    pub fn write(mut value: u64, out: &mut Vec<u8>) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                out.push(byte);
                return;
            }
            out.push(byte | 0x80);
        }
    }

    /// Appends a length prefix.
    pub fn write_len(len: usize, out: &mut Vec<u8>) {
        Self::write(len as u64, out);
    }
}
