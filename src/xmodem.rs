//! XMODEM-CRC framing helper for the host-to-guest RomWBW package upload
//! workflow. Stateless with respect to the core: it only builds and parses
//! frames over the console byte stream described in the external
//! interfaces; a CLI or frontend drives the transfer loop itself.

/// Block start byte.
pub const SOH: u8 = 0x01;
/// End-of-transmission byte the sender emits after the last block.
pub const EOT: u8 = 0x04;
pub const ACK: u8 = 0x06;
pub const NAK: u8 = 0x15;
pub const CAN: u8 = 0x18;
/// Receiver's CRC-mode transfer request.
pub const CRC_REQUEST: u8 = b'C';

const PAYLOAD_LEN: usize = 128;
const PAD_BYTE: u8 = 0x1A;

/// CRC-16/XMODEM: polynomial 0x1021, initial value 0, no input/output
/// reflection.
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &b in data {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 { (crc << 1) ^ 0x1021 } else { crc << 1 };
        }
    }
    crc
}

/// A single 128-byte XMODEM-CRC block: SOH, block number, its one's
/// complement, 128 payload bytes, then the CRC over the payload.
pub struct Frame {
    pub block_number: u8,
    pub payload: [u8; PAYLOAD_LEN],
}

impl Frame {
    /// Build a frame from up to 128 bytes, padding any remainder with
    /// 0x1A as the protocol requires.
    pub fn new(block_number: u8, data: &[u8]) -> Self {
        let mut payload = [PAD_BYTE; PAYLOAD_LEN];
        let n = data.len().min(PAYLOAD_LEN);
        payload[..n].copy_from_slice(&data[..n]);
        Frame { block_number, payload }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + PAYLOAD_LEN);
        out.push(SOH);
        out.push(self.block_number);
        out.push(!self.block_number);
        out.extend_from_slice(&self.payload);
        let crc = crc16_xmodem(&self.payload);
        out.push((crc >> 8) as u8);
        out.push(crc as u8);
        out
    }

    /// Parse a complete frame as produced by [`Frame::encode`], rejecting
    /// it if the block-number complement or the CRC doesn't check out.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 5 + PAYLOAD_LEN || bytes[0] != SOH {
            return None;
        }
        let block_number = bytes[1];
        if bytes[2] != !block_number {
            return None;
        }
        let payload_slice = &bytes[3..3 + PAYLOAD_LEN];
        let crc = ((bytes[3 + PAYLOAD_LEN] as u16) << 8) | bytes[4 + PAYLOAD_LEN] as u16;
        if crc16_xmodem(payload_slice) != crc {
            return None;
        }
        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(payload_slice);
        Some(Frame { block_number, payload })
    }
}

/// Block numbers run 1..=255 and wrap back to 1 (0 is never used).
pub fn next_block_number(current: u8) -> u8 {
    if current == 255 {
        1
    } else {
        current + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_of_empty_input_is_zero() {
        assert_eq!(crc16_xmodem(&[]), 0);
    }

    #[test]
    fn matches_the_standard_check_value() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }

    #[test]
    fn encode_then_decode_round_trips_a_short_payload() {
        let mut data = [0u8; 100];
        for (i, b) in data.iter_mut().enumerate() {
            *b = i as u8;
        }
        let frame = Frame::new(1, &data);
        let encoded = frame.encode();
        let decoded = Frame::decode(&encoded).unwrap();
        assert_eq!(decoded.block_number, 1);
        assert_eq!(&decoded.payload[..100], &data[..]);
        assert_eq!(&decoded.payload[100..], &[PAD_BYTE; 28][..]);
    }

    #[test]
    fn decode_rejects_a_corrupted_crc() {
        let frame = Frame::new(2, b"hello");
        let mut encoded = frame.encode();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        assert!(Frame::decode(&encoded).is_none());
    }

    #[test]
    fn decode_rejects_a_bad_block_complement() {
        let frame = Frame::new(3, b"hello");
        let mut encoded = frame.encode();
        encoded[2] ^= 0xFF;
        assert!(Frame::decode(&encoded).is_none());
    }

    #[test]
    fn block_number_wraps_from_255_to_1() {
        assert_eq!(next_block_number(255), 1);
        assert_eq!(next_block_number(1), 2);
    }
}
