//! Append-only bit writer used when building LOUDS images.
//!
//! Bits are packed LSB-first within each byte. There is no reader: the
//! resulting bytes are queried through `BitVectorIndex` rank/select.

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BitStreamError {
    #[error("bit must be 0 or 1, got {0}")]
    InvalidBit(u8),

    #[error("value {0} does not fit in 32 bits")]
    ValueOutOfRange(u64),
}

#[derive(Debug, Default, Clone)]
pub struct BitStream {
    image: Vec<u8>,
    num_bits: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single bit. Only 0 and 1 are accepted.
    pub fn push_bit(&mut self, bit: u8) -> Result<(), BitStreamError> {
        if bit > 1 {
            return Err(BitStreamError::InvalidBit(bit));
        }
        let offset = self.num_bits % 8;
        if offset == 0 {
            self.image.push(0);
        }
        if bit == 1 {
            // A byte was pushed above whenever offset == 0, so `last_mut` exists.
            if let Some(last) = self.image.last_mut() {
                *last |= 1 << offset;
            }
        }
        self.num_bits += 1;
        Ok(())
    }

    /// Pads the image with zero bytes up to a 4-byte boundary and realigns
    /// the logical bit count to the byte length.
    pub fn fill_padding32(&mut self) {
        while self.image.len() % 4 != 0 {
            self.image.push(0);
        }
        self.num_bits = self.image.len() * 8;
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn into_image(self) -> Vec<u8> {
        self.image
    }

    /// Appends `value` to `target` as 4 little-endian bytes.
    pub fn push_int32(value: u64, target: &mut Vec<u8>) -> Result<(), BitStreamError> {
        let value = u32::try_from(value).map_err(|_| BitStreamError::ValueOutOfRange(value))?;
        target.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_bits_lsb_first() {
        let mut bs = BitStream::new();
        for bit in [1, 0, 1, 1, 0, 0, 0, 0, 1] {
            bs.push_bit(bit).unwrap();
        }
        assert_eq!(bs.num_bits(), 9);
        assert_eq!(bs.image(), &[0b0000_1101, 0b0000_0001]);
    }

    #[test]
    fn push_bit_rejects_non_binary() {
        let mut bs = BitStream::new();
        assert_eq!(bs.push_bit(2), Err(BitStreamError::InvalidBit(2)));
        assert_eq!(bs.num_bits(), 0);
        assert!(bs.image().is_empty());
    }

    #[test]
    fn padding_rounds_up_to_multiple_of_four() {
        for len in 0..12usize {
            let mut bs = BitStream::new();
            for _ in 0..len * 8 {
                bs.push_bit(1).unwrap();
            }
            bs.fill_padding32();
            let expected = len.div_ceil(4) * 4;
            assert_eq!(bs.image().len(), expected, "len={len}");
            assert_eq!(bs.num_bits(), expected * 8);
        }
    }

    #[test]
    fn padding_realigns_partial_byte() {
        let mut bs = BitStream::new();
        bs.push_bit(1).unwrap();
        bs.push_bit(1).unwrap();
        bs.push_bit(0).unwrap();
        bs.fill_padding32();
        assert_eq!(bs.image(), &[0b11, 0, 0, 0]);
        assert_eq!(bs.num_bits(), 32);

        // Already aligned: nothing appended, count stays byte-based.
        bs.fill_padding32();
        assert_eq!(bs.image().len(), 4);
        assert_eq!(bs.num_bits(), 32);
    }

    #[test]
    fn push_int32_little_endian() {
        let mut buf = Vec::new();
        BitStream::push_int32(0x1234_5678, &mut buf).unwrap();
        BitStream::push_int32(u32::MAX as u64, &mut buf).unwrap();
        assert_eq!(buf, [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF]);
        let back = u32::from_le_bytes(buf[..4].try_into().unwrap());
        assert_eq!(back, 0x1234_5678);
    }

    #[test]
    fn push_int32_rejects_overflow() {
        let mut buf = Vec::new();
        assert_eq!(
            BitStream::push_int32(1 << 32, &mut buf),
            Err(BitStreamError::ValueOutOfRange(1 << 32))
        );
        assert!(buf.is_empty());
    }
}
