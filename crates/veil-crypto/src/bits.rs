//! Lazy bit sequences over byte buffers.
//!
//! Bits are read and packed most-significant-bit first, so
//! `pack_bits(bits_of(b)) == b` for every buffer `b`.

/// MSB-first view of a byte slice as a sequence of bits.
#[derive(Debug, Clone)]
pub struct Bits<'a> {
    bytes: &'a [u8],
    index: usize,
}

/// Iterate the bits of `bytes`, most significant bit of each byte first.
pub fn bits_of(bytes: &[u8]) -> Bits<'_> {
    Bits { bytes, index: 0 }
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        let byte = *self.bytes.get(self.index / 8)?;
        let bit = (byte >> (7 - self.index % 8)) & 1 == 1;
        self.index += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() * 8 - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Bits<'_> {}

/// Pack a bit sequence back into bytes, MSB first.
///
/// A trailing partial byte is zero-filled on the low side.
pub fn pack_bits<I>(bits: I) -> Vec<u8>
where
    I: IntoIterator<Item = bool>,
{
    let bits = bits.into_iter();
    let mut out = Vec::with_capacity(bits.size_hint().0.div_ceil(8));
    let mut current = 0u8;
    let mut filled = 0u8;
    for bit in bits {
        current = (current << 1) | u8::from(bit);
        filled += 1;
        if filled == 8 {
            out.push(current);
            current = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        out.push(current << (8 - filled));
    }
    out
}

/// Element-wise XOR of two bit sequences. Ends with the shorter input.
#[derive(Debug, Clone)]
pub struct Xor<A, B> {
    a: A,
    b: B,
}

/// Lazily combine two bit sequences with XOR.
pub fn xor_bits<A, B>(a: A, b: B) -> Xor<A::IntoIter, B::IntoIter>
where
    A: IntoIterator<Item = bool>,
    B: IntoIterator<Item = bool>,
{
    Xor {
        a: a.into_iter(),
        b: b.into_iter(),
    }
}

impl<A, B> Iterator for Xor<A, B>
where
    A: Iterator<Item = bool>,
    B: Iterator<Item = bool>,
{
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        Some(self.a.next()? ^ self.b.next()?)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (a_low, a_high) = self.a.size_hint();
        let (b_low, b_high) = self.b.size_hint();
        let high = match (a_high, b_high) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        };
        (a_low.min(b_low), high)
    }
}
