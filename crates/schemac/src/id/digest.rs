//! Incremental MD5 (RFC 1321) used for implicit schema IDs.
//!
//! MD5 is not used here for security. It is the frozen input-to-ID mapping
//! that previously compiled schemas depend on, so the output must stay
//! bit-identical to the reference algorithm.

const BLOCK_LEN: usize = 64;

/// Initial chaining values.
const INIT_STATE: [u32; 4] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476];

/// Left-rotation amounts, four per round.
const SHIFTS: [u32; 16] = [7, 12, 17, 22, 5, 9, 14, 20, 4, 11, 16, 23, 6, 10, 15, 21];

/// Per-step additive constants.
const K: [u32; 64] = [
    // Round 1
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613, 0xfd469501,
    0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193, 0xa679438e, 0x49b40821,
    // Round 2
    0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d, 0x02441453, 0xd8a1e681, 0xe7d3fbc8,
    0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed, 0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a,
    // Round 3
    0xfffa3942, 0x8771f681, 0x6d9d6122, 0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70,
    0x289b7ec6, 0xeaa127fa, 0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665,
    // Round 4
    0xf4292244, 0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb, 0xeb86d391,
];

/// Streaming MD5 accumulator.
///
/// Feed input with [`absorb`](Self::absorb) in chunks of any size, then call
/// [`finish`](Self::finish) once. Chunk boundaries never affect the result.
#[derive(Debug, Clone)]
pub struct StreamingDigest {
    state: [u32; 4],
    /// Total bytes absorbed, modulo 2^64.
    len: u64,
    buffer: [u8; BLOCK_LEN],
    buffered: usize,
    result: Option<[u8; 16]>,
}

impl Default for StreamingDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingDigest {
    /// Creates an empty digest.
    pub fn new() -> Self {
        Self {
            state: INIT_STATE,
            len: 0,
            buffer: [0u8; BLOCK_LEN],
            buffered: 0,
            result: None,
        }
    }

    /// Digests `data` in a single call.
    pub fn digest(data: &[u8]) -> [u8; 16] {
        let mut digest = Self::new();
        digest.absorb(data);
        digest.finish()
    }

    /// Returns true once [`finish`](Self::finish) has been called.
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Absorbs more input.
    ///
    /// # Panics
    ///
    /// Panics if the digest has already been finished.
    pub fn absorb(&mut self, data: &[u8]) {
        assert!(
            self.result.is_none(),
            "StreamingDigest::absorb() called after finish()"
        );
        self.len = self.len.wrapping_add(data.len() as u64);
        self.update(data);
    }

    /// Pads the input, processes the final block(s) and returns the digest.
    ///
    /// Further calls return the cached digest.
    pub fn finish(&mut self) -> [u8; 16] {
        if let Some(result) = self.result {
            return result;
        }

        let bit_len = self.len.wrapping_mul(8);

        // 0x80, zeros up to 56 mod 64, then the 64-bit length.
        let mut padding = [0u8; BLOCK_LEN + 8];
        padding[0] = 0x80;
        let pad_len = if self.buffered < 56 {
            56 - self.buffered
        } else {
            120 - self.buffered
        };
        self.update(&padding[..pad_len]);
        self.update(&bit_len.to_le_bytes());
        debug_assert_eq!(self.buffered, 0);

        let mut out = [0u8; 16];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        self.result = Some(out);
        out
    }

    /// Buffers `data` and compresses every full block. Does not touch `len`.
    fn update(&mut self, mut data: &[u8]) {
        if self.buffered > 0 {
            let free = BLOCK_LEN - self.buffered;
            if data.len() < free {
                self.buffer[self.buffered..self.buffered + data.len()].copy_from_slice(data);
                self.buffered += data.len();
                return;
            }
            self.buffer[self.buffered..].copy_from_slice(&data[..free]);
            data = &data[free..];
            compress(&mut self.state, &self.buffer);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            compress(&mut self.state, block);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }
}

/// Runs the four MD5 rounds over one 64-byte block.
fn compress(state: &mut [u32; 4], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);

    let mut x = [0u32; 16];
    for (word, bytes) in x.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;

    for i in 0..64 {
        let round = i / 16;
        let (f, g) = match round {
            0 => (d ^ (b & (c ^ d)), i),
            1 => (c ^ (d & (b ^ c)), (5 * i + 1) % 16),
            2 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };

        let sum = a.wrapping_add(f).wrapping_add(K[i]).wrapping_add(x[g]);
        let rotated = sum.rotate_left(SHIFTS[round * 4 + i % 4]);

        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(rotated);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}
