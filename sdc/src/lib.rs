#![doc = include_str!("../README.md")]

use std::io;

use binout::{AsIs, Serializer};
use bitm::{select64, BitAccess};
use bitm::sdcvec::{BitBuffer, RankSelectVec, RANK_SAMPLE_BITS, SELECT_SAMPLE_ONES};
use dyn_size_of::GetSize;

/// Append-only array of non-negative integers, coded with *Simple Dense Coding* and indexed
/// by a rank/select bit vector so that [`Array::get`] never scans preceding codes.
///
/// Each value `v` is stored as a self-delimiting code of `length = floor(log2(v+2))` bits;
/// the index carries, for every code, a single marker bit at the code's starting offset.
/// `add` is amortized O(1); `get` is worst-case O(1), both independent of the array's length.
#[derive(Clone)]
pub struct Array {
    payload: BitBuffer,
    index: RankSelectVec,
    len: usize,
}

impl Default for Array {
    #[inline] fn default() -> Self { Self::new() }
}

impl Array {
    /// Constructs an empty array. A sentinel one-bit is seeded into the index so that the
    /// first value added occupies a well-defined starting offset.
    pub fn new() -> Self {
        let mut index = RankSelectVec::new();
        index.append(1, 1);
        Self { payload: BitBuffer::new(), index, len: 0 }
    }

    /// Appends `v` to the array.
    ///
    /// Panics if `v` is so large that `v + 2` would overflow `u64` (out of contract; see the
    /// crate-level docs on the `+2` bias). `v + 2` always fits within 64 bits otherwise, so the
    /// encoded length is always in `[1, 63]`.
    pub fn add(&mut self, v: u64) {
        let biased = v.checked_add(2).expect("sdc::Array::add: value too large to encode (v+2 overflows u64)");
        let length = (63 - biased.leading_zeros()) as u8;
        debug_assert!((1..=63).contains(&length), "sdc::Array::add: encoded length {length} out of range");
        let code = biased - (1u64 << length);
        self.payload.append(code, length);
        self.index.append(1, length);
        self.len += 1;
    }

    /// Returns the value at index `i`, or `None` if `i >= self.len()`.
    #[inline] pub fn get(&self, i: usize) -> Option<u64> {
        (i < self.len).then(|| unsafe { self.get_unchecked(i) })
    }

    /// Returns the value at index `i`. Panics if `i >= self.len()`.
    #[inline] pub fn get_or_panic(&self, i: usize) -> u64 {
        self.get(i).expect("sdc::Array::get: index out of bounds")
    }

    /// Returns the value at index `i`. The result is undefined (but safe) if `i >= self.len()`.
    unsafe fn get_unchecked(&self, i: usize) -> u64 {
        let start = self.index.select1(i as u64 + 2);
        let length = self.code_length_at(start);
        // the index carries one more (sentinel) bit than the payload, so the code's
        // payload offset always trails its index offset by exactly one bit
        let code = self.payload.get(start - 1, length);
        code + (1u64 << length) - 2
    }

    /// Returns the length, in bits, of the code that starts at bit offset `start` of the
    /// index: the position of the marker's successor one-bit, counted from `start`, or the
    /// distance to the end of the index if `start`'s code is the last one stored.
    fn code_length_at(&self, start: usize) -> u8 {
        let window_len = (self.index.len() - start).min(64) as u8;
        let window = self.index.get(start, window_len);
        if window.count_ones() >= 2 {
            select64(window, 1)
        } else {
            window_len
        }
    }

    /// Returns the number of values stored.
    #[inline] pub fn len(&self) -> usize { self.len }

    /// Returns `true` if no value has been added yet.
    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Releases any excess capacity `add` has reserved in the payload and index. Call at a
    /// quiescent point (no more `add`s expected) so that [`GetSize::size_bytes`] reports the
    /// same footprint before and after a [`Self::write`]/[`Self::read`] round trip — `add`
    /// grows its backing vectors geometrically, so a freshly-built array typically holds more
    /// capacity than one reconstructed by `read`, which allocates exactly what it needs.
    pub fn shrink_to_fit(&mut self) {
        self.payload.shrink_to_fit();
        self.index.shrink_to_fit();
    }

    /// Returns an iterator that yields the stored values in insertion order, walking the
    /// index's marker bits and the payload in lockstep rather than calling
    /// [`select1`](RankSelectVec::select1) once per item.
    pub fn iter(&self) -> Iter {
        Iter { array: self, index_pos: if self.len == 0 { 0 } else { 1 }, payload_pos: 0, remaining: self.len }
    }

    /// Returns the number of bytes which [`Self::write`] will write.
    pub fn write_bytes(&self) -> usize {
        const U64_BYTES: usize = std::mem::size_of::<u64>();
        2 * U64_BYTES // format tag: Sr, Ss
            + U64_BYTES + AsIs::array_size(self.payload.words())
            + 2 * U64_BYTES + AsIs::array_size(self.index.content())
            + AsIs::array_size(self.index.rank_samples())
            + AsIs::array_size(self.index.select_samples())
            + U64_BYTES // length
    }

    /// Writes `self` to `output` in a byte-exact format tagged with the `(Sr, Ss)` sampling
    /// densities this build was compiled with.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        AsIs::write(output, RANK_SAMPLE_BITS as u64)?;
        AsIs::write(output, SELECT_SAMPLE_ONES)?;

        AsIs::write(output, self.payload.len() as u64)?;
        AsIs::write_array(output, self.payload.words())?;

        AsIs::write(output, self.index.len() as u64)?;
        AsIs::write(output, self.index.count_ones())?;
        AsIs::write_array(output, self.index.content())?;
        AsIs::write_array(output, self.index.rank_samples())?;
        AsIs::write_array(output, self.index.select_samples())?;

        AsIs::write(output, self.len as u64)?;
        Ok(())
    }

    /// Reads an array previously written by [`Self::write`].
    ///
    /// Returns an error (rather than panicking) if the stream is truncated, was written with
    /// different `(Sr, Ss)` sampling densities, or does not reconcile to a consistent
    /// `(payload_bits, index_bits, length)` triple.
    pub fn read(input: &mut dyn io::Read) -> io::Result<Self> {
        let sr: u64 = AsIs::read(input)?;
        let ss: u64 = AsIs::read(input)?;
        if sr != RANK_SAMPLE_BITS as u64 || ss != SELECT_SAMPLE_ONES {
            return Err(io::Error::new(io::ErrorKind::InvalidData, format!(
                "sdc: stream was written with (Sr={sr}, Ss={ss}) sampling, incompatible with this build's (Sr={}, Ss={})",
                RANK_SAMPLE_BITS, SELECT_SAMPLE_ONES)));
        }

        let payload_bits: u64 = AsIs::read(input)?;
        let payload_words: Vec<u64> = AsIs::read_array(input)?;
        let payload = BitBuffer::from_parts(payload_words, payload_bits as usize);

        let index_bits: u64 = AsIs::read(input)?;
        let index_ones: u64 = AsIs::read(input)?;
        let index_content: Vec<u64> = AsIs::read_array(input)?;
        let rank_samples: Vec<u64> = AsIs::read_array(input)?;
        let select_samples: Vec<u64> = AsIs::read_array(input)?;
        let index = RankSelectVec::from_parts(index_content, index_bits as usize, index_ones, rank_samples, select_samples);

        let len: u64 = AsIs::read(input)?;

        if index_bits == 0 || payload_bits != index_bits - 1 {
            return Err(io::Error::new(io::ErrorKind::InvalidData,
                "sdc: payload bit length is inconsistent with index bit length"));
        }
        if index_ones != len + 1 {
            return Err(io::Error::new(io::ErrorKind::InvalidData,
                "sdc: one-bit count in the index is inconsistent with the declared length"));
        }

        Ok(Self { payload, index, len: len as usize })
    }
}

impl GetSize for Array {
    fn size_bytes_dyn(&self) -> usize {
        self.payload.size_bytes_dyn() + self.index.size_bytes_dyn()
    }
    fn size_bytes_content_dyn(&self) -> usize {
        self.payload.size_bytes_content_dyn() + self.index.size_bytes_content_dyn()
    }
    const USES_DYN_MEM: bool = true;
}

/// Iterator over the values of an [`Array`], returned by [`Array::iter`].
pub struct Iter<'a> {
    array: &'a Array,
    index_pos: usize,
    payload_pos: usize,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 { return None; }
        let content = self.array.index.content();
        let length = match content.find_bit_one(self.index_pos + 1) {
            Some(next_marker) => (next_marker - self.index_pos) as u8,
            None => (self.array.index.len() - self.index_pos) as u8,
        };
        let code = self.array.payload.get(self.payload_pos, length);
        self.index_pos += length as usize;
        self.payload_pos += length as usize;
        self.remaining -= 1;
        Some(code + (1u64 << length) - 2)
    }

    #[inline] fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

impl<'a> IntoIterator for &'a Array {
    type Item = u64;
    type IntoIter = Iter<'a>;
    #[inline] fn into_iter(self) -> Iter<'a> { self.iter() }
}
