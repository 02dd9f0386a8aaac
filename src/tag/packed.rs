use std::fmt;
use std::io::{self, Read, Write};

use super::TagAlphabet;
use crate::runtime::{Error, Result};

/// Longest sequence that fits the u16 length field
pub const MAX_TAG_LEN: usize = u16::MAX as usize;

///////////////////////////////
/// A sequence of small symbols packed 8/BITS to a byte.
///
/// Symbol i lives in byte i / (8/BITS), at sub-index i % (8/BITS), where sub-index 0 holds the
/// most significant bits. With that placement and zeroed padding, comparing the packed bytes and
/// then the length gives the same order as comparing the symbols one by one, so the derived Ord
/// is the lexicographic order of the sequence.
///
/// On disk a sequence is a little-endian u16 length followed by the packed bytes.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackedSeq<const BITS: u32> {
    //Field order matters for the derived Ord
    packed: Box<[u8]>,
    len: u16,
}

/// Tags over a 4 letter alphabet, 4 symbols per byte
pub type PackedTag = PackedSeq<2>;

impl<const BITS: u32> PackedSeq<BITS> {
    pub const SYMBOLS_PER_BYTE: usize = (8 / BITS) as usize;
    pub const ALPHABET_SIZE: u16 = 1 << BITS;
    const MASK: u8 = ((1u16 << BITS) - 1) as u8;

    const PACK_FACTOR_IS_VALID: () = assert!(
        BITS == 1 || BITS == 2 || BITS == 4 || BITS == 8,
        "BITS must divide 8"
    );

    #[inline(always)]
    fn shift(i: usize) -> u32 {
        8 - BITS * ((i % Self::SYMBOLS_PER_BYTE) as u32 + 1)
    }

    ////////////////
    /// Number of packed bytes for a sequence of the given length
    #[inline(always)]
    pub fn byte_len_for(len: usize) -> usize {
        len.div_ceil(Self::SYMBOLS_PER_BYTE)
    }

    ////////////////
    /// Pack symbol values. Each value must be below the alphabet size
    pub fn encode(symbols: &[u8]) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::PACK_FACTOR_IS_VALID;

        if symbols.len() > MAX_TAG_LEN {
            return Err(Error::TagTooLong {
                len: symbols.len(),
                max: MAX_TAG_LEN,
            });
        }

        let mut packed = vec![0u8; Self::byte_len_for(symbols.len())];
        for (i, &s) in symbols.iter().enumerate() {
            if s as u16 >= Self::ALPHABET_SIZE {
                return Err(Error::InvalidSymbol {
                    symbol: s.to_string(),
                    position: i,
                });
            }
            packed[i / Self::SYMBOLS_PER_BYTE] |= s << Self::shift(i);
        }

        Ok(Self {
            packed: packed.into_boxed_slice(),
            len: symbols.len() as u16,
        })
    }

    ////////////////
    /// Parse a text literal, e.g. "0312" or "ACTG"
    pub fn from_literal(literal: &[u8], alphabet: TagAlphabet) -> Result<Self> {
        Self::encode(&alphabet.to_symbols(literal)?)
    }

    ////////////////
    /// Unpack all symbols
    pub fn decode(&self) -> Vec<u8> {
        (0..self.len()).map(|i| self.symbol_unchecked(i)).collect()
    }

    pub fn to_literal(&self, alphabet: TagAlphabet) -> Result<String> {
        alphabet.to_literal(&self.decode())
    }

    #[inline(always)]
    fn symbol_unchecked(&self, i: usize) -> u8 {
        (self.packed[i / Self::SYMBOLS_PER_BYTE] >> Self::shift(i)) & Self::MASK
    }

    ////////////////
    /// Symbol at position i
    #[inline]
    pub fn get(&self, i: usize) -> Result<u8> {
        if i >= self.len() {
            return Err(Error::index_out_of_range("tag", i, self.len()));
        }
        Ok(self.symbol_unchecked(i))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The packed bytes, without the length
    pub fn as_bytes(&self) -> &[u8] {
        &self.packed
    }

    pub fn serialized_len(&self) -> usize {
        2 + self.packed.len()
    }

    ////////////////
    /// Write length and packed bytes
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.len.to_le_bytes())?;
        writer.write_all(&self.packed)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        out.extend_from_slice(&self.len.to_le_bytes());
        out.extend_from_slice(&self.packed);
        out
    }

    ////////////////
    /// Read one sequence written by write_to. A short read is corrupt data, not an I/O error
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut len_buf = [0u8; 2];
        read_exact_or_corrupt(reader, &mut len_buf, "sequence length")?;
        let len = u16::from_le_bytes(len_buf);

        let mut packed = vec![0u8; Self::byte_len_for(len as usize)];
        read_exact_or_corrupt(reader, &mut packed, "packed sequence bytes")?;

        Self::from_parts(len, packed)
    }

    ////////////////
    /// Parse exactly one serialized sequence; trailing or missing bytes are an error
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::corrupt_data(Some(format!(
                "{} bytes is too short for a sequence length",
                bytes.len()
            ))));
        }
        let len = u16::from_le_bytes([bytes[0], bytes[1]]);
        let expected = Self::byte_len_for(len as usize);
        if bytes.len() - 2 != expected {
            return Err(Error::corrupt_data(Some(format!(
                "length {} needs {} packed bytes but {} were given",
                len,
                expected,
                bytes.len() - 2
            ))));
        }
        Self::from_parts(len, bytes[2..].to_vec())
    }

    fn from_parts(len: u16, packed: Vec<u8>) -> Result<Self> {
        let seq = Self {
            packed: packed.into_boxed_slice(),
            len,
        };
        //Padding must be zero, otherwise equal sequences would compare unequal
        let capacity = seq.packed.len() * Self::SYMBOLS_PER_BYTE;
        if (seq.len()..capacity).any(|i| seq.symbol_unchecked(i) != 0) {
            return Err(Error::corrupt_data(Some("non-zero padding bits")));
        }
        Ok(seq)
    }
}

fn read_exact_or_corrupt<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::corrupt_data(Some(format!("input ended while reading {}", what)))
        } else {
            Error::Io(e)
        }
    })
}

impl<const BITS: u32> fmt::Debug for PackedSeq<BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackedSeq<{}>(\"", BITS)?;
        for s in self.decode() {
            if BITS <= 2 {
                write!(f, "{}", s)?;
            } else {
                write!(f, "{:02x}", s)?;
            }
        }
        write!(f, "\")")
    }
}
