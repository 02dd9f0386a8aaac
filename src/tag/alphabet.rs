use crate::runtime::{Error, Result};

/// Marks bytes that are not part of an alphabet
const NO_SYMBOL: u8 = 0xFF;

////////////////
/// Lookup table for 0123. Maps to 0..3
const NUMERIC_LOOKUP: [u8; 256] = {
    let mut table = [NO_SYMBOL; 256];
    table[b'0' as usize] = 0;
    table[b'1' as usize] = 1;
    table[b'2' as usize] = 2;
    table[b'3' as usize] = 3;
    table
};

////////////////
/// Lookup table for ACGT, either case. Maps to 0..3 in alphabetical order, so that the order of
/// encoded tags is the order of the literals
const DNA_LOOKUP: [u8; 256] = {
    let mut table = [NO_SYMBOL; 256];
    table[b'A' as usize] = 0;
    table[b'C' as usize] = 1;
    table[b'G' as usize] = 2;
    table[b'T' as usize] = 3;
    table[b'a' as usize] = 0;
    table[b'c' as usize] = 1;
    table[b'g' as usize] = 2;
    table[b't' as usize] = 3;
    table
};

const NUMERIC_REVERSE: [u8; 4] = [b'0', b'1', b'2', b'3'];
const DNA_REVERSE: [u8; 4] = [b'A', b'C', b'G', b'T'];

///////////////////////////////
/// How tags are written as text. Both alphabets map onto the same 4 symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TagAlphabet {
    /// Symbols written as 0123
    #[default]
    Numeric,
    /// Symbols written as ACGT
    Dna,
}

impl TagAlphabet {
    #[inline(always)]
    fn lookup(&self) -> &'static [u8; 256] {
        match self {
            TagAlphabet::Numeric => &NUMERIC_LOOKUP,
            TagAlphabet::Dna => &DNA_LOOKUP,
        }
    }

    #[inline(always)]
    fn reverse(&self) -> &'static [u8; 4] {
        match self {
            TagAlphabet::Numeric => &NUMERIC_REVERSE,
            TagAlphabet::Dna => &DNA_REVERSE,
        }
    }

    ////////////////
    /// Symbol value of one literal character
    #[inline(always)]
    pub fn symbol_of(&self, c: u8, position: usize) -> Result<u8> {
        match self.lookup()[c as usize] {
            NO_SYMBOL => Err(Error::InvalidSymbol {
                symbol: (c as char).to_string(),
                position,
            }),
            s => Ok(s),
        }
    }

    ////////////////
    /// Convert a literal such as "0312" or "ACTG" to symbol values
    pub fn to_symbols(&self, literal: &[u8]) -> Result<Vec<u8>> {
        literal
            .iter()
            .enumerate()
            .map(|(i, &c)| self.symbol_of(c, i))
            .collect()
    }

    ////////////////
    /// Convert symbol values back to a literal
    pub fn to_literal(&self, symbols: &[u8]) -> Result<String> {
        let reverse = self.reverse();
        let mut out = String::with_capacity(symbols.len());
        for (i, &s) in symbols.iter().enumerate() {
            match reverse.get(s as usize) {
                Some(&c) => out.push(c as char),
                None => {
                    return Err(Error::InvalidSymbol {
                        symbol: s.to_string(),
                        position: i,
                    })
                }
            }
        }
        Ok(out)
    }
}
