use std::io::{Read, Seek, Write};

use super::reader::NeighborGraphReader;
use crate::runtime::Result;
use crate::tag::{TagAlphabet, TagUniverse};

///////////////////////////////
/// Write every record as `tag (neighbor,prob) (neighbor,prob) ...`, one per line
pub fn dump_graph<R: Read + Seek, W: Write>(
    reader: &mut NeighborGraphReader<R>,
    universe: &TagUniverse,
    alphabet: TagAlphabet,
    out: &mut W,
) -> Result<u64> {
    let mut num_records = 0;
    reader.for_each_record(|list| {
        write!(out, "{}", universe.literal_of(list.id(), alphabet)?)?;
        for e in list {
            write!(out, " ({},{})", universe.literal_of(e.id, alphabet)?, e.prob)?;
        }
        writeln!(out)?;
        num_records += 1;
        Ok(())
    })?;
    Ok(num_records)
}
