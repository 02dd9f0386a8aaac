use std::io::{self, Read, Write};

use crate::runtime::{Error, Result};

///////////////////////////////
/// Layout of a neighbor graph file. All integers are little-endian u64, probabilities f64:
///
/// ```text
/// signature           16 bytes, "recountGraph000\n"
/// node count          u64
/// node count times:
///     tag id          u64
///     neighbor count  u64
///     neighbor count times: tag id u64, probability f64
/// ```
pub const SIGNATURE: &[u8; 16] = b"recountGraph000\n";

/// Where the node count lives; the seekable writer comes back here when it is done
pub const NODE_COUNT_OFFSET: u64 = SIGNATURE.len() as u64;

/// Offset of the first record
pub const HEADER_SIZE: u64 = NODE_COUNT_OFFSET + 8;

/// Bytes per (tag id, probability) pair
pub const EDGE_SIZE: usize = 16;

pub fn write_header<W: Write>(writer: &mut W, node_count: u64) -> io::Result<()> {
    writer.write_all(SIGNATURE)?;
    writer.write_all(&node_count.to_le_bytes())
}

///////////////////////////////
/// Check the signature and return the node count
pub fn read_header<R: Read>(reader: &mut R) -> Result<u64> {
    let mut signature = [0u8; SIGNATURE.len()];
    let n = read_up_to(reader, &mut signature)?;
    if n < signature.len() || &signature != SIGNATURE {
        return Err(Error::BadSignature {
            found: String::from_utf8_lossy(&signature[..n]).into_owned(),
            expected: String::from_utf8_lossy(SIGNATURE).into_owned(),
        });
    }

    let mut count = [0u8; 8];
    if read_up_to(reader, &mut count)? < count.len() {
        return Err(Error::corrupt_data(Some(
            "graph header ended before the node count",
        )));
    }
    Ok(u64::from_le_bytes(count))
}

///////////////////////////////
/// Like read_exact, but reports how much was read instead of failing at end of input
pub fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
