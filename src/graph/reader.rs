use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::format::{read_header, read_up_to, HEADER_SIZE};
use super::neighbor_list::NeighborList;
use crate::runtime::{Error, Result};

///////////////////////////////
/// Forward-only cursor over the records of a neighbor graph file.
///
/// The current record lives in one reused NeighborList; copy it out if it must outlive the
/// next read_next().
pub struct NeighborGraphReader<R: Read + Seek> {
    source: R,
    start: u64,
    node_count: u64,
    records_read: u64,
    current: NeighborList,
}

impl NeighborGraphReader<BufReader<File>> {
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::file_not_found(path),
            _ => Error::Io(e),
        })?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> NeighborGraphReader<R> {
    ///////////////////////////////
    /// Check the signature at the current position and read the node count
    pub fn open(mut source: R) -> Result<Self> {
        let start = source.stream_position()?;
        let node_count = read_header(&mut source)?;
        log::debug!("Opened graph with {} nodes", node_count);
        Ok(Self {
            source,
            start,
            node_count,
            records_read: 0,
            current: NeighborList::default(),
        })
    }

    /// Number of records the header declares
    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    ///////////////////////////////
    /// Go back to the first record
    pub fn rewind(&mut self) -> Result<()> {
        self.source.seek(SeekFrom::Start(self.start + HEADER_SIZE))?;
        self.records_read = 0;
        Ok(())
    }

    ///////////////////////////////
    /// Decode the next record into current(). Returns false once all records are read
    pub fn read_next(&mut self) -> Result<bool> {
        if self.records_read == self.node_count {
            //Anything after the last declared record means the count is wrong
            let mut probe = [0u8; 1];
            if read_up_to(&mut self.source, &mut probe)? > 0 {
                return Err(Error::NodeCountMismatch {
                    declared: self.node_count,
                    found: self.records_read + 1,
                });
            }
            return Ok(false);
        }

        if self.current.read_from(&mut self.source, self.records_read)? {
            self.records_read += 1;
            Ok(true)
        } else {
            Err(Error::NodeCountMismatch {
                declared: self.node_count,
                found: self.records_read,
            })
        }
    }

    pub fn current(&self) -> &NeighborList {
        &self.current
    }

    ///////////////////////////////
    /// Rewind and call f on every record in file order
    pub fn for_each_record<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&NeighborList) -> Result<()>,
    {
        self.rewind()?;
        while self.read_next()? {
            f(&self.current)?;
        }
        Ok(())
    }

    ///////////////////////////////
    /// One more than the largest tag id mentioned anywhere in the graph
    pub fn id_bound(&mut self) -> Result<usize> {
        let mut bound = 0;
        self.for_each_record(|list| {
            bound = bound.max(list.id() + 1);
            for e in list {
                bound = bound.max(e.id + 1);
            }
            Ok(())
        })?;
        Ok(bound)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::format::{write_header, SIGNATURE};
    use crate::graph::writer::NeighborGraphWriter;
    use crate::graph::NeighborEdge;
    use std::io::Cursor;

    fn small_graph() -> Vec<u8> {
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), Default::default()).unwrap();
        writer.append(0, &[(1, 0.1)]).unwrap();
        writer.append(1, &[]).unwrap();
        writer.append(4, &[(0, 0.25), (1, 0.25)]).unwrap();
        writer.finish().unwrap().0.into_inner()
    }

    #[test]
    fn reads_records_in_order() {
        let mut reader = NeighborGraphReader::open(Cursor::new(small_graph())).unwrap();
        assert_eq!(reader.node_count(), 3);

        let mut ids = Vec::new();
        while reader.read_next().unwrap() {
            ids.push(reader.current().id());
        }
        assert_eq!(ids, vec![0, 1, 4]);
        assert!(!reader.read_next().unwrap());

        reader.rewind().unwrap();
        assert!(reader.read_next().unwrap());
        assert_eq!(
            reader.current().edges(),
            &[NeighborEdge::new(1, 0.1), NeighborEdge::new(0, 0.9)]
        );
        assert_eq!(reader.id_bound().unwrap(), 5);
    }

    #[test]
    fn empty_graph() {
        let mut buf = Vec::new();
        write_header(&mut buf, 0).unwrap();
        let mut reader = NeighborGraphReader::open(Cursor::new(buf)).unwrap();
        assert!(!reader.read_next().unwrap());
    }

    #[test]
    fn bad_signature() {
        let mut buf = small_graph();
        buf[0] = b'R';
        assert!(matches!(
            NeighborGraphReader::open(Cursor::new(buf)),
            Err(Error::BadSignature { .. })
        ));
    }

    #[test]
    fn count_disagreements() {
        //Header claims fewer records than present
        let mut buf = small_graph();
        buf[16..24].copy_from_slice(&2u64.to_le_bytes());
        let mut reader = NeighborGraphReader::open(Cursor::new(buf)).unwrap();
        assert!(reader.read_next().unwrap());
        assert!(reader.read_next().unwrap());
        assert!(matches!(
            reader.read_next(),
            Err(Error::NodeCountMismatch {
                declared: 2,
                ..
            })
        ));

        //Header claims more
        let mut buf = small_graph();
        buf[16..24].copy_from_slice(&7u64.to_le_bytes());
        let mut reader = NeighborGraphReader::open(Cursor::new(buf)).unwrap();
        let r = reader.for_each_record(|_| Ok(()));
        assert!(matches!(
            r,
            Err(Error::NodeCountMismatch {
                declared: 7,
                found: 3
            })
        ));
    }

    #[test]
    fn truncated_record() {
        let mut buf = small_graph();
        buf.truncate(buf.len() - 3);
        let mut reader = NeighborGraphReader::open(Cursor::new(buf)).unwrap();
        let r = reader.for_each_record(|_| Ok(()));
        assert!(matches!(r, Err(Error::TruncatedRecord { record: 2, .. })));
    }

    #[test]
    fn opening_at_offset() {
        let mut buf = b"prefix".to_vec();
        buf.extend_from_slice(&small_graph());
        let mut cursor = Cursor::new(buf);
        cursor.set_position(6);
        let mut reader = NeighborGraphReader::open(cursor).unwrap();
        let mut n = 0;
        reader.for_each_record(|_| {
            n += 1;
            Ok(())
        }).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&reader.into_inner().get_ref()[6..22], SIGNATURE);
    }
}
