use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use clap::ValueEnum;
use rustc_hash::FxHashMap;

use super::format::{write_header, NODE_COUNT_OFFSET};
use super::neighbor_list::{NeighborEdge, NeighborList};
use crate::runtime::{Error, Result};
use crate::tag::TagId;

///////////////////////////////
/// What to do when the neighbor probabilities of a tag sum to more than 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverflowMode {
    /// Write the record without a self-edge and log a warning
    #[default]
    Compat,
    /// Fail with ProbabilityOverflow
    Strict,
}

///////////////////////////////
/// What to do when one record lists the same neighbor more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DuplicateNeighbors {
    /// Write every edge as given
    #[default]
    Keep,
    /// Sum the probabilities into the first occurrence; the sum must stay below 0.5
    Merge,
    /// Fail with DuplicateOrSelfNeighbor
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriterOptions {
    pub overflow: OverflowMode,
    pub duplicates: DuplicateNeighbors,
}

///////////////////////////////
/// Validates neighbors of one tag and turns them into a record with its self-edge.
/// Shared by both writers
#[derive(Debug, Default)]
struct RecordBuilder {
    options: WriterOptions,
    list: NeighborList,
    first_seen: FxHashMap<TagId, usize>,
    num_overflowed: u64,
}

impl RecordBuilder {
    fn new(options: WriterOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    fn build(&mut self, tag_id: TagId, neighbors: &[(TagId, f64)]) -> Result<&NeighborList> {
        self.list.reset(tag_id);
        self.first_seen.clear();

        let mut sum_others = 0.0;
        for &(neighbor_id, prob) in neighbors {
            if neighbor_id == tag_id {
                return Err(Error::DuplicateOrSelfNeighbor {
                    tag_id,
                    neighbor_id,
                });
            }
            if !(0.0..0.5).contains(&prob) {
                return Err(Error::InvalidProbability {
                    tag_id,
                    neighbor_id,
                    prob,
                });
            }
            sum_others += prob;

            match self.options.duplicates {
                DuplicateNeighbors::Keep => self.list.push(NeighborEdge::new(neighbor_id, prob)),
                DuplicateNeighbors::Merge | DuplicateNeighbors::Reject => {
                    match self.first_seen.get(&neighbor_id) {
                        Some(&pos) => {
                            if self.options.duplicates == DuplicateNeighbors::Reject {
                                return Err(Error::DuplicateOrSelfNeighbor {
                                    tag_id,
                                    neighbor_id,
                                });
                            }
                            let edge = &mut self.list.edges_mut()[pos];
                            edge.prob += prob;
                            if edge.prob >= 0.5 {
                                return Err(Error::InvalidProbability {
                                    tag_id,
                                    neighbor_id,
                                    prob: edge.prob,
                                });
                            }
                        }
                        None => {
                            self.first_seen.insert(neighbor_id, self.list.len());
                            self.list.push(NeighborEdge::new(neighbor_id, prob));
                        }
                    }
                }
            }
        }

        if sum_others <= 1.0 {
            self.list.push(NeighborEdge::new(tag_id, 1.0 - sum_others));
        } else {
            match self.options.overflow {
                OverflowMode::Compat => {
                    log::warn!(
                        "Neighbor probabilities of tag {} sum to {}; writing it without a self-edge",
                        tag_id,
                        sum_others
                    );
                    self.num_overflowed += 1;
                }
                OverflowMode::Strict => {
                    return Err(Error::ProbabilityOverflow {
                        tag_id,
                        sum: sum_others,
                    })
                }
            }
        }
        Ok(&self.list)
    }
}

///////////////////////////////
/// Writes a neighbor graph to a seekable sink. The node count is written as 0 up front and
/// filled in by finish(); a writer dropped without finish() leaves a file that readers reject.
pub struct NeighborGraphWriter<W: Write + Seek> {
    sink: W,
    count_pos: u64,
    node_count: u64,
    builder: RecordBuilder,
}

impl NeighborGraphWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P, options: WriterOptions) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Self::new(BufWriter::new(file), options)
    }
}

impl<W: Write + Seek> NeighborGraphWriter<W> {
    pub fn new(mut sink: W, options: WriterOptions) -> Result<Self> {
        let start = sink.stream_position()?;
        write_header(&mut sink, 0)?;
        Ok(Self {
            sink,
            count_pos: start + NODE_COUNT_OFFSET,
            node_count: 0,
            builder: RecordBuilder::new(options),
        })
    }

    ///////////////////////////////
    /// Validate the neighbors of a tag, add its self-edge and write the record.
    /// On error nothing is written
    pub fn append(&mut self, tag_id: TagId, neighbors: &[(TagId, f64)]) -> Result<()> {
        let list = self.builder.build(tag_id, neighbors)?;
        list.write_to(&mut self.sink)?;
        self.node_count += 1;
        Ok(())
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    /// Records written without a self-edge because their probabilities overflowed
    pub fn num_overflowed(&self) -> u64 {
        self.builder.num_overflowed
    }

    ///////////////////////////////
    /// Backfill the node count and flush. Returns the sink and the number of records
    pub fn finish(mut self) -> Result<(W, u64)> {
        let end = self.sink.stream_position()?;
        self.sink.seek(SeekFrom::Start(self.count_pos))?;
        self.sink.write_all(&self.node_count.to_le_bytes())?;
        self.sink.seek(SeekFrom::Start(end))?;
        self.sink.flush()?;
        log::debug!("Finished graph of {} nodes", self.node_count);
        Ok((self.sink, self.node_count))
    }
}

///////////////////////////////
/// Writes a neighbor graph to a sink that cannot seek, such as a pipe. The node count must
/// be known in advance; it is written first and checked when finishing.
pub struct StreamingGraphWriter<W: Write> {
    sink: W,
    declared: u64,
    node_count: u64,
    builder: RecordBuilder,
}

impl<W: Write> StreamingGraphWriter<W> {
    pub fn new(mut sink: W, declared: u64, options: WriterOptions) -> Result<Self> {
        write_header(&mut sink, declared)?;
        Ok(Self {
            sink,
            declared,
            node_count: 0,
            builder: RecordBuilder::new(options),
        })
    }

    pub fn append(&mut self, tag_id: TagId, neighbors: &[(TagId, f64)]) -> Result<()> {
        if self.node_count == self.declared {
            return Err(Error::NodeCountMismatch {
                declared: self.declared,
                found: self.node_count + 1,
            });
        }
        let list = self.builder.build(tag_id, neighbors)?;
        list.write_to(&mut self.sink)?;
        self.node_count += 1;
        Ok(())
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn finish(mut self) -> Result<W> {
        if self.node_count != self.declared {
            return Err(Error::NodeCountMismatch {
                declared: self.declared,
                found: self.node_count,
            });
        }
        self.sink.flush()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::format::{HEADER_SIZE, SIGNATURE};
    use std::io::Cursor;

    fn read_records(bytes: &[u8]) -> Vec<NeighborList> {
        let mut reader = &bytes[HEADER_SIZE as usize..];
        let mut out = Vec::new();
        let mut list = NeighborList::default();
        while list.read_from(&mut reader, out.len() as u64).unwrap() {
            out.push(list.clone());
        }
        out
    }

    fn node_count(bytes: &[u8]) -> u64 {
        u64::from_le_bytes(bytes[16..24].try_into().unwrap())
    }

    #[test]
    fn self_edge_is_appended() {
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), Default::default()).unwrap();
        writer.append(0, &[(1, 0.25), (2, 0.25)]).unwrap();
        writer.append(1, &[]).unwrap();
        let (cursor, n) = writer.finish().unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(n, 2);
        assert_eq!(&bytes[..16], SIGNATURE);
        assert_eq!(node_count(&bytes), 2);

        let records = read_records(&bytes);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].edges(),
            &[
                NeighborEdge::new(1, 0.25),
                NeighborEdge::new(2, 0.25),
                NeighborEdge::new(0, 0.5)
            ]
        );
        assert_eq!(records[1].edges(), &[NeighborEdge::new(1, 1.0)]);
    }

    #[test]
    fn unfinished_file_has_zero_count() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = NeighborGraphWriter::new(&mut cursor, Default::default()).unwrap();
            writer.append(0, &[]).unwrap();
        }
        assert_eq!(node_count(cursor.get_ref()), 0);
    }

    #[test]
    fn invalid_neighbors_are_rejected() {
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), Default::default()).unwrap();
        assert!(matches!(
            writer.append(3, &[(3, 0.1)]),
            Err(Error::DuplicateOrSelfNeighbor {
                tag_id: 3,
                neighbor_id: 3
            })
        ));
        for prob in [0.5, -0.1, f64::NAN] {
            assert!(matches!(
                writer.append(3, &[(1, prob)]),
                Err(Error::InvalidProbability { .. })
            ));
        }
        assert_eq!(writer.node_count(), 0);
        let (cursor, _) = writer.finish().unwrap();
        assert_eq!(cursor.into_inner().len() as u64, HEADER_SIZE);
    }

    #[test]
    fn overflow_compat_and_strict() {
        let overflowing = [(1, 0.4), (2, 0.4), (3, 0.4)];

        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), Default::default()).unwrap();
        writer.append(0, &overflowing).unwrap();
        assert_eq!(writer.num_overflowed(), 1);
        let (cursor, _) = writer.finish().unwrap();
        let records = read_records(cursor.get_ref());
        assert_eq!(records[0].len(), 3);
        assert!(records[0].iter().all(|e| e.id != 0));

        let options = WriterOptions {
            overflow: OverflowMode::Strict,
            ..Default::default()
        };
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), options).unwrap();
        assert!(matches!(
            writer.append(0, &overflowing),
            Err(Error::ProbabilityOverflow { tag_id: 0, .. })
        ));
    }

    #[test]
    fn duplicate_policies() {
        let neighbors = [(1, 0.125), (2, 0.25), (1, 0.125)];

        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), Default::default()).unwrap();
        writer.append(0, &neighbors).unwrap();
        let (cursor, _) = writer.finish().unwrap();
        let records = read_records(cursor.get_ref());
        assert_eq!(records[0].len(), 4);
        assert_eq!(records[0].edges()[3], NeighborEdge::new(0, 0.5));

        let merge = WriterOptions {
            duplicates: DuplicateNeighbors::Merge,
            ..Default::default()
        };
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), merge).unwrap();
        writer.append(0, &neighbors).unwrap();
        let (cursor, _) = writer.finish().unwrap();
        let records = read_records(cursor.get_ref());
        assert_eq!(
            records[0].edges(),
            &[
                NeighborEdge::new(1, 0.25),
                NeighborEdge::new(2, 0.25),
                NeighborEdge::new(0, 0.5)
            ]
        );

        let reject = WriterOptions {
            duplicates: DuplicateNeighbors::Reject,
            ..Default::default()
        };
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), reject).unwrap();
        assert!(matches!(
            writer.append(0, &neighbors),
            Err(Error::DuplicateOrSelfNeighbor {
                tag_id: 0,
                neighbor_id: 1
            })
        ));
    }

    #[test]
    fn merged_probability_stays_below_half() {
        let merge = WriterOptions {
            duplicates: DuplicateNeighbors::Merge,
            ..Default::default()
        };
        let mut writer = NeighborGraphWriter::new(Cursor::new(Vec::new()), merge).unwrap();
        let r = writer.append(0, &[(1, 0.25), (2, 0.125), (1, 0.25)]);
        match r {
            Err(Error::InvalidProbability {
                tag_id: 0,
                neighbor_id: 1,
                prob,
            }) => assert_eq!(prob, 0.5),
            other => panic!("unexpected {:?}", other),
        }
        writer.append(1, &[(0, 0.25)]).unwrap();
        let (cursor, n) = writer.finish().unwrap();
        assert_eq!(n, 1);
        let records = read_records(cursor.get_ref());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), 1);
    }

    #[test]
    fn streaming_count_is_checked() {
        let mut writer = StreamingGraphWriter::new(Vec::new(), 2, Default::default()).unwrap();
        writer.append(0, &[(1, 0.1)]).unwrap();
        writer.append(1, &[]).unwrap();
        assert!(matches!(
            writer.append(2, &[]),
            Err(Error::NodeCountMismatch {
                declared: 2,
                found: 3
            })
        ));
        let bytes = writer.finish().unwrap();
        assert_eq!(node_count(&bytes), 2);
        assert_eq!(read_records(&bytes).len(), 2);

        let mut writer = StreamingGraphWriter::new(Vec::new(), 2, Default::default()).unwrap();
        writer.append(0, &[]).unwrap();
        assert!(matches!(
            writer.finish(),
            Err(Error::NodeCountMismatch {
                declared: 2,
                found: 1
            })
        ));
    }
}
