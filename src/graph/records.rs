use std::io::{Read, Seek, Write};

use super::writer::NeighborGraphWriter;
use crate::runtime::{Error, Result};
use crate::tag::{TagAlphabet, TagId, TagUniverse};

///////////////////////////////
/// Turns text neighbor records into tag ids and probabilities.
///
/// A record is `tag<TAB>neighbor<TAB>prob[<TAB>neighbor<TAB>prob]...`. The tag must be in the
/// universe; neighbors that are not are dropped.
pub struct NeighborRecordParser<'u> {
    universe: &'u TagUniverse,
    alphabet: TagAlphabet,
    neighbors: Vec<(TagId, f64)>,
    num_skipped: u64,
}

impl<'u> NeighborRecordParser<'u> {
    pub fn new(universe: &'u TagUniverse, alphabet: TagAlphabet) -> Self {
        Self {
            universe,
            alphabet,
            neighbors: Vec::new(),
            num_skipped: 0,
        }
    }

    ///////////////////////////////
    /// Parse the fields of one record. line is only used in error messages
    pub fn parse(&mut self, record: &csv::StringRecord, line: u64) -> Result<(TagId, &[(TagId, f64)])> {
        let context = || format!("neighbor record on line {}", line);

        if record.len() < 3 || record.len() % 2 == 0 {
            return Err(Error::parse_error(
                context(),
                Some(format!(
                    "expected a tag followed by neighbor and probability pairs, got {} fields",
                    record.len()
                )),
            ));
        }
        if let Some(i) = record.iter().position(|f| f.is_empty()) {
            return Err(Error::parse_error(
                context(),
                Some(format!("field {} is empty", i + 1)),
            ));
        }

        let tag_literal = &record[0];
        let tag_id = self
            .universe
            .id_of_literal(tag_literal, self.alphabet)?
            .ok_or_else(|| Error::unknown_tag(tag_literal))?;

        self.neighbors.clear();
        for i in (1..record.len()).step_by(2) {
            let neighbor_literal = &record[i];
            let prob: f64 = record[i + 1].parse().map_err(|_| {
                Error::parse_error(
                    context(),
                    Some(format!("\"{}\" is not a probability", &record[i + 1])),
                )
            })?;

            match self.universe.id_of_literal(neighbor_literal, self.alphabet)? {
                Some(neighbor_id) => self.neighbors.push((neighbor_id, prob)),
                None => {
                    log::debug!(
                        "Skipping neighbor {} of {}, not in the tag universe",
                        neighbor_literal,
                        tag_literal
                    );
                    self.num_skipped += 1;
                }
            }
        }
        Ok((tag_id, &self.neighbors))
    }

    /// Neighbors dropped so far because they were not in the universe
    pub fn num_skipped(&self) -> u64 {
        self.num_skipped
    }
}

///////////////////////////////
/// Tab-separated reader without headers; records may have any number of fields
pub fn tab_separated_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordStats {
    pub num_records: u64,
    pub num_skipped_neighbors: u64,
    pub num_filled: u64,
}

///////////////////////////////
/// Append one graph record per text record. With fill_missing, tags of the universe that had
/// no record get one with only their self-edge, after all others
pub fn write_graph_from_records<R: Read, W: Write + Seek>(
    universe: &TagUniverse,
    alphabet: TagAlphabet,
    input: R,
    writer: &mut NeighborGraphWriter<W>,
    fill_missing: bool,
) -> Result<RecordStats> {
    let mut parser = NeighborRecordParser::new(universe, alphabet);
    let mut reader = tab_separated_reader(input);
    let mut has_record = vec![false; universe.len()];
    let mut stats = RecordStats::default();

    let mut record = csv::StringRecord::new();
    let mut line = 0;
    loop {
        let more = reader
            .read_record(&mut record)
            .map_err(|e| Error::parse_error("neighbor records", Some(e.to_string())))?;
        if !more {
            break;
        }
        line = record.position().map(|p| p.line()).unwrap_or(line + 1);

        let (tag_id, neighbors) = parser.parse(&record, line)?;
        writer.append(tag_id, neighbors)?;
        has_record[tag_id] = true;
        stats.num_records += 1;
    }

    if fill_missing {
        for (tag_id, _) in has_record.iter().enumerate().filter(|(_, seen)| !**seen) {
            writer.append(tag_id, &[])?;
            stats.num_filled += 1;
        }
    }

    stats.num_skipped_neighbors = parser.num_skipped();
    log::info!(
        "Wrote {} neighbor records, {} self-only records; skipped {} neighbors not in the universe",
        stats.num_records,
        stats.num_filled,
        stats.num_skipped_neighbors
    );
    Ok(stats)
}
