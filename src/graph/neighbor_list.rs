use std::fmt;
use std::io::{self, Read, Write};

use super::format::{read_up_to, EDGE_SIZE};
use crate::runtime::{Error, Result};
use crate::tag::TagId;

///////////////////////////////
/// Reads of the source tag are observed as tag `id` with probability `prob`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborEdge {
    pub id: TagId,
    pub prob: f64,
}

impl NeighborEdge {
    pub fn new(id: TagId, prob: f64) -> Self {
        Self { id, prob }
    }
}

///////////////////////////////
/// One node of the graph: a tag id and its out-edges, including the edge to itself.
///
/// Scans reuse one instance, so reading a record only allocates when a list is longer than
/// any seen before.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborList {
    id: TagId,
    edges: Vec<NeighborEdge>,
}

impl NeighborList {
    pub fn new(id: TagId) -> Self {
        Self {
            id,
            edges: Vec::new(),
        }
    }

    pub fn with_edges(id: TagId, edges: Vec<NeighborEdge>) -> Self {
        Self { id, edges }
    }

    ////////////////
    /// Replace the contents from parallel id and probability lists
    pub fn set(&mut self, id: TagId, neighbor_ids: &[TagId], probs: &[f64]) -> Result<()> {
        if neighbor_ids.len() != probs.len() {
            return Err(Error::SizeMismatch {
                left_name: "neighbor ids",
                left: neighbor_ids.len(),
                right_name: "probabilities",
                right: probs.len(),
            });
        }
        self.reset(id);
        self.edges.extend(
            neighbor_ids
                .iter()
                .zip(probs)
                .map(|(&id, &prob)| NeighborEdge { id, prob }),
        );
        Ok(())
    }

    /// Empty the list and give it a new source id
    pub fn reset(&mut self, id: TagId) {
        self.id = id;
        self.edges.clear();
    }

    pub fn push(&mut self, edge: NeighborEdge) {
        self.edges.push(edge);
    }

    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn edges(&self) -> &[NeighborEdge] {
        &self.edges
    }

    pub(crate) fn edges_mut(&mut self) -> &mut [NeighborEdge] {
        &mut self.edges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NeighborEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn prob_sum(&self) -> f64 {
        self.edges.iter().map(|e| e.prob).sum()
    }

    ////////////////
    /// Scale probabilities so they sum to 1. Lists summing to 0 are left alone
    pub fn normalize_probabilities(&mut self) {
        let sum = self.prob_sum();
        if sum > 0.0 {
            let reciprocal = 1.0 / sum;
            for e in self.edges.iter_mut() {
                e.prob *= reciprocal;
            }
        }
    }

    ///////////////////////////////
    /// Write as one binary record
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&(self.id as u64).to_le_bytes())?;
        writer.write_all(&(self.edges.len() as u64).to_le_bytes())?;
        for e in &self.edges {
            writer.write_all(&(e.id as u64).to_le_bytes())?;
            writer.write_all(&e.prob.to_le_bytes())?;
        }
        Ok(())
    }

    ///////////////////////////////
    /// Replace the contents with the next binary record. Returns false if the input was already
    /// at its end; ending anywhere inside the record is an error
    pub fn read_from<R: Read>(&mut self, reader: &mut R, record: u64) -> Result<bool> {
        let mut word = [0u8; 8];
        match read_up_to(reader, &mut word)? {
            0 => return Ok(false),
            8 => {}
            n => {
                return Err(Error::truncated_record(
                    record,
                    Some(format!("only {} bytes of the tag id", n)),
                ))
            }
        }
        let id = to_tag_id(u64::from_le_bytes(word))?;

        if read_up_to(reader, &mut word)? < 8 {
            return Err(Error::truncated_record(
                record,
                Some("missing neighbor count"),
            ));
        }
        let num_neighbors = u64::from_le_bytes(word);

        self.reset(id);
        //Do not trust the count for the allocation; a corrupt count must fail on the read
        self.edges.reserve(num_neighbors.min(1 << 16) as usize);

        let mut pair = [0u8; EDGE_SIZE];
        for i in 0..num_neighbors {
            if read_up_to(reader, &mut pair)? < EDGE_SIZE {
                return Err(Error::truncated_record(
                    record,
                    Some(format!("{} of {} neighbors read", i, num_neighbors)),
                ));
            }
            let (id_bytes, prob_bytes) = pair.split_at(8);
            let id = to_tag_id(u64::from_le_bytes(id_bytes.try_into().unwrap_or_default()))?;
            let prob = f64::from_le_bytes(prob_bytes.try_into().unwrap_or_default());
            self.edges.push(NeighborEdge { id, prob });
        }
        Ok(true)
    }
}

fn to_tag_id(raw: u64) -> Result<TagId> {
    TagId::try_from(raw).map_err(|_| {
        Error::corrupt_data(Some(format!("tag id {} does not fit in memory", raw)))
    })
}

impl<'a> IntoIterator for &'a NeighborList {
    type Item = &'a NeighborEdge;
    type IntoIter = std::slice::Iter<'a, NeighborEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

impl fmt::Display for NeighborList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{}", self.id)?;
        for e in &self.edges {
            write!(f, " ({},{})", e.id, e.prob)?;
        }
        Ok(())
    }
}
