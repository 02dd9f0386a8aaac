use std::io::{Read, Write};
use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::graph::tab_separated_reader;
use crate::runtime::{Error, Result};
use crate::tag::{TagAlphabet, TagId, TagUniverse};

///////////////////////////////
/// One real-valued count per tag id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TagCounts {
    counts: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CountRow<'a> {
    pub tag: &'a str,
    pub count: f64,
}

///////////////////////////////
/// Writer for headerless `tag<TAB>count` lines, the format from_text reads back
pub(crate) fn counts_tsv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(out)
}

impl TagCounts {
    /// All zero
    pub fn new(len: usize) -> Self {
        Self {
            counts: vec![0.0; len],
        }
    }

    pub fn from_vec(counts: Vec<f64>) -> Self {
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn zero(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0.0);
    }

    pub fn get(&self, id: TagId) -> Result<f64> {
        self.counts
            .get(id)
            .copied()
            .ok_or_else(|| Error::index_out_of_range("tag counts", id, self.counts.len()))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.counts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.counts.iter()
    }

    pub fn sum(&self) -> f64 {
        self.counts.iter().sum()
    }

    pub(crate) fn check_same_len(&self, other: &TagCounts) -> Result<()> {
        if self.len() == other.len() {
            Ok(())
        } else {
            Err(Error::SizeMismatch {
                left_name: "counts",
                left: self.len(),
                right_name: "other counts",
                right: other.len(),
            })
        }
    }

    ///////////////////////////////
    /// Largest absolute difference between two count vectors of the same size
    pub fn max_abs_diff(&self, other: &TagCounts) -> Result<f64> {
        self.check_same_len(other)?;
        Ok(self
            .counts
            .iter()
            .zip(&other.counts)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }

    ///////////////////////////////
    /// Read `tag<TAB>count` lines. Tags not in the file get count 0
    pub fn from_text<R: Read>(universe: &TagUniverse, input: R, alphabet: TagAlphabet) -> Result<Self> {
        let mut counts = Self::new(universe.len());
        let mut reader = tab_separated_reader(input);
        for (i, record) in reader.records().enumerate() {
            let record =
                record.map_err(|e| Error::parse_error("tag counts", Some(e.to_string())))?;
            if record.len() != 2 {
                return Err(Error::parse_error(
                    format!("tag counts line {}", i + 1),
                    Some(format!("expected tag and count, got {} fields", record.len())),
                ));
            }
            let id = universe
                .id_of_literal(&record[0], alphabet)?
                .ok_or_else(|| Error::unknown_tag(&record[0]))?;
            counts[id] = record[1].trim().parse().map_err(|_| {
                Error::parse_error(
                    format!("tag counts line {}", i + 1),
                    Some(format!("\"{}\" is not a count", &record[1])),
                )
            })?;
        }
        log::debug!("Read counts summing to {}", counts.sum());
        Ok(counts)
    }

    ///////////////////////////////
    /// Write `tag<TAB>count` lines for every tag of the universe
    pub fn write_tsv<W: Write>(&self, universe: &TagUniverse, out: W, alphabet: TagAlphabet) -> Result<()> {
        if self.len() != universe.len() {
            return Err(Error::SizeMismatch {
                left_name: "counts",
                left: self.len(),
                right_name: "tag universe",
                right: universe.len(),
            });
        }
        let mut writer = counts_tsv_writer(out);
        for (id, &count) in self.counts.iter().enumerate() {
            let tag = universe.literal_of(id, alphabet)?;
            writer
                .serialize(CountRow { tag: &tag, count })
                .map_err(|e| Error::corrupt_data(Some(e.to_string())))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Index<TagId> for TagCounts {
    type Output = f64;

    fn index(&self, id: TagId) -> &f64 {
        &self.counts[id]
    }
}

impl IndexMut<TagId> for TagCounts {
    fn index_mut(&mut self, id: TagId) -> &mut f64 {
        &mut self.counts[id]
    }
}

impl From<Vec<f64>> for TagCounts {
    fn from(counts: Vec<f64>) -> Self {
        Self::from_vec(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::PackedTag;

    fn universe() -> TagUniverse {
        let tags = ["00", "01", "22"]
            .iter()
            .map(|s| PackedTag::from_literal(s.as_bytes(), TagAlphabet::Numeric).unwrap())
            .collect();
        TagUniverse::from_sorted(tags).unwrap()
    }

    #[test]
    fn arithmetic() {
        let mut a = TagCounts::from_vec(vec![1.0, 5.0, -2.0]);
        let b = TagCounts::from_vec(vec![1.5, 2.0, -2.0]);
        assert_eq!(a.sum(), 4.0);
        assert_eq!(a.max_abs_diff(&b).unwrap(), 3.0);
        assert!(matches!(
            a.max_abs_diff(&TagCounts::new(2)),
            Err(Error::SizeMismatch { .. })
        ));
        assert!(matches!(
            a.get(3),
            Err(Error::IndexOutOfRange { index: 3, .. })
        ));
        a[1] += 1.0;
        assert_eq!(a.get(1).unwrap(), 6.0);
        a.zero();
        assert_eq!(a, TagCounts::new(3));
    }

    #[test]
    fn read_counts() {
        let u = universe();
        let counts = TagCounts::from_text(&u, "22\t7\n00\t1.5\n".as_bytes(), TagAlphabet::Numeric).unwrap();
        assert_eq!(counts.as_slice(), &[1.5, 0.0, 7.0]);

        for bad in ["00\t1\t2\n", "00\n", "00\tmany\n"] {
            assert!(matches!(
                TagCounts::from_text(&u, bad.as_bytes(), TagAlphabet::Numeric),
                Err(Error::ParseError { .. })
            ));
        }
        assert!(matches!(
            TagCounts::from_text(&u, "33\t1\n".as_bytes(), TagAlphabet::Numeric),
            Err(Error::UnknownTag { .. })
        ));
    }

    #[test]
    fn write_counts() {
        let u = universe();
        let counts = TagCounts::from_vec(vec![1.5, 0.0, 7.0]);
        let mut out = Vec::new();
        counts.write_tsv(&u, &mut out, TagAlphabet::Dna).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "AA\t1.5\nAC\t0.0\nGG\t7.0\n"
        );
    }

    #[test]
    fn written_counts_read_back() {
        let u = universe();
        let counts = TagCounts::from_vec(vec![3.0, 4.0, 0.25]);
        let mut out = Vec::new();
        counts.write_tsv(&u, &mut out, TagAlphabet::Numeric).unwrap();
        let back = TagCounts::from_text(&u, out.as_slice(), TagAlphabet::Numeric).unwrap();
        assert_eq!(back, counts);
    }
}
