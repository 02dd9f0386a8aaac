use std::io::{BufRead, Write};

use super::quality::QualityScale;
use crate::knapsack::{KnapsackEnumerator, KnapsackItem};
use crate::recount::{counts_tsv_writer, CountRow};
use crate::runtime::{Error, Result};
use crate::tag::TagAlphabet;

/// Number of other symbols each position can turn into
const NUM_ALTERNATIVES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinderOptions {
    /// Largest summed -ln(probability) of the substituted positions
    pub capacity: f64,
    pub scale: QualityScale,
}

///////////////////////////////
/// Lists the likely misreadings of a tag from its per-position qualities.
///
/// Every set of positions whose error probabilities multiply to at least exp(-capacity) is
/// found with the knapsack search; each such set then gives 3^k neighbors, one per way of
/// substituting the k positions.
pub struct NeighborFinder {
    options: FinderOptions,
    enumerator: KnapsackEnumerator,
    probs: Vec<f64>,
    items: Vec<KnapsackItem>,
    scratch: Vec<u8>,
    digits: Vec<u8>,
}

impl NeighborFinder {
    pub fn new(options: FinderOptions) -> Self {
        Self {
            options,
            enumerator: KnapsackEnumerator::new(options.capacity),
            probs: Vec::new(),
            items: Vec::new(),
            scratch: Vec::new(),
            digits: Vec::new(),
        }
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    ///////////////////////////////
    /// Call visit(neighbor symbols, probability) for every neighbor of a tag. Returns the
    /// number of neighbors
    pub fn for_each_neighbor<F>(&mut self, symbols: &[u8], qualities: &[f64], mut visit: F) -> Result<usize>
    where
        F: FnMut(&[u8], f64),
    {
        if symbols.len() != qualities.len() {
            return Err(Error::SizeMismatch {
                left_name: "tag length",
                left: symbols.len(),
                right_name: "quality scores",
                right: qualities.len(),
            });
        }

        let scale = self.options.scale;
        self.probs.clear();
        self.probs
            .extend(qualities.iter().map(|&q| scale.substitution_prob(q)));
        self.items.clear();
        self.items.extend(
            self.probs
                .iter()
                .enumerate()
                .map(|(pos, &p)| KnapsackItem::from_probability(pos, p)),
        );

        let Self {
            enumerator,
            probs,
            items,
            scratch,
            digits,
            ..
        } = self;

        let mut num_neighbors = 0;
        enumerator.for_each_combination(items, |positions, _cost| {
            let prob: f64 = positions.iter().map(|&pos| probs[pos]).product();
            num_neighbors += substitutions(symbols, positions, scratch, digits, |neighbor| {
                visit(neighbor, prob)
            });
        })?;
        Ok(num_neighbors)
    }
}

///////////////////////////////
/// Every way of replacing the symbols at the given positions with a different symbol
fn substitutions<F>(
    symbols: &[u8],
    positions: &[usize],
    scratch: &mut Vec<u8>,
    digits: &mut Vec<u8>,
    mut visit: F,
) -> usize
where
    F: FnMut(&[u8]),
{
    scratch.clear();
    scratch.extend_from_slice(symbols);
    digits.clear();
    digits.resize(positions.len(), 0);

    let mut count = 0;
    loop {
        for (&pos, &d) in positions.iter().zip(digits.iter()) {
            //The d-th symbol that is not the original one
            let original = symbols[pos];
            scratch[pos] = if d < original { d } else { d + 1 };
        }
        visit(scratch);
        count += 1;

        //Odometer over the digits, last position fastest
        let mut j = digits.len();
        loop {
            if j == 0 {
                return count;
            }
            j -= 1;
            digits[j] += 1;
            if digits[j] < NUM_ALTERNATIVES {
                break;
            }
            digits[j] = 0;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinderStats {
    pub num_tags: u64,
    pub num_neighbors: u64,
    pub num_without_neighbors: u64,
}

///////////////////////////////
/// Read lines of `count tag q1 q2 ...` and write one neighbor record per tag:
/// `tag<TAB>neighbor<TAB>prob...`. Tags without any neighbor get no record. Lines starting
/// with # are comments.
///
/// If `counts_out` is given, every tag also gets a `tag<TAB>count` line there, readable as
/// observed counts
pub fn write_neighbor_records<R: BufRead, W: Write>(
    finder: &mut NeighborFinder,
    alphabet: TagAlphabet,
    input: R,
    out: &mut W,
    counts_out: Option<&mut dyn Write>,
) -> Result<FinderStats> {
    let mut stats = FinderStats::default();
    let mut counts_writer = counts_out.map(counts_tsv_writer);
    let mut qualities = Vec::new();
    let mut record = String::new();

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let context = || format!("tag quality line {}", i + 1);

        let mut fields = line.split_whitespace();
        let (count, tag) = match (fields.next(), fields.next()) {
            (Some(count), Some(tag)) => (count, tag),
            _ => {
                return Err(Error::parse_error(
                    context(),
                    Some("expected a count, a tag and quality scores"),
                ))
            }
        };
        let count = count.parse::<f64>().map_err(|_| {
            Error::parse_error(context(), Some(format!("\"{}\" is not a count", count)))
        })?;

        qualities.clear();
        for q in fields {
            qualities.push(q.parse::<f64>().map_err(|_| {
                Error::parse_error(context(), Some(format!("\"{}\" is not a quality score", q)))
            })?);
        }
        let symbols = alphabet.to_symbols(tag.as_bytes())?;
        if qualities.len() != symbols.len() {
            return Err(Error::parse_error(
                context(),
                Some(format!(
                    "tag {} has {} positions but {} quality scores",
                    tag,
                    symbols.len(),
                    qualities.len()
                )),
            ));
        }

        record.clear();
        record.push_str(tag);
        let mut failure = None;
        let n = finder.for_each_neighbor(&symbols, &qualities, |neighbor, prob| {
            match alphabet.to_literal(neighbor) {
                Ok(literal) => {
                    record.push('\t');
                    record.push_str(&literal);
                    record.push('\t');
                    record.push_str(&prob.to_string());
                }
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        })?;
        if let Some(e) = failure {
            return Err(e);
        }

        if let Some(writer) = counts_writer.as_mut() {
            writer
                .serialize(CountRow { tag, count })
                .map_err(|e| Error::corrupt_data(Some(e.to_string())))?;
        }

        stats.num_tags += 1;
        if n == 0 {
            log::debug!("Tag {} has no neighbors within the capacity", tag);
            stats.num_without_neighbors += 1;
            continue;
        }
        stats.num_neighbors += n as u64;
        writeln!(out, "{}", record)?;
    }
    if let Some(writer) = counts_writer.as_mut() {
        writer.flush()?;
    }

    log::info!(
        "Found {} neighbors for {} tags; {} tags had none",
        stats.num_neighbors,
        stats.num_tags,
        stats.num_without_neighbors
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    fn phred_finder(capacity: f64) -> NeighborFinder {
        NeighborFinder::new(FinderOptions {
            capacity,
            scale: QualityScale::Phred,
        })
    }

    fn collect(finder: &mut NeighborFinder, symbols: &[u8], qualities: &[f64]) -> Vec<(Vec<u8>, f64)> {
        let mut out = Vec::new();
        finder
            .for_each_neighbor(symbols, qualities, |n, p| out.push((n.to_vec(), p)))
            .unwrap();
        out
    }

    #[test]
    fn single_substitutions() {
        //Phred 10 gives p = 1/30; -ln(1/30) is about 3.4, two of them do not fit in 5
        let mut finder = phred_finder(5.0);
        let found = collect(&mut finder, &[0, 1], &[10.0, 10.0]);
        assert_eq!(found.len(), 6);
        let tags: Vec<Vec<u8>> = found.iter().map(|(t, _)| t.clone()).collect();
        assert!(tags.contains(&vec![1, 1]));
        assert!(tags.contains(&vec![3, 1]));
        assert!(tags.contains(&vec![0, 0]));
        assert!(tags.contains(&vec![0, 2]));
        assert!(!tags.contains(&vec![0, 1]));
        for (_, p) in &found {
            assert!((p - 1.0 / 30.0).abs() < 1e-12);
        }
    }

    #[test]
    fn double_substitutions_are_distinct() {
        let mut finder = phred_finder(7.0);
        let found = collect(&mut finder, &[2, 2, 2], &[10.0, 10.0, 40.0]);
        //Positions 0 and 1 alone and together: 3 + 3 + 9
        assert_eq!(found.len(), 15);
        let unique: FxHashSet<Vec<u8>> = found.iter().map(|(t, _)| t.clone()).collect();
        assert_eq!(unique.len(), found.len());
        let double = found.iter().find(|(t, _)| t[0] != 2 && t[1] != 2).unwrap();
        assert!((double.1 - 1.0 / 900.0).abs() < 1e-12);
        assert!(found.iter().all(|(t, _)| t[2] == 2));
    }

    #[test]
    fn length_mismatch() {
        let mut finder = phred_finder(5.0);
        let r = finder.for_each_neighbor(&[0, 1], &[10.0], |_, _| {});
        assert!(matches!(r, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn text_records() {
        let mut finder = phred_finder(5.0);
        let input = "# count tag qualities\n12 01 10 40\n3\t33\t40 40\n";
        let mut out = Vec::new();
        let stats =
            write_neighbor_records(&mut finder, TagAlphabet::Numeric, input.as_bytes(), &mut out, None).unwrap();
        assert_eq!(stats.num_tags, 2);
        assert_eq!(stats.num_neighbors, 3);
        assert_eq!(stats.num_without_neighbors, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let fields: Vec<&str> = lines[0].split('\t').collect();
        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], "01");
        let neighbors: Vec<&str> = fields[1..].iter().step_by(2).copied().collect();
        assert_eq!(neighbors, vec!["11", "21", "31"]);
    }

    #[test]
    fn raw_counts_for_every_tag() {
        let mut finder = phred_finder(5.0);
        let input = "12 01 10 40\n# skipped\n3\t33\t40 40\n0.5 20 10 10\n";
        let mut counts = Vec::new();
        let stats = write_neighbor_records(
            &mut finder,
            TagAlphabet::Numeric,
            input.as_bytes(),
            &mut Vec::new(),
            Some(&mut counts),
        )
        .unwrap();
        assert_eq!(stats.num_tags, 3);
        //Tags without neighbors are still counted
        assert_eq!(
            String::from_utf8(counts).unwrap(),
            "01\t12.0\n33\t3.0\n20\t0.5\n"
        );
    }

    #[test]
    fn malformed_lines() {
        let mut finder = phred_finder(5.0);
        for bad in ["5 012 10 10\n", "5\n", "x 01 10 10\n", "5 01 10 y\n"] {
            let r = write_neighbor_records(&mut finder, TagAlphabet::Numeric, bad.as_bytes(), &mut Vec::new(), None);
            assert!(matches!(r, Err(Error::ParseError { .. })), "{:?}", bad);
        }
    }
}
