use std::io::{Read, Seek};

use super::tag_counts::TagCounts;
use crate::graph::NeighborGraphReader;
use crate::runtime::{Error, Result};

///////////////////////////////
/// Computes the distribution of observed counts from true counts over a neighbor graph.
///
/// Each read of tag n is observed as tag m with probability p for every edge (m, p) of n, so
/// the observed count of m is a sum of independent binomials: mean sum(c_n p) and variance
/// sum(c_n p (1-p)).
pub struct RecountComputer<'g, R: Read + Seek> {
    graph: &'g mut NeighborGraphReader<R>,
}

impl<'g, R: Read + Seek> RecountComputer<'g, R> {
    pub fn new(graph: &'g mut NeighborGraphReader<R>) -> Self {
        Self { graph }
    }

    ///////////////////////////////
    /// Expected observed counts
    pub fn mean_from_true(&mut self, true_counts: &TagCounts) -> Result<TagCounts> {
        let mut mean = TagCounts::new(true_counts.len());
        self.propagate(true_counts, Some(&mut mean), None)?;
        Ok(mean)
    }

    ///////////////////////////////
    /// Variance of observed counts
    pub fn variance_from_true(&mut self, true_counts: &TagCounts) -> Result<TagCounts> {
        let mut variance = TagCounts::new(true_counts.len());
        self.propagate(true_counts, None, Some(&mut variance))?;
        Ok(variance)
    }

    ///////////////////////////////
    /// Mean and variance in a single scan of the graph
    pub fn moments_from_true(&mut self, true_counts: &TagCounts) -> Result<(TagCounts, TagCounts)> {
        let mut mean = TagCounts::new(true_counts.len());
        let mut variance = TagCounts::new(true_counts.len());
        self.propagate(true_counts, Some(&mut mean), Some(&mut variance))?;
        Ok((mean, variance))
    }

    ///////////////////////////////
    /// Same as mean_from_true but into an existing vector, which must have the right size
    pub fn mean_into(&mut self, true_counts: &TagCounts, mean: &mut TagCounts) -> Result<()> {
        true_counts.check_same_len(mean)?;
        mean.zero();
        self.propagate(true_counts, Some(mean), None)
    }

    fn propagate(
        &mut self,
        true_counts: &TagCounts,
        mut mean: Option<&mut TagCounts>,
        mut variance: Option<&mut TagCounts>,
    ) -> Result<()> {
        let len = true_counts.len();
        self.graph.for_each_record(|list| {
            let count = true_counts.get(list.id())?;
            for e in list {
                if e.id >= len {
                    return Err(Error::index_out_of_range("tag counts", e.id, len));
                }
                if let Some(mean) = mean.as_deref_mut() {
                    mean[e.id] += count * e.prob;
                }
                if let Some(variance) = variance.as_deref_mut() {
                    variance[e.id] += count * e.prob * (1.0 - e.prob);
                }
            }
            Ok(())
        })
    }
}
