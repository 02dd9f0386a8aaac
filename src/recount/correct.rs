use std::io::{Read, Seek};

use super::propagate::RecountComputer;
use super::tag_counts::TagCounts;
use crate::runtime::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectorOptions {
    /// Stop after this many rounds without a better estimate
    pub rounds_to_wait: usize,
    pub max_rounds: usize,
    /// Never let an estimate go below zero
    pub clamp_negative: bool,
}

impl Default for CorrectorOptions {
    fn default() -> Self {
        Self {
            rounds_to_wait: 10,
            max_rounds: 1000,
            clamp_negative: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub counts: TagCounts,
    /// Largest change of any count in the round that produced this estimate
    pub error: f64,
    /// Round that produced this estimate, counting from 0
    pub round: usize,
    pub rounds_run: usize,
}

///////////////////////////////
/// Estimates true counts from observed ones by fixed-point iteration: adjust the estimate by
/// the difference between the observed counts and the counts the estimate is expected to give.
/// Keeps the estimate of the round with the smallest change.
pub struct ExpectationMatchingCorrector<'g, R: Read + Seek> {
    computer: RecountComputer<'g, R>,
    options: CorrectorOptions,
}

impl<'g, R: Read + Seek> ExpectationMatchingCorrector<'g, R> {
    pub fn new(computer: RecountComputer<'g, R>, options: CorrectorOptions) -> Self {
        Self { computer, options }
    }

    pub fn infer(&mut self, observed: &TagCounts) -> Result<Correction> {
        let mut prev = observed.clone();
        let mut cur = TagCounts::new(observed.len());
        let mut expected = TagCounts::new(observed.len());

        let mut best = Correction {
            counts: observed.clone(),
            error: f64::INFINITY,
            round: 0,
            rounds_run: 0,
        };

        let mut round = 0;
        while round - best.round <= self.options.rounds_to_wait && round < self.options.max_rounds {
            self.computer.mean_into(&prev, &mut expected)?;
            for i in 0..observed.len() {
                let mut v = prev[i] + observed[i] - expected[i];
                if self.options.clamp_negative && v < 0.0 {
                    v = 0.0;
                }
                cur[i] = v;
            }

            let error = prev.max_abs_diff(&cur)?;
            log::debug!("Round {}: largest change {}", round, error);
            if error < best.error {
                best.counts.clone_from(&cur);
                best.error = error;
                best.round = round;
            }

            std::mem::swap(&mut prev, &mut cur);
            round += 1;
        }
        best.rounds_run = round;

        log::info!(
            "Best estimate from round {} of {}, largest change {}",
            best.round,
            round,
            best.error
        );
        Ok(best)
    }
}
