use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::io::{create_output, open_graph, open_text_input, read_universe};
use crate::recount::{CorrectorOptions, ExpectationMatchingCorrector, RecountComputer, TagCounts};
use crate::runtime::Config;
use crate::tag::TagAlphabet;

#[derive(Args)]
pub struct CorrectCMD {
    #[arg(short = 't', value_parser)]
    /// Tag universe
    pub path_tags: PathBuf,

    #[arg(short = 'g', value_parser)]
    /// Binary graph file
    pub path_graph: PathBuf,

    #[arg(short = 'c', value_parser)]
    /// Observed counts, `tag<TAB>count` per line
    pub path_counts: PathBuf,

    #[arg(short = 'o', value_parser)]
    /// Where to write the corrected counts; stdout if not given
    pub path_out: Option<PathBuf>,

    #[arg(long = "rounds-to-wait", value_parser, default_value = "10")]
    /// Stop after this many rounds without improvement
    pub rounds_to_wait: usize,

    #[arg(long = "max-rounds", value_parser, default_value = "1000")]
    /// Upper limit on the number of rounds
    pub max_rounds: usize,

    #[arg(long = "clamp")]
    /// Do not let corrected counts go below zero
    pub clamp: bool,
}
impl CorrectCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        Correct::run(&Correct {
            path_tags: self.path_tags.clone(),
            path_graph: self.path_graph.clone(),
            path_counts: self.path_counts.clone(),
            path_out: self.path_out.clone(),
            alphabet: Config::get().alphabet,
            options: CorrectorOptions {
                rounds_to_wait: self.rounds_to_wait,
                max_rounds: self.max_rounds,
                clamp_negative: self.clamp,
            },
        })?;

        log::info!("Correct has finished successfully");
        Ok(())
    }
}

pub struct Correct {
    pub path_tags: PathBuf,
    pub path_graph: PathBuf,
    pub path_counts: PathBuf,
    pub path_out: Option<PathBuf>,
    pub alphabet: TagAlphabet,
    pub options: CorrectorOptions,
}
impl Correct {
    /// Run the algorithm
    pub fn run(params: &Correct) -> Result<()> {
        let universe = read_universe(&params.path_tags, params.alphabet)?;
        let observed =
            TagCounts::from_text(&universe, open_text_input(&params.path_counts)?, params.alphabet)
                .with_context(|| format!("Failed to read counts {}", params.path_counts.display()))?;

        let mut graph = open_graph(&params.path_graph)?;
        let mut corrector =
            ExpectationMatchingCorrector::new(RecountComputer::new(&mut graph), params.options);
        let correction = corrector
            .infer(&observed)
            .with_context(|| format!("Failed to correct counts over {}", params.path_graph.display()))?;

        correction
            .counts
            .write_tsv(&universe, create_output(params.path_out.as_ref())?, params.alphabet)?;
        Ok(())
    }
}
