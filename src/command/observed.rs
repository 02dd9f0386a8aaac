use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use itertools::izip;
use serde::Serialize;

use super::io::{create_output, open_graph, open_text_input, read_universe};
use crate::recount::{RecountComputer, TagCounts};
use crate::runtime::Config;
use crate::tag::TagAlphabet;

#[derive(Args)]
pub struct ObservedCMD {
    #[arg(short = 't', value_parser)]
    /// Tag universe
    pub path_tags: PathBuf,

    #[arg(short = 'g', value_parser)]
    /// Binary graph file
    pub path_graph: PathBuf,

    #[arg(short = 'c', value_parser)]
    /// True counts, `tag<TAB>count` per line
    pub path_counts: PathBuf,

    #[arg(short = 'o', value_parser)]
    /// Where to write `tag mean stdev`; stdout if not given
    pub path_out: Option<PathBuf>,
}
impl ObservedCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        Observed::run(&Observed {
            path_tags: self.path_tags.clone(),
            path_graph: self.path_graph.clone(),
            path_counts: self.path_counts.clone(),
            path_out: self.path_out.clone(),
            alphabet: Config::get().alphabet,
        })
    }
}

#[derive(Debug, Serialize)]
struct ObservedRow<'a> {
    tag: &'a str,
    mean: f64,
    stdev: f64,
}

pub struct Observed {
    pub path_tags: PathBuf,
    pub path_graph: PathBuf,
    pub path_counts: PathBuf,
    pub path_out: Option<PathBuf>,
    pub alphabet: TagAlphabet,
}
impl Observed {
    /// Run the algorithm
    pub fn run(params: &Observed) -> Result<()> {
        let universe = read_universe(&params.path_tags, params.alphabet)?;
        let true_counts =
            TagCounts::from_text(&universe, open_text_input(&params.path_counts)?, params.alphabet)
                .with_context(|| format!("Failed to read counts {}", params.path_counts.display()))?;

        let mut graph = open_graph(&params.path_graph)?;
        let (mean, variance) = RecountComputer::new(&mut graph)
            .moments_from_true(&true_counts)
            .with_context(|| format!("Failed to propagate counts over {}", params.path_graph.display()))?;
        log::info!(
            "True counts sum to {}, expected observed counts to {}",
            true_counts.sum(),
            mean.sum()
        );

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(create_output(params.path_out.as_ref())?);
        for (tag, &m, &v) in izip!(universe.iter(), mean.iter(), variance.iter()) {
            let tag = tag.to_literal(params.alphabet)?;
            writer.serialize(ObservedRow {
                tag: &tag,
                mean: m,
                stdev: v.sqrt(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
