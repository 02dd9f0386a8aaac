use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::io::{create_output, open_text_input};
use crate::neighbors::{write_neighbor_records, FinderOptions, NeighborFinder, QualityScale};
use crate::runtime::Config;
use crate::tag::TagAlphabet;

#[derive(Args)]
pub struct FindNeighborsCMD {
    #[arg(short = 'i', value_parser)]
    /// Tags with qualities: one `count tag q1 q2 ...` line per tag
    pub path_in: PathBuf,

    #[arg(short = 'o', value_parser)]
    /// Neighbor records to write; stdout if not given
    pub path_out: Option<PathBuf>,

    #[arg(long = "counts-out", value_parser)]
    /// Also write the raw `tag<TAB>count` of every input tag here, for use as observed counts
    pub path_counts: Option<PathBuf>,

    #[arg(short = 'c', value_parser, default_value = "7.0")]
    /// Largest summed -ln(error probability) over the substituted positions
    pub capacity: f64,

    #[arg(long = "scale", value_enum, default_value_t = QualityScale::Solexa)]
    /// Encoding of the quality scores
    pub scale: QualityScale,
}
impl FindNeighborsCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        FindNeighbors::run(&FindNeighbors {
            path_in: self.path_in.clone(),
            path_out: self.path_out.clone(),
            path_counts: self.path_counts.clone(),
            alphabet: Config::get().alphabet,
            options: FinderOptions {
                capacity: self.capacity,
                scale: self.scale,
            },
        })?;

        log::info!("FindNeighbors has finished successfully");
        Ok(())
    }
}

pub struct FindNeighbors {
    pub path_in: PathBuf,
    pub path_out: Option<PathBuf>,
    pub path_counts: Option<PathBuf>,
    pub alphabet: TagAlphabet,
    pub options: FinderOptions,
}
impl FindNeighbors {
    /// Run the algorithm
    pub fn run(params: &FindNeighbors) -> Result<()> {
        let input = open_text_input(&params.path_in)?;
        let mut out = create_output(params.path_out.as_ref())?;

        let mut counts_out = match &params.path_counts {
            Some(path) => Some(create_output(Some(path))?),
            None => None,
        };

        let mut finder = NeighborFinder::new(params.options);
        write_neighbor_records(
            &mut finder,
            params.alphabet,
            input,
            &mut out,
            counts_out.as_mut().map(|w| &mut **w as &mut dyn Write),
        )
        .with_context(|| format!("Failed to find neighbors of tags in {}", params.path_in.display()))?;
        out.flush()?;
        Ok(())
    }
}
