use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::io::{open_text_input, read_universe};
use crate::graph::{
    write_graph_from_records, DuplicateNeighbors, NeighborGraphWriter, OverflowMode, WriterOptions,
};
use crate::runtime::Config;
use crate::tag::TagAlphabet;

#[derive(Args)]
pub struct WriteGraphCMD {
    #[arg(short = 't', value_parser)]
    /// Tag universe: tag count, then one sorted tag per line
    pub path_tags: PathBuf,

    #[arg(short = 'n', value_parser)]
    /// Neighbor records, tab separated
    pub path_neighbors: PathBuf,

    #[arg(short = 'o', value_parser)]
    /// Binary graph file to write
    pub path_out: PathBuf,

    #[arg(long = "overflow", value_enum, default_value_t = OverflowMode::Compat)]
    /// What to do with tags whose neighbor probabilities sum to more than 1
    pub overflow: OverflowMode,

    #[arg(long = "duplicates", value_enum, default_value_t = DuplicateNeighbors::Keep)]
    /// What to do with neighbors listed twice for one tag
    pub duplicates: DuplicateNeighbors,

    #[arg(long = "fill-missing")]
    /// Give tags without a record one with only their self-edge
    pub fill_missing: bool,
}
impl WriteGraphCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        WriteGraph::run(&WriteGraph {
            path_tags: self.path_tags.clone(),
            path_neighbors: self.path_neighbors.clone(),
            path_out: self.path_out.clone(),
            alphabet: Config::get().alphabet,
            options: WriterOptions {
                overflow: self.overflow,
                duplicates: self.duplicates,
            },
            fill_missing: self.fill_missing,
        })?;

        log::info!("WriteGraph has finished successfully");
        Ok(())
    }
}

pub struct WriteGraph {
    pub path_tags: PathBuf,
    pub path_neighbors: PathBuf,
    pub path_out: PathBuf,
    pub alphabet: TagAlphabet,
    pub options: WriterOptions,
    pub fill_missing: bool,
}
impl WriteGraph {
    /// Run the algorithm
    pub fn run(params: &WriteGraph) -> Result<()> {
        let universe = read_universe(&params.path_tags, params.alphabet)?;

        let mut writer = NeighborGraphWriter::create(&params.path_out, params.options)
            .with_context(|| format!("Could not create graph file {}", params.path_out.display()))?;

        let input = open_text_input(&params.path_neighbors)?;
        write_graph_from_records(
            &universe,
            params.alphabet,
            input,
            &mut writer,
            params.fill_missing,
        )
        .with_context(|| format!("Failed to convert neighbor records in {}", params.path_neighbors.display()))?;

        if writer.num_overflowed() > 0 {
            log::warn!(
                "{} tags had neighbor probabilities summing to more than 1",
                writer.num_overflowed()
            );
        }
        let (_, node_count) = writer.finish()?;
        log::info!("Wrote {} nodes to {}", node_count, params.path_out.display());
        Ok(())
    }
}
