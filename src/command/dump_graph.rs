use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::io::{create_output, open_graph, read_universe};
use crate::graph::dump_graph;
use crate::runtime::Config;
use crate::tag::TagAlphabet;

#[derive(Args)]
pub struct DumpGraphCMD {
    #[arg(short = 't', value_parser)]
    /// Tag universe the graph was written with
    pub path_tags: PathBuf,

    #[arg(short = 'g', value_parser)]
    /// Binary graph file
    pub path_graph: PathBuf,

    #[arg(short = 'o', value_parser)]
    /// Where to write the text; stdout if not given
    pub path_out: Option<PathBuf>,
}
impl DumpGraphCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        DumpGraph::run(&DumpGraph {
            path_tags: self.path_tags.clone(),
            path_graph: self.path_graph.clone(),
            path_out: self.path_out.clone(),
            alphabet: Config::get().alphabet,
        })
    }
}

pub struct DumpGraph {
    pub path_tags: PathBuf,
    pub path_graph: PathBuf,
    pub path_out: Option<PathBuf>,
    pub alphabet: TagAlphabet,
}
impl DumpGraph {
    /// Run the algorithm
    pub fn run(params: &DumpGraph) -> Result<()> {
        let universe = read_universe(&params.path_tags, params.alphabet)?;
        let mut graph = open_graph(&params.path_graph)?;
        let mut out = create_output(params.path_out.as_ref())?;

        let n = dump_graph(&mut graph, &universe, params.alphabet, &mut out)
            .with_context(|| format!("Failed to dump {}", params.path_graph.display()))?;
        out.flush()?;
        log::debug!("Dumped {} records", n);
        Ok(())
    }
}
