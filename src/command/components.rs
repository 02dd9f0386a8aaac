use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use itertools::Itertools;

use super::io::{create_output, open_graph};
use crate::graph::{component_sizes, members_of, ComponentTracker};

#[derive(Args)]
pub struct ComponentsCMD {
    #[arg(short = 'g', value_parser)]
    /// Binary graph file
    pub path_graph: PathBuf,

    #[arg(long = "tag", value_parser)]
    /// Only list the tag ids in the component of this tag id
    pub tag: Option<usize>,

    #[arg(long = "sizes")]
    /// Write the size of each component instead of the component of each tag
    pub sizes: bool,

    #[arg(short = 'o', value_parser)]
    /// Output file; stdout if not given
    pub path_out: Option<PathBuf>,
}
impl ComponentsCMD {
    /// Run the commandline option
    pub fn try_execute(&mut self) -> Result<()> {
        Components::run(&Components {
            path_graph: self.path_graph.clone(),
            path_out: self.path_out.clone(),
            tag: self.tag,
            sizes: self.sizes,
        })
    }
}

pub struct Components {
    pub path_graph: PathBuf,
    pub path_out: Option<PathBuf>,
    pub tag: Option<usize>,
    pub sizes: bool,
}
impl Components {
    /// Run the algorithm
    pub fn run(params: &Components) -> Result<()> {
        let mut graph = open_graph(&params.path_graph)?;

        //The graph does not store the universe size, so size the tracker from the ids in it
        let num_nodes = graph.id_bound()?;
        let mut tracker = ComponentTracker::new(num_nodes);
        tracker
            .add_graph(&mut graph)
            .with_context(|| format!("Failed to scan {}", params.path_graph.display()))?;

        let mut assignments = Vec::new();
        let num_components = tracker.get_node_components(&mut assignments);
        log::info!(
            "{} tag ids in {} connected components",
            num_nodes,
            num_components
        );

        let mut out = create_output(params.path_out.as_ref())?;
        if let Some(tag) = params.tag {
            let component = *assignments.get(tag).with_context(|| {
                format!("Tag id {} is not in the graph, which has ids below {}", tag, num_nodes)
            })?;
            writeln!(out, "{}", members_of(&assignments, component).iter().join("\t"))?;
        } else if params.sizes {
            for (component, size) in component_sizes(&assignments, num_components)
                .into_iter()
                .enumerate()
            {
                writeln!(out, "{}\t{}", component, size)?;
            }
        } else {
            for (id, component) in assignments.iter().enumerate() {
                writeln!(out, "{}\t{}", id, component)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}
