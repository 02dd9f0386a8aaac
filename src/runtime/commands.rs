use std::fmt;

use clap::Subcommand;

use crate::command;

///////////////////////////////
/// Possible subcommands to parse
#[derive(Subcommand)]
pub enum Commands {
    /// List likely misreadings of each tag from its quality scores
    FindNeighbors(command::FindNeighborsCMD),
    /// Convert neighbor records into a binary neighbor graph
    WriteGraph(command::WriteGraphCMD),
    /// Print a binary neighbor graph as text
    DumpGraph(command::DumpGraphCMD),
    /// Connected components of a neighbor graph
    Components(command::ComponentsCMD),
    /// Expected observed counts and their spread, given true counts
    Observed(command::ObservedCMD),
    /// Estimate true counts from observed counts
    Correct(command::CorrectCMD),
}

impl Commands {
    /// Run the chosen subcommand
    pub fn try_execute(&mut self) -> anyhow::Result<()> {
        match self {
            Commands::FindNeighbors(cmd) => cmd.try_execute(),
            Commands::WriteGraph(cmd) => cmd.try_execute(),
            Commands::DumpGraph(cmd) => cmd.try_execute(),
            Commands::Components(cmd) => cmd.try_execute(),
            Commands::Observed(cmd) => cmd.try_execute(),
            Commands::Correct(cmd) => cmd.try_execute(),
        }
    }
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = match self {
            Commands::FindNeighbors(_) => "FindNeighbors",
            Commands::WriteGraph(_) => "WriteGraph",
            Commands::DumpGraph(_) => "DumpGraph",
            Commands::Components(_) => "Components",
            Commands::Observed(_) => "Observed",
            Commands::Correct(_) => "Correct",
        };
        write!(f, "{}", cmd)
    }
}
