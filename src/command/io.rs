use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::graph::NeighborGraphReader;
use crate::tag::{TagAlphabet, TagUniverse};

///////////////////////////////
/// Open a text file, decompressing it if needed
pub fn open_text_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let opened_handle =
        File::open(path).with_context(|| format!("Could not open {}", path.display()))?;

    let (reader, compression) = match niffler::get_reader(Box::new(opened_handle)) {
        Ok(r) => r,
        //Too short to carry a compression header, so it can only be plain text
        Err(niffler::Error::FileTooShort) => {
            let plain =
                File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
            (Box::new(plain) as Box<dyn Read>, niffler::compression::Format::No)
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Could not detect compression of {}", path.display()))
        }
    };

    log::debug!(
        "Opened file {} with compression {:?}",
        path.display(),
        compression
    );
    Ok(Box::new(BufReader::new(reader)))
}

///////////////////////////////
/// Buffered file if a path is given, otherwise stdout
pub fn create_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

pub fn read_universe(path: &Path, alphabet: TagAlphabet) -> Result<TagUniverse> {
    let universe = TagUniverse::from_text(open_text_input(path)?, alphabet)
        .with_context(|| format!("Failed to read tag universe {}", path.display()))?;
    log::info!("Read {} tags from {}", universe.len(), path.display());
    Ok(universe)
}

pub fn open_graph(path: &Path) -> Result<NeighborGraphReader<BufReader<File>>> {
    NeighborGraphReader::open_path(path)
        .with_context(|| format!("Failed to open neighbor graph {}", path.display()))
}
