use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::FormatError;
use crate::template::TemplateError;

pub const USAGE: &str = "Usage: go-lazy [-package=<pkg>] [-out=<file>] [<name> <type>]...";

/// Every way a generation run can fail; all of them end the run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{}\n{reason}", USAGE)]
    Usage { reason: String },
    #[error("failed to create {}: {source}", path.display())]
    Destination { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("failed to write {target}: {source}")]
    Write { target: String, source: io::Error },
}
