use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::catalog;
use crate::cli::Cli;
use crate::diagnostics::summarize;
use crate::error::GenerateError;
use crate::format::Formatter;
use crate::ir::{EntrySource, GenerationRequest, Summary, TypeEntry};
use crate::template::{render_race_test, render_source};

pub fn generate(cli: &Cli) -> Result<()> {
    let request = build_request(&cli.package, &cli.pairs, cli.types_file.as_deref())?;
    if let (Some(out), Some(test_out)) = (cli.out.as_deref(), cli.test_out.as_deref())
        && same_file(out, test_out)
    {
        return Err(GenerateError::Usage {
            reason: format!("-out and -test-out both name {}", out.display()),
        }
        .into());
    }
    let formatter = Formatter::resolve(cli.formatter, cli.gofmt_bin.as_deref())?;
    if cli.verbose {
        eprintln!(
            "Generating {} wrappers in package {} with {}",
            request.entries.len(),
            request.package,
            formatter.describe()
        );
    }

    let mut destination = Destination::open(cli.out.as_deref())?;
    let mut test_destination = cli
        .test_out
        .as_deref()
        .map(|path| Destination::open(Some(path)))
        .transpose()?;

    let raw = render_source(&request).map_err(GenerateError::from)?;
    let source = formatter
        .format(&raw, cli.verbose)
        .map_err(GenerateError::from)?;
    let race_test = match test_destination.as_ref() {
        Some(_) => {
            let raw = render_race_test(&request).map_err(GenerateError::from)?;
            Some(
                formatter
                    .format(&raw, cli.verbose)
                    .map_err(GenerateError::from)?,
            )
        }
        None => None,
    };

    destination.write_document(&source)?;
    if let (Some(test_destination), Some(race_test)) = (test_destination.as_mut(), race_test) {
        test_destination.write_document(&race_test)?;
    }

    if cli.verbose {
        let summary = Summary {
            package: request.package.clone(),
            entries: request.entries.len(),
            source: request.source,
            formatter: formatter.describe(),
            output: destination.describe(),
            bytes_written: source.len(),
            test_output: test_destination.as_ref().map(Destination::describe),
        };
        eprintln!("{}", summarize(&summary));
    }

    Ok(())
}

/// Pairs up positional arguments, appends them to any types-file entries,
/// and falls back to the catalog when nothing was requested.
pub fn build_request(
    package: &str,
    pairs: &[String],
    types_file: Option<&Path>,
) -> Result<GenerationRequest> {
    if pairs.len() % 2 != 0 {
        return Err(GenerateError::Usage {
            reason: format!(
                "expected <name> <type> pairs, got {} arguments",
                pairs.len()
            ),
        }
        .into());
    }

    let mut entries = match types_file {
        Some(path) => read_types_file(path)?,
        None => Vec::new(),
    };
    entries.extend(
        pairs
            .chunks_exact(2)
            .map(|pair| TypeEntry::new(pair[0].as_str(), pair[1].as_str())),
    );

    let source = if entries.is_empty() {
        entries = catalog::entries();
        EntrySource::Catalog
    } else {
        EntrySource::Explicit
    };

    Ok(GenerationRequest {
        package: package.to_string(),
        entries,
        source,
    })
}

/// Whether two destination paths end up at the same file. Empty paths mean stdout.
fn same_file(a: &Path, b: &Path) -> bool {
    if a.as_os_str().is_empty() || b.as_os_str().is_empty() {
        return false;
    }
    a == b || resolve_destination(a).is_some_and(|a| resolve_destination(b) == Some(a))
}

// The file may not exist yet, so only its directory is canonicalized.
fn resolve_destination(path: &Path) -> Option<PathBuf> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Some(fs::canonicalize(parent).ok()?.join(path.file_name()?))
}

pub fn read_types_file(path: &Path) -> Result<Vec<TypeEntry>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read types file {}", path.display()))?;
    serde_yaml_bw::from_str(&contents)
        .with_context(|| format!("invalid types file {}", path.display()))
}

pub fn list_catalog() -> Result<()> {
    let json = serde_json::to_string_pretty(&catalog::entries())?;
    println!("{json}");
    Ok(())
}

/// Where a generated document goes. Files are created up front and closed on drop.
enum Destination {
    Stdout,
    File { path: PathBuf, file: fs::File },
}

impl Destination {
    fn open(path: Option<&Path>) -> Result<Self, GenerateError> {
        match path.filter(|path| !path.as_os_str().is_empty()) {
            None => Ok(Self::Stdout),
            Some(path) => {
                let file = fs::File::create(path).map_err(|source| GenerateError::Destination {
                    path: path.to_path_buf(),
                    source,
                })?;
                Ok(Self::File {
                    path: path.to_path_buf(),
                    file,
                })
            }
        }
    }

    fn write_document(&mut self, contents: &str) -> Result<(), GenerateError> {
        let target = self.describe();
        let result = match self {
            Self::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(contents.as_bytes())
                    .and_then(|()| stdout.flush())
            }
            Self::File { file, .. } => file
                .write_all(contents.as_bytes())
                .and_then(|()| file.flush()),
        };
        result.map_err(|source| GenerateError::Write { target, source })
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdout => "stdout".to_string(),
            Self::File { path, .. } => path.display().to_string(),
        }
    }
}
