use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;

use crate::cli::FormatterKind;
use crate::syntax::{GoParser, GrammarError, SyntaxError};
use crate::tools::{resolve_gofmt_bin, run_gofmt};

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("<generated>:{0}")]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error("gofmt failed ({status}):\n{stderr}")]
    Gofmt { status: String, stderr: String },
    #[error("failed to run gofmt at {}: {source}", bin.display())]
    Spawn { bin: PathBuf, source: io::Error },
    #[error("gofmt produced non-UTF-8 output")]
    Encoding,
}

/// Turns generated text into canonical Go source, or rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    Gofmt(PathBuf),
    Builtin,
}

impl Formatter {
    pub fn resolve(kind: FormatterKind, gofmt_bin: Option<&Path>) -> Result<Self> {
        match kind {
            FormatterKind::Builtin => Ok(Self::Builtin),
            FormatterKind::Gofmt => resolve_gofmt_bin(gofmt_bin).map(Self::Gofmt),
            FormatterKind::Auto => {
                Ok(resolve_gofmt_bin(gofmt_bin).map_or(Self::Builtin, Self::Gofmt))
            }
        }
    }

    pub fn format(&self, source: &str, verbose: bool) -> Result<String, FormatError> {
        match self {
            Self::Gofmt(bin) => run_gofmt(bin, source, verbose),
            Self::Builtin => canonicalize(source),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Gofmt(bin) => format!("gofmt ({})", bin.display()),
            Self::Builtin => "builtin".to_string(),
        }
    }
}

/// Validates `source` as Go and normalizes its whitespace.
///
/// This does not re-indent or realign; it relies on the input already being
/// laid out the way gofmt would lay it out, which holds for the templates.
pub fn canonicalize(source: &str) -> Result<String, FormatError> {
    GoParser::new()?.parse(source)?;
    Ok(normalize_whitespace(source))
}

fn normalize_whitespace(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pending_blank = false;
    for line in source.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{FormatError, Formatter, canonicalize, normalize_whitespace};
    use crate::cli::FormatterKind;

    #[test]
    fn collapses_blank_runs_and_trailing_space() {
        let input = "\n\npackage p  \n\n\n\nvar x = 1\t\n\n";
        assert_eq!(normalize_whitespace(input), "package p\n\nvar x = 1\n");
    }

    #[test]
    fn canonical_input_is_unchanged() {
        let input = "package p\n\nfunc f() int {\n\treturn 1\n}\n";
        assert_eq!(canonicalize(input).unwrap(), input);
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = canonicalize("package p\n\ntype T map[string]\n").unwrap_err();
        assert!(matches!(err, FormatError::Syntax(_)));
        assert!(err.to_string().starts_with("<generated>:3:"));
    }

    #[test]
    fn builtin_kind_never_looks_for_gofmt() {
        let formatter = Formatter::resolve(FormatterKind::Builtin, None).unwrap();
        assert_eq!(formatter, Formatter::Builtin);
        assert_eq!(formatter.describe(), "builtin");
    }
}
