use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;

pub const DEFAULT_PACKAGE: &str = "lazy";

// Flags that consume the following argument when no `=value` is attached.
const VALUE_FLAGS: &[&str] = &[
    "package",
    "out",
    "test-out",
    "types-file",
    "formatter",
    "gofmt-bin",
];

#[derive(Parser, Debug)]
#[command(name = "go-lazy", version)]
#[command(
    about = "Generate concurrency-safe lazily evaluated wrappers for Go types",
    long_about = None
)]
pub struct Cli {
    /// Package the generated file should reside in.
    #[arg(long, default_value = DEFAULT_PACKAGE)]
    pub package: String,
    /// Where to write the output (defaults to stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Also write a race test for the generated wrappers to this file.
    #[arg(long = "test-out")]
    pub test_out: Option<PathBuf>,
    /// YAML or JSON list of {name, type} entries, generated before the positional pairs.
    #[arg(long = "types-file")]
    pub types_file: Option<PathBuf>,
    /// How the generated source is formatted and validated.
    #[arg(long, value_enum, default_value_t = FormatterKind::Auto)]
    pub formatter: FormatterKind,
    /// Path to the gofmt binary.
    #[arg(long = "gofmt-bin")]
    pub gofmt_bin: Option<PathBuf>,
    /// Print the built-in type catalog as JSON and exit.
    #[arg(long = "list-catalog", num_args = 0..=1, require_equals = true,
          default_missing_value = "true", default_value_t = false,
          action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub list_catalog: bool,
    /// Print progress and a summary to stderr.
    #[arg(long, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", default_value_t = false,
          action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub verbose: bool,
    /// Alternating <name> <type> pairs; the built-in catalog is used when none are given.
    #[arg(value_name = "NAME TYPE")]
    pub pairs: Vec<String>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FormatterKind {
    /// gofmt when it can be found, the built-in formatter otherwise.
    Auto,
    Gofmt,
    Builtin,
}

/// Rewrites Go-style flags (`-package x`, `-out=f`) into the long form clap
/// expects, and stops flag parsing at the first positional argument the way
/// Go's flag package does.
pub fn normalize_go_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut expects_value = false;

    for arg in args.by_ref() {
        // Attach the value so clap accepts values that begin with a dash.
        if expects_value {
            if let Some(flag) = normalized.last_mut() {
                flag.push("=");
                flag.push(&arg);
            }
            expects_value = false;
            continue;
        }

        let Some(text) = arg.to_str() else {
            normalized.push(OsString::from("--"));
            normalized.push(arg);
            break;
        };
        if text == "--" {
            normalized.push(arg);
            break;
        }
        if text == "-" || !text.starts_with('-') {
            normalized.push(OsString::from("--"));
            normalized.push(arg);
            break;
        }

        let flag = text
            .strip_prefix("--")
            .or_else(|| text.strip_prefix('-'))
            .unwrap_or(text);
        let (name, inline_value) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (flag, None),
        };
        expects_value = inline_value.is_none() && VALUE_FLAGS.contains(&name);

        if name.chars().count() > 1 {
            normalized.push(OsString::from(format!("--{flag}")));
        } else {
            normalized.push(arg);
        }
    }

    normalized.extend(args);
    normalized
}
