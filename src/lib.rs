pub mod catalog;
pub mod cli;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod format;
pub mod ir;
pub mod syntax;
pub mod template;
pub mod tools;

use anyhow::Result;
use cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
    if cli.list_catalog {
        return driver::list_catalog();
    }
    driver::generate(&cli)
}
