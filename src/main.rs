use clap::Parser;
use go_lazy::cli::{Cli, normalize_go_flags};
use go_lazy::run;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(normalize_go_flags(std::env::args_os()));
    run(cli)
}
