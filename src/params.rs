use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "flyq-multi")]
pub struct Params {
    /// TOML file with `[shared]`, `[listener]` and `[multi.<key>]` sections.
    #[arg(long, env = "FLYQ_MULTI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Routing keys to resolve once assembly is done.
    #[arg(long = "route")]
    pub routes: Vec<String>,
}
