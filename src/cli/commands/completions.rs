//! Shell completion generation
//!
//! # Usage
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(prodcfg completions bash)
//!
//! # Zsh - add to ~/.zshrc
//! source <(prodcfg completions zsh)
//!
//! # Fish
//! prodcfg completions fish > ~/.config/fish/completions/prodcfg.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "prodcfg", &mut io::stdout());
    Ok(())
}
