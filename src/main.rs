use clap::Parser;
use miette::Result;
use prodcfg::cli::logging::{init_logging, LogConfig};
use prodcfg::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    init_logging(&LogConfig::from_verbosity(global.verbose, global.quiet))
        .map_err(|e| miette::miette!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Init(args) => prodcfg::cli::commands::init::run(args),
        Commands::Project(cmd) => prodcfg::cli::commands::project::run(cmd, &global),
        Commands::Select(cmd) => prodcfg::cli::commands::select::run(cmd, &global),
        Commands::Nav(cmd) => prodcfg::cli::commands::nav::run(cmd, &global),
        Commands::Tree(args) => prodcfg::cli::commands::tree::run(args, &global),
        Commands::Part(cmd) => prodcfg::cli::commands::part::run(cmd, &global),
        Commands::Qual(cmd) => prodcfg::cli::commands::qual::run(cmd, &global),
        Commands::Build(cmd) => prodcfg::cli::commands::build::run(cmd, &global),
        Commands::Timeline(cmd) => prodcfg::cli::commands::timeline::run(cmd, &global),
        Commands::Completions(args) => prodcfg::cli::commands::completions::run(args),
    }
}
