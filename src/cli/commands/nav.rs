//! `prodcfg nav` command - Location bar and navigation history

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, save_session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::action::{Action, UiPatch};
use crate::core::entity::Module;
use crate::core::url::{self, HistoryMode, Location, Section, UrlState, UrlSync, ViewMode};
use crate::core::workspace::Session;
use crate::shell::{header, Navigator};

#[derive(Subcommand, Debug)]
pub enum NavCommands {
    /// Print the query string for the current state, or for the given values
    Encode(EncodeArgs),

    /// Decode a query string (unknown values fall back to defaults)
    Decode(DecodeArgs),

    /// Follow a link or query string and apply it to the store
    Open(OpenArgs),

    /// Open a section of a project's tree view
    Section(SectionArgs),

    /// Switch between card and table view
    View(ViewArgs),

    /// Open the production tree view as a new history entry
    Home,

    /// Step back one history entry
    Back,

    /// Switch the header module (dashboard, production, financial)
    Module(ModuleArgs),

    /// Toggle the sidebar
    Sidebar(SidebarArgs),

    /// Show the current location and the history stack
    Show,
}

#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub section: Option<Section>,

    #[arg(long)]
    pub view: Option<ViewMode>,
}

#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    /// Query string, with or without the leading '?'
    pub query: String,
}

#[derive(clap::Args, Debug)]
pub struct OpenArgs {
    /// `/path?query`, or a bare query applied to the current path
    pub target: String,

    /// Record a new history entry instead of replacing the current one
    #[arg(long)]
    pub push: bool,
}

#[derive(clap::Args, Debug)]
pub struct SectionArgs {
    /// general, configuration, production, materials, reports, administration
    pub section: Section,

    /// Project to open (default: the active project, else the first)
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ViewArgs {
    /// card or table (default: the configured default view)
    pub mode: Option<ViewMode>,
}

#[derive(clap::Args, Debug)]
pub struct ModuleArgs {
    pub module: Module,
}

#[derive(clap::Args, Debug)]
pub struct SidebarArgs {
    /// Toggle the compact (unfoldable) sidebar instead of visibility
    #[arg(long)]
    pub unfoldable: bool,
}

pub fn run(cmd: NavCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        NavCommands::Encode(args) => run_encode(args, global),
        NavCommands::Decode(args) => run_decode(args, global),
        NavCommands::Open(args) => run_open(args, global),
        NavCommands::Section(args) => run_section(args, global),
        NavCommands::View(args) => run_view(args, global),
        NavCommands::Home => run_home(global),
        NavCommands::Back => run_back(global),
        NavCommands::Module(args) => run_module(args, global),
        NavCommands::Sidebar(args) => run_sidebar(args, global),
        NavCommands::Show => run_show(global),
    }
}

fn run_encode(args: EncodeArgs, global: &GlobalOpts) -> Result<()> {
    let explicit = args.project.is_some() || args.section.is_some() || args.view.is_some();
    let state = if explicit {
        UrlState {
            project: args.project,
            section: args.section.unwrap_or_default(),
            view: args.view.unwrap_or_default(),
        }
    } else {
        let session = open_session(global)?;
        UrlState::from_state(&session.store.state())
    };
    println!("{}", url::encode(&state));
    Ok(())
}

fn run_decode(args: DecodeArgs, global: &GlobalOpts) -> Result<()> {
    let state = url::decode(&args.query);
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&state).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&state).into_diagnostic()?);
        }
        _ => print_url_state(&state),
    }
    Ok(())
}

fn target_location(target: &str, current: &Location) -> Location {
    if target.starts_with('/') {
        Location::parse(target)
    } else {
        Location::new(current.path.clone(), target.trim_start_matches('?'))
    }
}

fn run_open(args: OpenArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let location = target_location(&args.target, session.sync.location());
    let mode = if args.push { HistoryMode::Push } else { HistoryMode::Replace };

    session.sync.open(&mut session.store, location, mode);
    save_session(&session)?;
    report_location(&session, global);
    Ok(())
}

fn run_section(args: SectionArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let project = match args.project {
        Some(id) => Some(id),
        None => UrlSync::resolve_project(&UrlState::default(), &session.store.state()),
    }
    .ok_or_else(|| miette::miette!("No project to open. Create one with 'prodcfg project new'."))?;

    let mut navigator = Navigator::new(&session.store.state(), session.config.auto_expand_first_set());
    navigator.open_section(&mut session.store, &mut session.sync, &project, args.section);
    save_session(&session)?;
    report_location(&session, global);
    Ok(())
}

fn run_view(args: ViewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let mode = args.mode.unwrap_or_else(|| session.config.default_view());
    let state = session.store.dispatch(Action::Set(UiPatch::view(mode)));
    session.sync.sync(&state);
    save_session(&session)?;
    report_location(&session, global);
    Ok(())
}

fn run_home(global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let navigator = Navigator::new(&session.store.state(), false);
    navigator.open_tree_view(&mut session.store, &mut session.sync);
    save_session(&session)?;
    report_location(&session, global);
    Ok(())
}

fn run_back(global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if !session.sync.back(&mut session.store) {
        return Err(miette::miette!("Already at the start of the history"));
    }
    save_session(&session)?;
    report_location(&session, global);
    Ok(())
}

fn run_module(args: ModuleArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    header::switch_module(&mut session.store, &mut session.sync, args.module);
    save_session(&session)?;
    report_location(&session, global);
    Ok(())
}

fn run_sidebar(args: SidebarArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    if args.unfoldable {
        Navigator::new(&session.store.state(), false).toggle_unfoldable(&mut session.store);
    } else {
        header::toggle_sidebar(&mut session.store);
    }
    save_session(&session)?;

    if !global.quiet {
        let state = session.store.state();
        let ui = &state.ui;
        println!(
            "{}: {} | {}: {}",
            style("Sidebar").bold(),
            if ui.sidebar_show { "shown" } else { "hidden" },
            style("Unfoldable").bold(),
            if ui.sidebar_unfoldable { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let history = session.sync.history();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(history).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(history).into_diagnostic()?);
        }
        _ => {
            let depth = history.depth();
            for (idx, location) in history.entries().enumerate() {
                if idx + 1 == depth {
                    println!("{} {}", style("→").green(), style(location).cyan());
                } else {
                    println!("  {}", style(location).dim());
                }
            }
            println!();
            print_url_state(&UrlState::from_state(&session.store.state()));
        }
    }
    Ok(())
}

fn report_location(session: &Session, global: &GlobalOpts) {
    if global.quiet {
        println!("{}", session.sync.location());
        return;
    }
    println!("{} {}", style("→").green(), style(session.sync.location()).cyan());
    print_url_state(&UrlState::from_state(&session.store.state()));
}

fn print_url_state(state: &UrlState) {
    println!(
        "{}: {}",
        style("Project").bold(),
        state.project.as_deref().unwrap_or("-")
    );
    println!("{}: {}", style("Section").bold(), state.section.title());
    println!("{}: {}", style("View").bold(), state.view);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_query_keeps_current_path() {
        let current = Location::new("/production/treeview", "project=proj-001");
        let target = target_location("?section=reports", &current);
        assert_eq!(target.path, "/production/treeview");
        assert_eq!(target.query, "section=reports");
    }

    #[test]
    fn test_href_replaces_path() {
        let current = Location::default();
        let target = target_location("/financial/treeview?project=proj-002", &current);
        assert_eq!(target.path, "/financial/treeview");
        assert_eq!(target.query, "project=proj-002");
    }
}
