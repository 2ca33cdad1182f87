//! `prodcfg timeline` command - Delivery timeline and discussion board

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, report_validation, save_session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::url;
use crate::core::workspace::Session;
use crate::editors::timeline::{Health, MilestoneStatus};
use crate::editors::{CommentDraft, Timeline};

#[derive(Subcommand, Debug)]
pub enum TimelineCommands {
    /// Show the project's capsule, milestones and discussion feed
    Show(ShowArgs),

    /// Post an update to the discussion feed
    Comment(CommentArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project (default: the location's project, else the active one)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Only the newest N comments
    #[arg(long, short = 'n')]
    pub comments: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct CommentArgs {
    /// Project (default: the location's project, else the active one)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Who is posting
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Contributor, PMO, Engineering, Quality or Operations
    #[arg(long, short = 'r')]
    pub role: Option<String>,

    /// The update
    #[arg(long, short = 't')]
    pub text: Option<String>,
}

const MILESTONE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 10),
    ColumnDef::new("date", "DATE", 8),
    ColumnDef::new("title", "TITLE", 28),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("owner", "OWNER", 16),
];

const PROGRESS_WIDTH: usize = 20;

pub fn run(cmd: TimelineCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TimelineCommands::Show(args) => run_show(args, global),
        TimelineCommands::Comment(args) => run_comment(args, global),
    }
}

fn mount(session: &mut Session, project: Option<&str>) {
    let url_project = project
        .map(str::to_string)
        .or_else(|| url::decode(&session.sync.location().query).project);
    let actions = session
        .editors
        .timeline
        .mount(url_project.as_deref(), &session.store.state());
    let state = session.store.dispatch_batch(actions);
    session.sync.sync(&state);
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, args.project.as_deref());
    save_session(&session)?;

    let Some(timeline) = session.editors.timeline.timeline() else {
        println!("No timeline for this project.");
        return Ok(());
    };

    let format = global.format_or(&session.config, OutputFormat::Tsv);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(timeline).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(timeline).into_diagnostic()?);
        }
        OutputFormat::Tsv | OutputFormat::Auto => print_board(timeline, args.comments),
        _ => {
            let rows: Vec<TableRow> = timeline
                .milestones
                .iter()
                .map(|m| {
                    TableRow::new(m.id.clone())
                        .cell("id", CellValue::Id(m.id.clone()))
                        .cell("date", CellValue::text(m.date.clone()))
                        .cell("title", CellValue::text(m.title.clone()))
                        .cell("status", CellValue::text(m.status.to_string()))
                        .cell("owner", CellValue::text(m.owner.clone()))
                })
                .collect();
            TableFormatter::new(MILESTONE_COLUMNS, "milestone").output(&rows, format)?;
        }
    }
    Ok(())
}

fn print_board(timeline: &Timeline, limit: Option<usize>) {
    let health = match timeline.health {
        Health::OnTrack => style(timeline.health.to_string()).green(),
        Health::Guarded => style(timeline.health.to_string()).yellow(),
        Health::Watch => style(timeline.health.to_string()).red(),
    };
    println!(
        "{} ({})  {}",
        style(&timeline.project_name).bold(),
        timeline.code,
        health
    );
    if !timeline.summary.is_empty() {
        println!("{}", style(&timeline.summary).dim());
    }
    println!("{}: {}", style("Manager").bold(), timeline.manager);
    println!("{}: {}", style("Stage").bold(), timeline.stage);
    println!(
        "{}: {} {}%",
        style("Progress").bold(),
        progress_bar(timeline.progress),
        timeline.progress
    );
    if !timeline.focus_areas.is_empty() {
        println!("{}: {}", style("Focus").bold(), timeline.focus_areas.join(", "));
    }

    println!();
    let counts: Vec<String> = timeline
        .milestone_counts()
        .iter()
        .map(|(status, n)| format!("{} {}", n, status))
        .collect();
    println!("{}  {}", style("Milestones").bold(), style(counts.join(", ")).dim());
    for milestone in &timeline.milestones {
        let status = match milestone.status {
            MilestoneStatus::Complete => style(milestone.status.to_string()).green(),
            MilestoneStatus::InProgress => style(milestone.status.to_string()).cyan(),
            MilestoneStatus::AtRisk => style(milestone.status.to_string()).yellow(),
            MilestoneStatus::Upcoming => style(milestone.status.to_string()).dim(),
        };
        println!("  {:<7} {} [{}]", milestone.date, milestone.title, status);
        if !milestone.detail.is_empty() {
            println!("          {}", style(&milestone.detail).dim());
        }
        println!("          Owner: {}", milestone.owner);
    }

    println!();
    println!(
        "{}  {}",
        style("Discussion").bold(),
        style(format!("{} updates", timeline.comments.len())).dim()
    );
    let shown = limit.unwrap_or(timeline.comments.len());
    for comment in timeline.comments.iter().take(shown) {
        println!(
            "  {} {}  {}",
            style(&comment.author).bold(),
            style(format!("[{}]", comment.role)).dim(),
            style(&comment.time).dim()
        );
        println!("    {}", comment.text);
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_WIDTH / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(PROGRESS_WIDTH - filled))
}

fn run_comment(args: CommentArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, args.project.as_deref());

    let draft = CommentDraft {
        author: args.author.unwrap_or_default(),
        role: args.role,
        text: args.text.unwrap_or_default(),
    };
    let comment_id = session
        .editors
        .timeline
        .add_comment(draft)
        .map(|comment| comment.id.clone())
        .map_err(report_validation)?;
    save_session(&session)?;

    if global.quiet {
        println!("{}", comment_id);
    } else {
        let project = session
            .editors
            .timeline
            .timeline()
            .map(|t| t.project_name.clone())
            .unwrap_or_default();
        println!(
            "{} Posted update {} to {}",
            style("✓").green(),
            style(&comment_id).cyan(),
            style(project).yellow()
        );
    }
    Ok(())
}
