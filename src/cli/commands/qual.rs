//! `prodcfg qual` command - Part qualification tests

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{open_session, report_validation, save_session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::PartStatus;
use crate::core::url;
use crate::core::workflow::QualificationWorkflow;
use crate::core::workspace::Session;
use crate::editors::TestDraft;
use crate::entities::{Part, QcTest};

#[derive(Subcommand, Debug)]
pub enum QualCommands {
    /// List parts with their QC tests and qualification score
    List(ListArgs),

    /// Add a QC test to a part
    AddTest(AddTestArgs),

    /// Attach a document reference to a test
    Attach(AttachArgs),

    /// Print a part's qualification score
    Score(PartArgs),

    /// Move a part to another qualification status
    Transition(TransitionArgs),

    /// Expand or collapse a set or part in the listing
    Toggle(ToggleArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct ProjectArg {
    /// Project (default: the location's project, else the active one)
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Only this part
    #[arg(long)]
    pub part: Option<String>,

    /// List each part's tests by execution order instead of as entered
    #[arg(long)]
    pub sort_by_order: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddTestArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Part receiving the test
    #[arg(long)]
    pub part: String,

    /// Test name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Execution order (whole number, at least 1)
    #[arg(long, short = 'o')]
    pub order: Option<String>,

    /// Weight in the qualification score, 0 to 1
    #[arg(long, short = 'w')]
    pub weight: Option<String>,

    /// Name of an already attached document
    #[arg(long, short = 'd')]
    pub document: Option<String>,

    /// A non-conformance report was raised
    #[arg(long)]
    pub ncr: bool,

    #[arg(long, short = 'r')]
    pub remarks: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AttachArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    pub part: String,

    pub test: String,

    /// Document reference (default: QC_Attachment_<test>.pdf)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PartArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    pub part: String,
}

#[derive(clap::Args, Debug)]
pub struct TransitionArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    pub part: String,

    /// draft, under-review or qualified
    pub status: PartStatus,
}

#[derive(clap::Args, Debug)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub project: ProjectArg,

    /// Set or part ID
    pub id: String,
}

const TEST_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("part", "PART", 12),
    ColumnDef::new("order", "ORD", 4),
    ColumnDef::new("id", "TEST", 16),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("weight", "WEIGHT", 7),
    ColumnDef::new("document", "DOCUMENT", 28),
    ColumnDef::new("ncr", "NCR", 4),
];

#[derive(Serialize)]
struct PartScore<'a> {
    part: &'a Part,
    score: f64,
}

pub fn run(cmd: QualCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QualCommands::List(args) => run_list(args, global),
        QualCommands::AddTest(args) => run_add_test(args, global),
        QualCommands::Attach(args) => run_attach(args, global),
        QualCommands::Score(args) => run_score(args, global),
        QualCommands::Transition(args) => run_transition(args, global),
        QualCommands::Toggle(args) => run_toggle(args, global),
    }
}

/// Open the qualification editor on the requested project
fn mount(session: &mut Session, project: &ProjectArg) {
    let url_project = project
        .project
        .clone()
        .or_else(|| url::decode(&session.sync.location().query).project);
    let actions = session
        .editors
        .qualification
        .mount(url_project.as_deref(), &session.store.state());
    let state = session.store.dispatch_batch(actions);
    session.sync.sync(&state);
}

fn part_not_found(part_id: &str, session: &Session) -> miette::Report {
    let project = session
        .editors
        .qualification
        .selection()
        .project
        .clone()
        .unwrap_or_else(|| "-".to_string());
    miette::miette!("Part {} not found in project {}", part_id, project)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.project);
    save_session(&session)?;

    let editor = &session.editors.qualification;
    let parts: Vec<&Part> = editor
        .available_sets()
        .iter()
        .flat_map(|set| set.parts.iter())
        .filter(|p| args.part.as_deref().map_or(true, |id| p.id == id))
        .collect();

    let format = global.format_or(&session.config, OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let scored: Vec<PartScore> = parts
                .iter()
                .map(|&part| PartScore {
                    part,
                    score: part.qualification_score(),
                })
                .collect();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&scored).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&scored).into_diagnostic()?);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            if parts.is_empty() {
                println!("No parts found.");
                return Ok(());
            }
            for set in editor.available_sets() {
                let listed: Vec<&Part> = parts
                    .iter()
                    .copied()
                    .filter(|p| set.part(&p.id).is_some())
                    .collect();
                if listed.is_empty() {
                    continue;
                }
                println!(
                    "{} {} {}",
                    expand_marker(editor.is_set_expanded(&set.id)),
                    style(&set.id).cyan(),
                    style(&set.name).bold()
                );
                for part in listed {
                    print_part(part, editor.is_part_expanded(&part.id), args.sort_by_order);
                }
            }
        }
        _ => {
            let rows: Vec<TableRow> = parts
                .iter()
                .flat_map(|part| listed_tests(part, args.sort_by_order).into_iter().map(move |t| (part, t)))
                .map(|(part, test)| {
                    TableRow::new(test.id.clone())
                        .cell("part", CellValue::Id(part.id.clone()))
                        .cell("order", CellValue::Number(test.order as usize))
                        .cell("id", CellValue::Id(test.id.clone()))
                        .cell("name", CellValue::text(test.name.clone()))
                        .cell("weight", CellValue::Weight(test.qc_weight))
                        .cell("document", CellValue::optional(test.document.as_deref()))
                        .cell("ncr", CellValue::Flag(test.ncr))
                })
                .collect();
            TableFormatter::new(TEST_COLUMNS, "test").output(&rows, format)?;
        }
    }
    Ok(())
}

/// Tests as entered, or by execution order when asked
fn listed_tests(part: &Part, sort_by_order: bool) -> Vec<&QcTest> {
    if sort_by_order {
        part.tests_by_order()
    } else {
        part.tests.iter().collect()
    }
}

fn expand_marker(expanded: bool) -> console::StyledObject<&'static str> {
    style(if expanded { "▾" } else { "▸" }).dim()
}

fn print_part(part: &Part, expanded: bool, sort_by_order: bool) {
    println!(
        "  {} {} {} [{}]  {}: {}  {}: {:.2}",
        expand_marker(expanded),
        style(&part.id).cyan(),
        style(part.display_name()).bold(),
        part.status,
        style("tests support").dim(),
        QualificationWorkflow::new().derive_status(part),
        style("score").dim(),
        part.qualification_score()
    );
    let tests = listed_tests(part, sort_by_order);
    if tests.is_empty() {
        println!("      {}", style("no QC tests").dim());
    }
    for test in tests {
        let document = match test.document.as_deref() {
            Some(doc) => style(doc.to_string()).green(),
            None => style("no document".to_string()).dim(),
        };
        let ncr = if test.ncr {
            format!("  {}", style("NCR").red())
        } else {
            String::new()
        };
        println!(
            "      {}. {} {} w={:.2}  {}{}",
            test.order,
            style(&test.id).dim(),
            test.name,
            test.qc_weight,
            document,
            ncr
        );
    }
}

fn run_add_test(args: AddTestArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.project);

    if session.editors.qualification.select_part(&args.part).is_none() {
        return Err(part_not_found(&args.part, &session));
    }

    let draft = TestDraft {
        name: args.name.unwrap_or_default(),
        order: args.order,
        qc_weight: args.weight,
        document: args.document,
        ncr: args.ncr,
        remarks: args.remarks,
    };
    let default_weight = session.config.default_qc_weight();
    let test_id = session
        .editors
        .qualification
        .add_test(draft, default_weight)
        .map(|test| test.id.clone())
        .map_err(report_validation)?;
    save_session(&session)?;

    if global.quiet {
        println!("{}", test_id);
    } else {
        println!(
            "{} Added QC test {} to part {}",
            style("✓").green(),
            style(&test_id).cyan(),
            style(&args.part).yellow()
        );
    }
    Ok(())
}

fn run_attach(args: AttachArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.project);

    let document = session
        .editors
        .qualification
        .attach(&args.part, &args.test, args.name.as_deref())
        .and_then(|test| test.document.clone())
        .ok_or_else(|| miette::miette!("Test {} not found on part {}", args.test, args.part))?;
    save_session(&session)?;

    if !global.quiet {
        println!(
            "{} Attached {} to {}",
            style("✓").green(),
            style(&document).cyan(),
            style(&args.test).yellow()
        );
    }
    Ok(())
}

fn run_score(args: PartArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.project);
    save_session(&session)?;

    let editor = &session.editors.qualification;
    let (Some(score), Some(part)) = (editor.score(&args.part), editor.part(&args.part)) else {
        return Err(part_not_found(&args.part, &session));
    };
    let supported = QualificationWorkflow::new().derive_status(part);

    if global.quiet {
        println!("{:.2}", score);
    } else {
        println!(
            "{}: {:.2}  [{}, tests support {}]",
            style(&args.part).cyan(),
            score,
            part.status,
            supported
        );
    }
    Ok(())
}

fn run_transition(args: TransitionArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.project);

    let from = session
        .editors
        .qualification
        .transition(&args.part, args.status)
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| part_not_found(&args.part, &session))?;
    save_session(&session)?;

    if !global.quiet {
        println!(
            "{} {}: {} → {}",
            style("✓").green(),
            style(&args.part).cyan(),
            from,
            style(args.status).yellow()
        );
    }
    Ok(())
}

fn run_toggle(args: ToggleArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    mount(&mut session, &args.project);

    let editor = &mut session.editors.qualification;
    let is_set = editor.available_sets().iter().any(|s| s.id == args.id);
    let expanded = if is_set {
        editor.toggle_set(&args.id)
    } else {
        editor
            .toggle_part(&args.id)
            .ok_or_else(|| part_not_found(&args.id, &session))?
    };
    save_session(&session)?;

    if !global.quiet {
        let state = if expanded { "expanded" } else { "collapsed" };
        println!("{} {} {}", style("✓").green(), style(&args.id).cyan(), state);
    }
    Ok(())
}
