#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host that overlays building hints on overview snapshots.

mod config;
mod snapshot;
mod transfer;

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant, SystemTime},
};

use anyhow::{bail, Context, Result};
use building_hints_core::{DesiredTemplate, GroupId, Level, RuleTable};
use building_hints_rendering::{CellStyle, OverviewTable, Palette};
use building_hints_store::{JsonFileStorage, TemplateStore};
use building_hints_system_authoring::{selectable_groups, Preset, TemplateDraft};
use building_hints_system_overlay::{Overlay, PassOutcome, PassReport, Trigger};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use self::{
    config::Config,
    snapshot::{Snapshot, SnapshotHost},
};

/// Building templates and upgrade hints for the town overview.
#[derive(Debug, Parser)]
#[command(name = "building-hints", version)]
struct Cli {
    /// Optional TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Template storage file, overriding the config.
    #[arg(long, global = true)]
    storage: Option<PathBuf>,
    /// Enables debug logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists the building rules.
    Rules,
    /// Lists the town groups a template can be authored for.
    Groups {
        /// Snapshot of the game state.
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Runs a single overlay pass and prints the overview.
    Evaluate(ViewArgs),
    /// Re-runs the overlay whenever the snapshot changes.
    Watch {
        #[command(flatten)]
        view: ViewArgs,
        /// Interval between snapshot checks in milliseconds.
        #[arg(long, default_value_t = 50)]
        poll_ms: u64,
        /// Stops after this many passes.
        #[arg(long)]
        passes: Option<usize>,
    },
    /// Manages stored templates.
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(Debug, Args)]
struct ViewArgs {
    /// Snapshot of the game state.
    #[arg(long)]
    snapshot: PathBuf,
    /// Colours highlighted cells instead of marking them.
    #[arg(long)]
    color: bool,
}

#[derive(Debug, Subcommand)]
enum TemplateCommand {
    /// Prints the template of a group.
    Show {
        /// Town group identifier.
        #[arg(long, allow_negative_numbers = true)]
        group: i64,
    },
    /// Edits and saves the template of a group.
    Set {
        /// Town group identifier.
        #[arg(long, allow_negative_numbers = true)]
        group: i64,
        /// Starts from a built-in preset instead of the saved template.
        #[arg(long)]
        preset: Option<Preset>,
        /// Desired level written as building=level.
        #[arg(long = "level", value_parser = parse_level)]
        levels: Vec<(String, Level)>,
        /// Buildings to remove from the template.
        #[arg(long)]
        clear: Vec<String>,
    },
    /// Prints the template of a group as a single-line string.
    Export {
        /// Town group identifier.
        #[arg(long, allow_negative_numbers = true)]
        group: i64,
    },
    /// Saves a template received as a single-line string.
    Import {
        /// Town group identifier.
        #[arg(long, allow_negative_numbers = true)]
        group: i64,
        /// String produced by `template export`.
        value: String,
    },
}

fn parse_level(value: &str) -> Result<(String, Level), String> {
    let (building, level) = value
        .split_once('=')
        .ok_or_else(|| format!("expected building=level, got `{value}`"))?;
    let level = level
        .trim()
        .parse::<Level>()
        .map_err(|error| format!("invalid level in `{value}`: {error}"))?;
    Ok((building.trim().to_owned(), level))
}

/// Entry point for the building hints command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(storage) = cli.storage {
        config.storage = storage;
    }

    match cli.command {
        Command::Rules => {
            print_rules();
            Ok(())
        }
        Command::Groups { snapshot } => print_groups(&snapshot),
        Command::Evaluate(view) => evaluate_once(&config, &view),
        Command::Watch {
            view,
            poll_ms,
            passes,
        } => watch(&config, &view, Duration::from_millis(poll_ms), passes),
        Command::Template(command) => run_template_command(&config, command),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(config: &Config) -> Result<TemplateStore<JsonFileStorage>> {
    let storage = JsonFileStorage::open(&config.storage)
        .with_context(|| format!("failed to open template storage {}", config.storage.display()))?;
    Ok(TemplateStore::new(storage))
}

fn cell_style(view: &ViewArgs, palette: Palette) -> CellStyle {
    if view.color {
        CellStyle::Ansi(palette)
    } else {
        CellStyle::Markers
    }
}

fn print_rules() {
    for rule in RuleTable::reference().iter() {
        let slot = rule.slot().map_or("", |slot| slot.name());
        let requirements = rule
            .requirements()
            .iter()
            .map(|(building, level)| format!("{building} {level}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:<13} max {:>2} {:<5} {}",
            rule.id(),
            rule.max_level(),
            slot,
            requirements
        );
    }
}

fn print_groups(path: &Path) -> Result<()> {
    let snapshot = Snapshot::read(path)?;
    for (group, name) in selectable_groups(&snapshot.groups) {
        println!("{:>6}  {name}", group.get());
    }
    Ok(())
}

fn evaluate_once(config: &Config, view: &ViewArgs) -> Result<()> {
    let store = open_store(config)?;
    let host = SnapshotHost::from(Snapshot::read(&view.snapshot)?);
    let overlay = Overlay::new(RuleTable::reference(), config.debounce);
    let mut table = OverviewTable::new();

    let report = overlay.run_pass(&host, &store, &mut table);
    present(&host, &table, &report, cell_style(view, config.palette));
    Ok(())
}

fn watch(config: &Config, view: &ViewArgs, poll: Duration, passes: Option<usize>) -> Result<()> {
    let store = open_store(config)?;
    let mut host = SnapshotHost::default();
    let mut overlay = Overlay::new(RuleTable::reference(), config.debounce);
    let mut table = OverviewTable::new();
    let style = cell_style(view, config.palette);

    if overlay.initialize() {
        info!(snapshot = %view.snapshot.display(), "watching snapshot");
    }

    let started = Instant::now();
    let mut last_modified: Option<SystemTime> = None;
    let mut completed = 0;
    loop {
        let modified = fs::metadata(&view.snapshot)
            .and_then(|metadata| metadata.modified())
            .ok();
        if modified.is_some() && modified != last_modified {
            debug!("snapshot changed");
            last_modified = modified;
            host.reload(&view.snapshot);
            let _ = overlay.notify(&Trigger::DomMutation, started.elapsed());
        }

        if let Some(report) = overlay.poll(started.elapsed(), &host, &store, &mut table) {
            present(&host, &table, &report, style);
            completed += 1;
            if passes.is_some_and(|limit| completed >= limit) {
                return Ok(());
            }
        }
        thread::sleep(poll);
    }
}

fn present(host: &SnapshotHost, table: &OverviewTable, report: &PassReport, style: CellStyle) {
    match &report.outcome {
        PassOutcome::Completed => {}
        PassOutcome::ProviderUnavailable(error) => warn!(%error, "pass abandoned"),
        PassOutcome::StorageUnavailable(error) => warn!(%error, "pass abandoned"),
    }
    for group in &report.malformed_groups {
        warn!(group = group.get(), "template could not be read; group skipped");
    }

    if let Some(snapshot) = host.snapshot() {
        print!(
            "{}",
            table.render(&snapshot.towns, RuleTable::reference(), style)
        );
    }
    println!(
        "{} group(s) evaluated, {} town(s) painted, {} without template",
        report.groups_evaluated, report.towns_painted, report.groups_without_template
    );
}

fn run_template_command(config: &Config, command: TemplateCommand) -> Result<()> {
    let mut store = open_store(config)?;
    match command {
        TemplateCommand::Show { group } => {
            let template = load_existing(&store, GroupId::new(group))?;
            for (building, level) in template.iter() {
                println!("{building:<13} {level}");
            }
        }
        TemplateCommand::Set {
            group,
            preset,
            levels,
            clear,
        } => {
            let group = authorable_group(group)?;
            let saved = store.load(group)?.unwrap_or_default();
            let mut draft = TemplateDraft::from_template(RuleTable::reference(), &saved);
            if let Some(preset) = preset {
                draft.apply_preset(preset);
            }
            for (building, level) in &levels {
                if let Some(conflict) = draft.set_level(building, Some(*level))? {
                    warn!(reset = ?conflict.reset, "{conflict}");
                }
            }
            for building in &clear {
                let _ = draft.set_level(building, None)?;
            }

            let template = draft.finalize()?;
            store.save(group, &template)?;
            info!(group = group.get(), buildings = template.len(), "template saved");
        }
        TemplateCommand::Export { group } => {
            let template = load_existing(&store, GroupId::new(group))?;
            println!("{}", transfer::encode(&template));
        }
        TemplateCommand::Import { group, value } => {
            let group = authorable_group(group)?;
            let template = transfer::decode(&value)?;
            let template =
                TemplateDraft::try_from_template(RuleTable::reference(), &template)?.finalize()?;
            store.save(group, &template)?;
            info!(group = group.get(), buildings = template.len(), "template imported");
        }
    }
    Ok(())
}

fn authorable_group(group: i64) -> Result<GroupId> {
    let group = GroupId::new(group);
    if group.is_virtual() {
        bail!("templates cannot be authored for virtual group {}", group.get());
    }
    Ok(group)
}

fn load_existing(
    store: &TemplateStore<JsonFileStorage>,
    group: GroupId,
) -> Result<DesiredTemplate> {
    match store.load(group)? {
        Some(template) => Ok(template),
        None => bail!("no template stored for group {}", group.get()),
    }
}
