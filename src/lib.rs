pub mod cli;
pub mod config;
pub mod date;
pub mod diff;
pub mod error;
pub mod extract;
pub mod fields;
pub mod group;
pub mod io_utils;
pub mod mapping;
pub mod order;
pub mod output;
pub mod state;
pub mod table;
pub mod writeback;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{
        Cli, Commands, DateCommands, DiffArgs, ExtractArgs, GroupArgs, MappingCommands, SourceArgs,
    },
    config::Settings,
    extract::Extraction,
    group::{CompletionFilter, GroupFilter, ProblemFilter},
    mapping::FieldKey,
    state::PickingState,
    table::{Align, render_table},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("order_intake", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => handle_extract(&args),
        Commands::Diff(args) => handle_diff(&args),
        Commands::Group(args) => handle_group(&args),
        Commands::Date(DateCommands::Normalize(args)) => {
            let rows = args
                .values
                .iter()
                .map(|value| match date::to_canonical(value) {
                    Some(canonical) => vec![
                        value.clone(),
                        canonical.clone(),
                        date::to_display(&canonical, args.display),
                    ],
                    None => vec![value.clone(), "invalid".to_string(), String::new()],
                })
                .collect::<Vec<_>>();
            let headers = ["input", "canonical", "display"].map(String::from);
            print!("{}", render_table(&headers, &rows, &[]));
            Ok(())
        }
        Commands::Date(DateCommands::Sort(args)) => {
            for value in date::sort(&args.values, args.descending) {
                println!("{value}");
            }
            Ok(())
        }
        Commands::Mapping(MappingCommands::Init(args)) => {
            Settings::default()
                .save(&args.output)
                .with_context(|| format!("Writing settings to {:?}", args.output))?;
            info!("Default settings written to {:?}", args.output);
            Ok(())
        }
        Commands::Mapping(MappingCommands::Check(args)) => handle_mapping_check(&args),
    }
}

/// Settings, delimiter and a loaded sheet for one input.
struct LoadedSource {
    settings: Settings,
    delimiter: u8,
    table: io_utils::SourceTable,
}

fn load_source(input: &Path, source: &SourceArgs) -> Result<LoadedSource> {
    let settings = Settings::load_or_default(source.settings.as_deref())?;
    let delimiter =
        io_utils::resolve_input_delimiter(input, source.delimiter.or(settings.delimiter_byte()));
    let encoding = io_utils::resolve_encoding(source.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}'",
        input.display(),
        printable_delimiter(delimiter)
    );
    let table = io_utils::read_table(input, delimiter, encoding)?;
    Ok(LoadedSource {
        settings,
        delimiter,
        table,
    })
}

fn extract_source(loaded: &LoadedSource, source: &SourceArgs) -> Extraction {
    let target = loaded
        .settings
        .effective_target_date(source.target_date.as_deref());
    if let Some(target) = target {
        debug!("Filtering rows to target date '{target}'");
    }
    let extraction = extract::extract(
        &loaded.table.header,
        &loaded.table.rows,
        &loaded.settings.mapping,
        target,
    );
    for message in extraction.summary() {
        warn!("{message}");
    }
    extraction
}

fn handle_extract(args: &ExtractArgs) -> Result<()> {
    let loaded = load_source(&args.input, &args.source)?;
    let extraction = extract_source(&loaded, &args.source);
    output::write_lines(
        &extraction.lines,
        args.format,
        args.output.as_deref(),
        loaded.delimiter,
        loaded.settings.display_format,
    )
    .context("Writing extracted lines")?;
    info!("Wrote {} order line(s)", extraction.lines.len());
    Ok(())
}

fn handle_diff(args: &DiffArgs) -> Result<()> {
    let existing = load_source(&args.existing, &args.source)
        .with_context(|| format!("Loading existing export {:?}", args.existing))?;
    let incoming = load_source(&args.incoming, &args.source)
        .with_context(|| format!("Loading incoming export {:?}", args.incoming))?;
    let known = extract_source(&existing, &args.source).lines;
    let fresh = extract_source(&incoming, &args.source).lines;
    let outcome = diff::merge_new(&known, &fresh);
    let display = incoming.settings.display_format;
    output::write_lines(
        &outcome.added,
        args.format,
        args.output.as_deref(),
        incoming.delimiter,
        display,
    )
    .context("Writing new lines")?;
    if let Some(merged) = &args.merged {
        output::write_lines(
            &outcome.lines,
            args.format,
            Some(merged.as_path()),
            incoming.delimiter,
            display,
        )
        .with_context(|| format!("Writing merged lines to {merged:?}"))?;
    }
    info!("{} new order line(s)", outcome.added.len());
    Ok(())
}

fn group_filter(args: &GroupArgs) -> GroupFilter {
    let completion = if args.completed {
        CompletionFilter::Completed
    } else if args.incomplete {
        CompletionFilter::Incomplete
    } else {
        CompletionFilter::Any
    };
    let problems = if args.with_problems {
        ProblemFilter::WithProblems
    } else if args.without_problems {
        ProblemFilter::WithoutProblems
    } else if !args.statuses.is_empty() {
        ProblemFilter::AnyOf(args.statuses.clone())
    } else {
        ProblemFilter::Any
    };
    GroupFilter {
        completion,
        kinds: args.kinds.clone(),
        problems,
    }
}

fn handle_group(args: &GroupArgs) -> Result<()> {
    let loaded = load_source(&args.input, &args.source)?;
    let mut lines = extract_source(&loaded, &args.source).lines;
    if let Some(path) = &args.state {
        let state = PickingState::load(path)?;
        let touched = state.apply(&mut lines);
        debug!("Picking state updated {touched} line(s)");
    }

    let groups = group::group(&lines).context("Grouping order lines")?;
    let counts = group::counts(&groups);
    let selected = group::filter(&groups, &group_filter(args));
    info!(
        "{} of {} group(s) match the filter",
        selected.len(),
        groups.len()
    );
    output::write_groups(&selected, &counts, args.format, args.output.as_deref())?;

    if let (Some(path), Some(packer)) = (&args.updates, &args.packer) {
        let updates = writeback::packed_updates(
            selected.iter().copied().flat_map(|g| g.items.iter()),
            packer,
            Local::now().naive_local(),
        );
        let mapping = &loaded.settings.mapping;
        output::write_updates(
            &updates,
            path,
            mapping
                .header(FieldKey::PackerName)
                .unwrap_or(FieldKey::PackerName.as_str()),
            mapping
                .header(FieldKey::PackedTime)
                .unwrap_or(FieldKey::PackedTime.as_str()),
        )?;
        info!("Wrote {} row update(s) to {:?}", updates.len(), path);
    }
    Ok(())
}

fn handle_mapping_check(args: &cli::MappingCheckArgs) -> Result<()> {
    let loaded = load_source(&args.input, &args.source)?;
    let resolved = mapping::resolve(&loaded.table.header, &loaded.settings.mapping);
    let rows = FieldKey::ALL
        .iter()
        .map(|key| {
            let expected = loaded.settings.mapping.header(*key).unwrap_or("");
            let column = match resolved.index(*key) {
                Some(idx) => (idx + 1).to_string(),
                None if expected.is_empty() => "unmapped".to_string(),
                None => "missing".to_string(),
            };
            vec![key.to_string(), expected.to_string(), column]
        })
        .collect::<Vec<_>>();
    let headers = ["field", "header", "column"].map(String::from);
    print!(
        "{}",
        render_table(&headers, &rows, &[Align::Left, Align::Left, Align::Right])
    );
    if !resolved.gaps().is_empty() {
        warn!(
            "{} mapped header(s) not found in {:?}",
            resolved.gaps().len(),
            args.input
        );
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
