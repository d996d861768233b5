//! Application entry point shared by the binary and integration tests.
//!
//! [`run_app`] wires configuration, logging, the detection engine and the
//! presentation layer together. The review loops are generic over their
//! input and output streams so they can be driven from tests.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::delete::{
    delete_all_except, delete_batch, validate_preserves_copy, BatchDeleteResult, DeleteConfig,
};
use crate::cli::{Cli, Commands, CompareArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{
    build_catalog, compare_catalogs, files_on_side, side_of, DuplicateFinder, DuplicateGroup,
    wasted_space, FinderConfig, HashPhaseConfig, Side,
};
use crate::error::ExitCode;
use crate::interactive::{KeepChoice, Prompter, SideChoice};
use crate::logging::init_logging;
use crate::output::table::{indexed_rows, keep_first_rows, write_group, write_summary, RowLabel};
use crate::output::{CsvOutput, JsonOutput, OutputFormat};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{FileRecord, Hasher, ScanError};

/// How `scan` treats the groups it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Print groups, never delete.
    DryRun,
    /// Keep the first file of every group without asking.
    AutoDelete,
    /// Print every group with KEEP/DEL marks, then confirm once.
    ShowAll,
    /// Ask per group which file to keep.
    Interactive,
}

impl ScanMode {
    /// Pick the mode from the scan flags. `--dry-run` wins over `--show-all`.
    #[must_use]
    pub fn from_args(args: &ScanArgs) -> Self {
        if args.common.dry_run {
            Self::DryRun
        } else if args.auto_delete {
            Self::AutoDelete
        } else if args.show_all {
            Self::ShowAll
        } else {
            Self::Interactive
        }
    }
}

/// How `compare` treats cross-directory groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Print groups, never delete.
    DryRun,
    /// Delete this side's copies without asking.
    DeleteFrom(Side),
    /// Ask per group which side to delete from.
    Interactive,
}

impl CompareMode {
    /// Pick the mode from the compare flags.
    #[must_use]
    pub fn from_args(args: &CompareArgs) -> Self {
        if args.common.dry_run {
            Self::DryRun
        } else if args.delete_from_1 {
            Self::DeleteFrom(Side::First)
        } else if args.delete_from_2 {
            Self::DeleteFrom(Side::Second)
        } else {
            Self::Interactive
        }
    }
}

/// Run doppel for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for invalid configuration, a missing or non-directory
/// root, or a failure writing output or reading answers.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = match &cli.config {
        Some(path) => Config::try_load_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };

    match &cli.command {
        Commands::Scan(args) => {
            config.merge_scan_args(args);
            config.validate()?;
            run_scan(args, &config, cli.quiet)
        }
        Commands::Compare(args) => {
            config.merge_compare_args(args);
            config.validate()?;
            run_compare(args, &config, cli.quiet)
        }
    }
}

fn progress_for(config: &Config, quiet: bool) -> Option<Arc<dyn ProgressCallback>> {
    if quiet || config.output.is_machine_readable() {
        None
    } else {
        Some(Arc::new(Progress::new(false)))
    }
}

fn delete_config(config: &Config) -> DeleteConfig {
    if config.permanent {
        DeleteConfig::permanent()
    } else {
        DeleteConfig::trash()
    }
}

fn warn_skipped(errors: &[ScanError]) {
    for error in errors {
        log::warn!("Skipped: {error}");
    }
}

/// Write JSON or CSV. Returns `false` for table output.
fn write_machine_output(format: OutputFormat, groups: &[DuplicateGroup]) -> Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => JsonOutput::new(groups).write_to(&mut out, true)?,
        OutputFormat::Csv => CsvOutput::new(groups).write_to(&mut out)?,
        OutputFormat::Table => return Ok(false),
    }
    Ok(true)
}

fn exit_code_for(groups: &[DuplicateGroup], deletions: &BatchDeleteResult) -> ExitCode {
    if groups.is_empty() {
        ExitCode::NoDuplicates
    } else if deletions.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    }
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let mut finder_config = FinderConfig::default()
        .with_exact_mode(config.exact)
        .with_image_threshold(config.threshold)
        .with_algorithm(config.algorithm)
        .with_io_threads(config.io_threads);
    if let Some(progress) = progress_for(config, quiet) {
        finder_config = finder_config.with_progress_callback(progress);
    }

    let finder = DuplicateFinder::new(finder_config);
    let (groups, summary) = finder
        .scan_directory(&args.path, &config.walker_config())
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;
    warn_skipped(&summary.scan_errors);
    if summary.failed_files > 0 {
        log::warn!("{} file(s) could not be read or decoded", summary.failed_files);
    }

    if write_machine_output(config.output, &groups)? {
        return Ok(exit_code_for(&groups, &BatchDeleteResult::default()));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());

    if groups.is_empty() {
        prompter.say("No duplicates found!")?;
        return Ok(ExitCode::NoDuplicates);
    }

    write_summary(prompter.output(), groups.len(), summary.reclaimable_space, false)?;
    let result = review_scan_groups(
        &groups,
        ScanMode::from_args(args),
        &mut prompter,
        &delete_config(config),
    )?;

    Ok(exit_code_for(&groups, &result))
}

/// Walk through scan groups in `mode`, deleting what the user chose.
///
/// # Errors
///
/// Returns an error if the prompt streams fail.
pub fn review_scan_groups<R: BufRead, W: Write>(
    groups: &[DuplicateGroup],
    mode: ScanMode,
    prompter: &mut Prompter<R, W>,
    delete_config: &DeleteConfig,
) -> Result<BatchDeleteResult> {
    let mut result = BatchDeleteResult::default();

    match mode {
        ScanMode::DryRun => {
            for (index, group) in groups.iter().enumerate() {
                write_group(prompter.output(), index, group, &indexed_rows(group))?;
            }
        }
        ScanMode::AutoDelete => {
            for (index, group) in groups.iter().enumerate() {
                write_group(prompter.output(), index, group, &keep_first_rows(group))?;
                let deleted = delete_all_except(&group.files, 0, delete_config)?;
                prompter.say(&format!("  {}", deleted.summary()))?;
                result.merge(deleted);
            }
        }
        ScanMode::ShowAll => {
            for (index, group) in groups.iter().enumerate() {
                write_group(prompter.output(), index, group, &keep_first_rows(group))?;
            }
            prompter.say("")?;
            if prompter.confirm("Delete all duplicates (keep first file in each group)?")? {
                for group in groups {
                    result.merge(delete_all_except(&group.files, 0, delete_config)?);
                }
            } else {
                prompter.say("Cancelled")?;
            }
        }
        ScanMode::Interactive => {
            for (index, group) in groups.iter().enumerate() {
                write_group(prompter.output(), index, group, &indexed_rows(group))?;
                match prompter.ask_keep(group.len())? {
                    KeepChoice::Skip => prompter.say("Skipped")?,
                    KeepChoice::KeepAll => prompter.say("Kept all")?,
                    KeepChoice::Invalid => prompter.say("Invalid, skipped")?,
                    KeepChoice::Keep(keep) => {
                        let deleted = delete_all_except(&group.files, keep, delete_config)?;
                        prompter.say(&format!("  {}", deleted.summary()))?;
                        result.merge(deleted);
                    }
                }
            }
        }
    }

    if result.success_count() + result.failure_count() > 0 {
        prompter.say(&format!("\n{}", result.summary()))?;
    }
    Ok(result)
}

fn run_compare(args: &CompareArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let progress = progress_for(config, quiet);
    let walker_config = config.walker_config();

    let (first, first_errors) = build_catalog(&args.first, &walker_config, progress.as_ref())
        .with_context(|| format!("Failed to scan {}", args.first.display()))?;
    let (second, second_errors) = build_catalog(&args.second, &walker_config, progress.as_ref())
        .with_context(|| format!("Failed to scan {}", args.second.display()))?;
    warn_skipped(&first_errors);
    warn_skipped(&second_errors);

    let mut hash_config = HashPhaseConfig::default().with_io_threads(config.io_threads);
    if let Some(progress) = progress {
        hash_config = hash_config.with_progress_callback(progress);
    }
    let (groups, stats) = compare_catalogs(&first, &second, &Hasher::new(), &hash_config);
    if stats.failed_files > 0 {
        log::warn!("{} file(s) could not be read", stats.failed_files);
    }

    if write_machine_output(config.output, &groups)? {
        return Ok(exit_code_for(&groups, &BatchDeleteResult::default()));
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());

    if groups.is_empty() {
        prompter.say("No duplicates found between directories!")?;
        return Ok(ExitCode::NoDuplicates);
    }

    write_compare_summary(prompter.output(), &groups)?;
    let result = review_cross_groups(
        &groups,
        (&args.first, &args.second),
        CompareMode::from_args(args),
        &mut prompter,
        &delete_config(config),
    )?;

    Ok(exit_code_for(&groups, &result))
}

/// Headline of a compare run. Every copy beyond the first counts as duplicated,
/// the same total the JSON report gives.
fn write_compare_summary<W: Write>(w: &mut W, groups: &[DuplicateGroup]) -> io::Result<()> {
    write_summary(w, groups.len(), wasted_space(groups), true)
}

/// Rows labelled with the directory each file came from.
fn side_rows<'a>(
    group: &'a DuplicateGroup,
    roots: (&Path, &Path),
) -> Vec<(RowLabel, &'a FileRecord)> {
    group
        .files
        .iter()
        .filter_map(|f| side_of(&f.path, roots.0, roots.1).map(|side| (RowLabel::Side(side), f)))
        .collect()
}

/// Walk through cross-directory groups in `mode`, deleting one side's copies.
///
/// # Errors
///
/// Returns an error if the prompt streams fail.
pub fn review_cross_groups<R: BufRead, W: Write>(
    groups: &[DuplicateGroup],
    roots: (&Path, &Path),
    mode: CompareMode,
    prompter: &mut Prompter<R, W>,
    delete_config: &DeleteConfig,
) -> Result<BatchDeleteResult> {
    let mut result = BatchDeleteResult::default();

    for (index, group) in groups.iter().enumerate() {
        write_group(prompter.output(), index, group, &side_rows(group, roots))?;

        let side = match mode {
            CompareMode::DryRun => continue,
            CompareMode::DeleteFrom(side) => side,
            CompareMode::Interactive => match prompter.ask_side()? {
                SideChoice::Delete(side) => side,
                SideChoice::Skip => {
                    prompter.say("Skipped")?;
                    continue;
                }
                SideChoice::Invalid => {
                    prompter.say("Invalid choice, skipped")?;
                    continue;
                }
            },
        };

        let targets: Vec<_> = files_on_side(group, side, roots.0, roots.1)
            .into_iter()
            .map(|f| f.path.clone())
            .collect();
        if let Err(e) = validate_preserves_copy(&targets, &group.paths()) {
            log::warn!("Group {} not touched: {}", index + 1, e);
            continue;
        }

        let deleted = delete_batch(&targets, delete_config);
        prompter.say(&format!("  {}", deleted.summary()))?;
        result.merge(deleted);
    }

    if result.success_count() + result.failure_count() > 0 {
        prompter.say(&format!("\n{}", result.summary()))?;
    }
    Ok(result)
}
