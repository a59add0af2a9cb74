//! Command-line interface for the plantuml-manipulator utility
//!
//! Batch edits, validation and reports over PlantUML sequence diagrams.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::colorizer::colorize_output;
use plantuml_manipulator::batch::{validate_files, BatchOutcome, FileProcessor, Filters};
use plantuml_manipulator::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use plantuml_manipulator::core::{read_lines, DiagramStructure, LineSequence};
use plantuml_manipulator::manipulator::{preserve_indentation, Mutation};
use plantuml_manipulator::report::{ReportFormat, ReportGenerator};
use plantuml_manipulator::validator::{Requirements, ValidationReport, ValidationStatus};
use plantuml_manipulator::ManipulatorError;

const RULE_WIDTH: usize = 80;

/// PlantUML Manipulator - Structured editing of PlantUML sequence diagrams
#[derive(Parser)]
#[command(name = "plantuml-manipulator")]
#[command(about = "Batch insert, remove, replace and validate structures in PlantUML sequence diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// When to use colors in output
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if stdout is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Options shared by every file-rewriting command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Glob pattern for files to process (`**` recurses)
    #[arg(short, long)]
    pub pattern: String,

    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Create <file>.bak before modifying a file
    #[arg(long)]
    pub backup: bool,
}

/// Per-file pre-conditions
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Skip files that already contain this text
    #[arg(long)]
    pub skip_if_exists: Option<String>,

    /// Only process files declaring this participant (alias or name)
    #[arg(long)]
    pub only_if_has_participant: Option<String>,

    /// Only process files containing this group
    #[arg(long)]
    pub only_if_has_group: Option<String>,
}

impl From<FilterOptions> for Filters {
    fn from(options: FilterOptions) -> Self {
        Filters {
            skip_if_contains: options.skip_if_exists,
            only_if_has_participant: options.only_if_has_participant,
            only_if_has_group: options.only_if_has_group,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert a block of lines after a named group
    InsertAfter {
        #[command(flatten)]
        write: WriteOptions,

        /// Name of the group to insert after
        #[arg(long)]
        after_group: String,

        /// File containing the block to insert
        #[arg(long)]
        block_file: PathBuf,

        /// Prefix the block with the target group's indentation
        #[arg(long)]
        indent: bool,

        #[command(flatten)]
        filters: FilterOptions,
    },

    /// Add a participant declaration
    AddParticipant {
        #[command(flatten)]
        write: WriteOptions,

        /// Full declaration line, e.g. 'participant "API" as API #orange'
        #[arg(long)]
        participant: String,

        /// Insert after this participant (alias or name) instead of after the last one
        #[arg(long)]
        after_participant: Option<String>,

        #[command(flatten)]
        filters: FilterOptions,
    },

    /// Remove a named group, marker lines included
    RemoveGroup {
        #[command(flatten)]
        write: WriteOptions,

        /// Name of the group to remove
        #[arg(long)]
        group: String,

        #[command(flatten)]
        filters: FilterOptions,
    },

    /// Replace the body of a named group
    ReplaceGroup {
        #[command(flatten)]
        write: WriteOptions,

        /// Name of the group whose body is replaced
        #[arg(long)]
        group: String,

        /// File containing the new body
        #[arg(long)]
        content_file: PathBuf,

        /// Prefix the new body with the target group's indentation
        #[arg(long)]
        indent: bool,

        #[command(flatten)]
        filters: FilterOptions,
    },

    /// Check that diagrams contain (or lack) named structures
    Validate {
        /// Glob pattern for files to validate
        #[arg(short, long)]
        pattern: String,

        /// Group that must be present (repeatable)
        #[arg(long)]
        require_group: Vec<String>,

        /// Participant that must be declared (repeatable)
        #[arg(long)]
        require_participant: Vec<String>,

        /// Group that must not be present (repeatable)
        #[arg(long)]
        forbid_group: Vec<String>,

        /// Only validate files declaring this participant
        #[arg(long)]
        only_if_has_participant: Option<String>,

        /// Only validate files containing this group
        #[arg(long)]
        only_if_has_group: Option<String>,

        /// Report unbalanced group markers as warnings
        #[arg(long)]
        warn_unbalanced: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = ValidateFormat::Table)]
        report_format: ValidateFormat,
    },

    /// Generate reports about diagram structures
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// List every group in matching files
    Groups {
        #[arg(short, long)]
        pattern: String,

        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// List every participant in matching files
    Participants {
        #[arg(short, long)]
        pattern: String,

        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },

    /// Show the structure of one file
    Structure {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = StructureFormat::Tree)]
        format: StructureFormat,
    },

    /// Show which files contain which groups
    Matrix {
        #[arg(short, long)]
        pattern: String,
    },
}

/// Output formats for `validate`
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum ValidateFormat {
    Table,
    Json,
    Simple,
}

/// Output formats for listings
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
    Csv,
}

impl From<ListFormat> for ReportFormat {
    fn from(value: ListFormat) -> Self {
        match value {
            ListFormat::Table => ReportFormat::Table,
            ListFormat::Json => ReportFormat::Json,
            ListFormat::Csv => ReportFormat::Csv,
        }
    }
}

/// Output formats for the structure view
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum StructureFormat {
    Tree,
    Json,
}

impl From<StructureFormat> for ReportFormat {
    fn from(value: StructureFormat) -> Self {
        match value {
            StructureFormat::Tree => ReportFormat::Tree,
            StructureFormat::Json => ReportFormat::Json,
        }
    }
}

/// Build the per-file operation for a mutation, optionally re-indenting its
/// lines to match the target group
fn indented(mutation: Mutation, indent: bool) -> impl Fn(&DiagramStructure) -> Result<LineSequence, ManipulatorError> {
    move |structure| {
        if !indent {
            return mutation.apply(structure);
        }
        match &mutation {
            Mutation::InsertAfterGroup { group, block } => {
                let target = structure
                    .find_group(group)
                    .ok_or_else(|| ManipulatorError::group_not_found(group))?;
                Mutation::InsertAfterGroup {
                    group: group.clone(),
                    block: preserve_indentation(&structure.raw_lines[target.start_line], block),
                }
                .apply(structure)
            }
            Mutation::ReplaceGroup { group, content } => {
                let target = structure
                    .find_group(group)
                    .ok_or_else(|| ManipulatorError::group_not_found(group))?;
                Mutation::ReplaceGroup {
                    group: group.clone(),
                    content: preserve_indentation(&structure.raw_lines[target.start_line], content),
                }
                .apply(structure)
            }
            other => other.apply(structure),
        }
    }
}

fn read_block(path: &Path) -> Result<Vec<String>> {
    read_lines(path).with_context(|| format!("Failed to read block file '{}'", path.display()))
}

#[derive(Serialize)]
struct ValidationSummary {
    total_files: usize,
    files_passed: usize,
    files_failed: usize,
    files_warned: usize,
    files_skipped: usize,
}

#[derive(Serialize)]
struct FileVerdict<'a> {
    file: String,
    status: ValidationStatus,
    checks_passed: usize,
    checks_failed: usize,
    messages: &'a [String],
    warnings: &'a [String],
}

/// JSON shape of the `validate --report-format json` output
#[derive(Serialize)]
struct ValidationJson<'a> {
    summary: ValidationSummary,
    results: Vec<FileVerdict<'a>>,
}

/// Main CLI application
pub struct ManipulatorApp {
    colorize: bool,
    verbose: bool,
}

impl ManipulatorApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self {
            colorize: false,
            verbose: false,
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        self.verbose = cli.verbose;
        self.colorize = Self::should_colorize(cli.color);

        if self.verbose {
            eprintln!("plantuml-manipulator v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::InsertAfter {
                write,
                after_group,
                block_file,
                indent,
                filters,
            } => {
                let block = read_block(&block_file)?;
                self.announce(&write, &format!("Inserting block after group '{}'", after_group));
                let mutation = Mutation::InsertAfterGroup {
                    group: after_group,
                    block,
                };
                self.mutate_command(&write, filters.into(), indented(mutation, indent))
            }
            Commands::AddParticipant {
                write,
                participant,
                after_participant,
                filters,
            } => {
                let mutation = Mutation::AddParticipant {
                    declaration: participant,
                    after: after_participant,
                };
                self.announce(&write, &format!("Running: {}", mutation.describe()));
                self.mutate_command(&write, filters.into(), indented(mutation, false))
            }
            Commands::RemoveGroup {
                write,
                group,
                filters,
            } => {
                let mutation = Mutation::RemoveGroup { group };
                self.announce(&write, &format!("Running: {}", mutation.describe()));
                self.mutate_command(&write, filters.into(), indented(mutation, false))
            }
            Commands::ReplaceGroup {
                write,
                group,
                content_file,
                indent,
                filters,
            } => {
                let content = read_block(&content_file)?;
                let mutation = Mutation::ReplaceGroup { group, content };
                self.announce(&write, &format!("Running: {}", mutation.describe()));
                self.mutate_command(&write, filters.into(), indented(mutation, indent))
            }
            Commands::Validate {
                pattern,
                require_group,
                require_participant,
                forbid_group,
                only_if_has_participant,
                only_if_has_group,
                warn_unbalanced,
                report_format,
            } => {
                let requirements = Requirements {
                    required_groups: require_group,
                    required_participants: require_participant,
                    forbidden_groups: forbid_group,
                    report_nesting_issues: warn_unbalanced,
                };
                let filters = Filters {
                    skip_if_contains: None,
                    only_if_has_participant,
                    only_if_has_group,
                };
                self.validate_command(&pattern, &requirements, &filters, report_format)
            }
            Commands::Report { report } => self.report_command(report),
        }
    }

    /// Determine if we should colorize stdout
    fn should_colorize(color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                crossterm::tty::IsTty::is_tty(&std::io::stdout())
            }
        }
    }

    fn announce(&self, write: &WriteOptions, action: &str) {
        if self.verbose || write.dry_run {
            let mode = if write.dry_run { "[DRY RUN] " } else { "" };
            println!("{}{}", mode, action);
            println!("Pattern: {}", write.pattern);
            println!();
        }
    }

    /// Run one operation across every matching file and print the summary
    fn mutate_command<F>(&self, write: &WriteOptions, filters: Filters, operation: F) -> Result<()>
    where
        F: Fn(&DiagramStructure) -> Result<LineSequence, ManipulatorError>,
    {
        info!(pattern = %write.pattern, dry_run = write.dry_run, backup = write.backup, "Starting batch");
        let processor = FileProcessor::new()
            .dry_run(write.dry_run)
            .create_backup(write.backup);
        let outcome = processor.process_files(&write.pattern, &filters, operation)?;

        self.emit(&self.summary(&outcome, write.dry_run))?;

        if outcome.has_errors() {
            eprintln!();
            eprintln!("Errors:");
            for error in &outcome.errors {
                eprintln!("  {}: {}", error.path.display(), error.message);
            }
            return Err(anyhow!("{} file(s) could not be processed", outcome.errors.len()));
        }
        Ok(())
    }

    /// Summary text for a finished batch
    pub fn summary(&self, outcome: &BatchOutcome, dry_run: bool) -> String {
        let mut out = Vec::new();
        if self.verbose || dry_run {
            for path in &outcome.processed {
                let verb = if dry_run { "Would modify" } else { "Modified" };
                out.push(format!("✓ {}: {}", verb, path.display()));
            }
            for skipped in &outcome.skipped {
                out.push(format!("· Skipped {}: {}", skipped.path.display(), skipped.reason));
            }
            if !out.is_empty() {
                out.push(String::new());
            }
        }
        out.push("Summary:".to_string());
        out.push(format!("  Total files found: {}", outcome.total));
        out.push(format!("  Processed: {}", outcome.processed.len()));
        out.push(format!("  Skipped: {}", outcome.skipped.len()));
        out.push(format!("  Errors: {}", outcome.errors.len()));
        out.join("\n")
    }

    /// Handle the validate command
    fn validate_command(
        &self,
        pattern: &str,
        requirements: &Requirements,
        filters: &Filters,
        format: ValidateFormat,
    ) -> Result<()> {
        if self.verbose {
            eprintln!("Validating files matching pattern: {}", pattern);
        }

        let report = validate_files(pattern, requirements, filters)?;
        let output = match format {
            ValidateFormat::Json => self.validation_json(&report)?,
            ValidateFormat::Simple => self.validation_simple(&report),
            ValidateFormat::Table => self.validation_table(&report),
        };
        self.emit(&output)?;

        if report.has_failures() {
            return Err(anyhow!("{} file(s) failed validation", report.files_failed));
        }
        Ok(())
    }

    pub fn validation_json(&self, report: &ValidationReport) -> Result<String> {
        let data = ValidationJson {
            summary: ValidationSummary {
                total_files: report.total_files,
                files_passed: report.files_passed,
                files_failed: report.files_failed,
                files_warned: report.files_warned,
                files_skipped: report.files_skipped,
            },
            results: report
                .results
                .iter()
                .map(|r| FileVerdict {
                    file: r.source_name(),
                    status: r.status,
                    checks_passed: r.checks_passed,
                    checks_failed: r.checks_failed,
                    messages: &r.messages,
                    warnings: &r.warnings,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    pub fn validation_simple(&self, report: &ValidationReport) -> String {
        report
            .results
            .iter()
            .map(|r| format!("{} {}", r.status.symbol(), r.source_name()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn validation_table(&self, report: &ValidationReport) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = vec!["Validation Results".to_string(), rule.clone(), String::new()];

        for result in &report.results {
            if result.status == ValidationStatus::Skipped && !self.verbose {
                continue;
            }
            out.push(format!("{} {}", result.status.symbol(), result.source_name()));

            if self.verbose || result.status != ValidationStatus::Pass {
                out.extend(result.messages.iter().map(|m| format!("  {}", m)));
                out.extend(result.warnings.iter().map(|w| format!("  ⚠ {}", w)));
                out.push(String::new());
            }
        }

        out.push(rule);
        out.push(format!("Total files: {}", report.total_files));
        out.push(format!("Passed: {}", report.files_passed));
        out.push(format!("Failed: {}", report.files_failed));
        if report.files_warned > 0 {
            out.push(format!("Warnings: {}", report.files_warned));
        }
        out.push(format!("Skipped: {}", report.files_skipped));
        out.join("\n")
    }

    /// Handle the report subcommands
    fn report_command(&self, command: ReportCommand) -> Result<()> {
        let generator = ReportGenerator::new();
        debug!("Generating report");
        let output = match command {
            ReportCommand::Groups { pattern, format } => {
                generator.list_groups(&pattern, format.into())?
            }
            ReportCommand::Participants { pattern, format } => {
                generator.list_participants(&pattern, format.into())?
            }
            ReportCommand::Structure { file, format } => {
                generator.show_structure(&file, format.into())?
            }
            ReportCommand::Matrix { pattern } => generator.group_matrix(&pattern)?,
        };
        self.emit(&output)
    }

    /// Write to stdout, colorizing status symbols when enabled
    fn emit(&self, content: &str) -> Result<()> {
        let content = if self.colorize {
            colorize_output(content)
        } else {
            content.to_string()
        };
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", content)?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for ManipulatorApp {
    fn default() -> Self {
        Self::new()
    }
}
