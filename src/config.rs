use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{ArgGroup, Parser, Subcommand};

use crate::error::AnalyzerError;

/// Report serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    #[value(name = "csv")]
    Csv,
    #[value(name = "json")]
    Json,
    #[value(name = "markdown", alias = "md")]
    Markdown,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }

    /// Format implied by a path's extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            "md" | "markdown" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Where a report goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Timestamped file in the default results directory.
    Default,
    Path(PathBuf),
    /// No file; the report is printed to stdout.
    #[default]
    Suppressed,
}

/// What to collect per URDF file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub joints: bool,
    pub links: bool,
    /// Directory the URDF file name is looked up in.
    pub urdf_root_dir: Option<PathBuf>,
    /// Full report columns (per-type joint counts, geometries, meshes).
    pub full: bool,
}

/// A parsing tool given on the command line.
///
/// `xml` and `urdf-rs` are built in; anything else has the form
/// `NAME=PROGRAM ARGS...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolSpec {
    Xml,
    UrdfRs,
    Command {
        name: String,
        program: String,
        args: Vec<String>,
    },
}

impl FromStr for ToolSpec {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "xml" => return Ok(ToolSpec::Xml),
            "urdf-rs" | "urdf_rs" => return Ok(ToolSpec::UrdfRs),
            _ => {}
        }

        let (name, command) = s
            .split_once('=')
            .ok_or_else(|| AnalyzerError::Tool(format!("unknown tool '{s}', expected xml, urdf-rs or NAME=COMMAND")))?;
        let name = name.trim();
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AnalyzerError::Tool(format!("tool '{name}' has an empty command")))?;
        if name.is_empty() {
            return Err(AnalyzerError::Tool(format!("tool command '{command}' has no name")));
        }

        Ok(ToolSpec::Command {
            name: name.to_string(),
            program,
            args: parts.collect(),
        })
    }
}

/// Subcommand-specific configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandConfig {
    ModelInformation {
        filename: Option<PathBuf>,
        search_dir: Option<PathBuf>,
        options: AnalysisOptions,
    },
    CompareTools {
        search_dir: Option<PathBuf>,
        files: Vec<PathBuf>,
        tools: Vec<ToolSpec>,
    },
    CompareDuplicates {
        root: PathBuf,
        fk_command: Option<String>,
        artifact_dir: PathBuf,
    },
}

/// Fully resolved analyzer configuration (constructed from CLI args).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub command: CommandConfig,
    pub output: OutputTarget,
    /// Explicit format; otherwise inferred from the output target.
    pub format: Option<OutputFormat>,
    pub verbose: bool,
    pub log_json: bool,
    pub threads: Option<usize>,
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "urdf-analyzer",
    about = "Structural analysis and comparison of URDF robot descriptions",
    version
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Write the report to a file; without a path a timestamped file in
    /// `results/` is used. Absent: print to stdout
    #[arg(short = 'o', long = "out", global = true)]
    pub out: Option<Option<PathBuf>>,

    /// Report format (default: from the file extension, else csv)
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Worker thread count (default: all cores)
    #[arg(short = 'j', long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Joint and link statistics of one file or a directory tree
    #[command(group(
        ArgGroup::new("input")
            .required(true)
            .multiple(true)
            .args(["filename", "search_dir"])
    ))]
    ModelInformation {
        /// URDF file to analyze
        #[arg(short = 'f', long)]
        filename: Option<PathBuf>,

        /// Directory searched recursively for *.urdf files
        #[arg(short = 's', long)]
        search_dir: Option<PathBuf>,

        /// Directory the URDF file name is looked up in
        #[arg(long)]
        urdf_root_dir: Option<PathBuf>,

        /// Collect joint information
        #[arg(long)]
        joints: bool,

        /// Collect link information
        #[arg(long)]
        links: bool,

        /// Full report columns
        #[arg(long)]
        full: bool,
    },

    /// Which parsing tools load which files
    CompareTools {
        /// Directory searched recursively for *.urdf files
        #[arg(short = 's', long, conflicts_with = "files", required_unless_present = "files")]
        search_dir: Option<PathBuf>,

        /// URDF files to check
        files: Vec<PathBuf>,

        /// Tool: xml, urdf-rs, or NAME=COMMAND ARGS ({file} is the URDF path)
        #[arg(short = 't', long = "tool", required = true)]
        tools: Vec<ToolSpec>,
    },

    /// Structural diff of duplicate robots from different sources
    CompareDuplicates {
        /// Root directory with one subdirectory per robot
        root: PathBuf,

        /// Forward-kinematics command printing a JSON pose ({file} is the URDF path)
        #[arg(long)]
        fk_command: Option<String>,

        /// Directory for pose delta files
        #[arg(long, default_value = "results/fk_deltas")]
        artifact_dir: PathBuf,
    },
}

impl From<Command> for CommandConfig {
    fn from(command: Command) -> Self {
        match command {
            Command::ModelInformation {
                filename,
                search_dir,
                urdf_root_dir,
                joints,
                links,
                full,
            } => CommandConfig::ModelInformation {
                filename,
                search_dir,
                options: AnalysisOptions {
                    joints,
                    links,
                    urdf_root_dir,
                    full,
                },
            },
            Command::CompareTools {
                search_dir,
                files,
                tools,
            } => CommandConfig::CompareTools {
                search_dir,
                files,
                tools,
            },
            Command::CompareDuplicates {
                root,
                fk_command,
                artifact_dir,
            } => CommandConfig::CompareDuplicates {
                root,
                fk_command,
                artifact_dir,
            },
        }
    }
}

impl From<CliArgs> for AnalyzerConfig {
    fn from(args: CliArgs) -> Self {
        let output = match args.out {
            None => OutputTarget::Suppressed,
            Some(None) => OutputTarget::Default,
            Some(Some(path)) => OutputTarget::Path(path),
        };

        AnalyzerConfig {
            command: args.command.into(),
            output,
            format: args.format,
            verbose: args.verbose,
            log_json: args.log_json,
            threads: args.threads,
        }
    }
}
