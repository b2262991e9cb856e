use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::compare::duplicates::{DiffResult, DuplicateReport};
use crate::compare::kinematics::{CommandKinematics, Kinematics};
use crate::compare::tools::{ToolComparison, UrdfTool, build_tool, compare_tools};
use crate::compare::{get_model_information, get_models_information, search_for_urdfs};
use crate::config::{AnalysisOptions, AnalyzerConfig, CommandConfig, OutputTarget, ToolSpec};
use crate::error::Result;
use crate::model::ModelAnalysis;
use crate::report::{self, Table};
use crate::types::UrdfInformation;

/// Summary of a completed analyzer run.
#[derive(Debug)]
pub struct RunSummary {
    /// Rows in the primary report table.
    pub rows: usize,
    pub files_written: Vec<PathBuf>,
    pub duration: Duration,
}

/// Analyzer orchestrator -- dispatches a subcommand and writes its report.
pub struct Analyzer;

impl Analyzer {
    pub fn run(config: &AnalyzerConfig) -> Result<RunSummary> {
        let start = Instant::now();
        let summaries = config.output != OutputTarget::Suppressed;

        let (primary, secondary) = match &config.command {
            CommandConfig::ModelInformation {
                filename,
                search_dir,
                options,
            } => {
                info!("Stage 1/2: Model information");
                let records = Self::model_information(filename.as_ref(), search_dir.as_ref(), options);
                if summaries {
                    print_information_summary(&records);
                }
                (report::information_table(&records, options.full), Vec::new())
            }
            CommandConfig::CompareTools {
                search_dir,
                files,
                tools,
            } => {
                info!("Stage 1/2: Tool comparison");
                let comparison = Self::tool_comparison(search_dir.as_ref(), files, tools);
                if summaries {
                    print_tool_summary(&comparison);
                }
                (
                    report::tool_matrix_table(&comparison),
                    vec![("markers", report::marker_table(&comparison))],
                )
            }
            CommandConfig::CompareDuplicates {
                root,
                fk_command,
                artifact_dir,
            } => {
                info!("Stage 1/2: Duplicate comparison");
                let kinematics = fk_command
                    .as_deref()
                    .map(CommandKinematics::from_command_line)
                    .transpose()?;
                let duplicates = crate::compare::compare_duplicates(
                    root,
                    kinematics.as_ref().map(|k| k as &dyn Kinematics),
                    artifact_dir,
                )?;
                if summaries {
                    print_duplicate_summary(&duplicates);
                }
                (
                    report::duplicate_diff_table(&duplicates),
                    vec![("sources", report::source_stats_table(&duplicates.sources))],
                )
            }
        };

        info!("Stage 2/2: Report");
        let secondary: Vec<(&str, &Table)> = secondary.iter().map(|(name, t)| (*name, t)).collect();
        let files_written = report::write_report(&primary, &secondary, &config.output, config.format)?;

        let duration = start.elapsed();
        info!(rows = primary.len(), files = files_written.len(), elapsed = ?duration, "Analysis complete");

        Ok(RunSummary {
            rows: primary.len(),
            files_written,
            duration,
        })
    }

    fn model_information(
        filename: Option<&PathBuf>,
        search_dir: Option<&PathBuf>,
        options: &AnalysisOptions,
    ) -> Vec<UrdfInformation> {
        if let Some(dir) = search_dir {
            if filename.is_some() {
                warn!("Both a file and a search directory were given, using the search directory");
            }
            if options.urdf_root_dir.is_some() {
                warn!("--urdf-root-dir is ignored when searching a directory");
            }
            let files = search_for_urdfs(dir);
            return get_models_information(&files, options);
        }

        match filename {
            Some(filename) => {
                let mut analysis = ModelAnalysis::new();
                vec![get_model_information(&mut analysis, Some(filename), options)]
            }
            None => Vec::new(),
        }
    }

    fn tool_comparison(
        search_dir: Option<&PathBuf>,
        files: &[PathBuf],
        specs: &[ToolSpec],
    ) -> ToolComparison {
        let files = match search_dir {
            Some(dir) => search_for_urdfs(dir),
            None => files.to_vec(),
        };
        let tools: Vec<Box<dyn UrdfTool>> = specs.iter().map(build_tool).collect();
        compare_tools(&files, &tools)
    }
}

fn print_information_summary(records: &[UrdfInformation]) {
    let parsed = records.iter().filter(|r| !r.is_empty()).count();
    let joints: usize = records
        .iter()
        .filter_map(|r| r.joint_information.as_ref())
        .map(|j| j.n_joints())
        .sum();
    let links: usize = records
        .iter()
        .filter_map(|r| r.link_information.as_ref())
        .map(|l| l.n_links())
        .sum();

    println!("=== Model Information ===");
    println!("  Files:   {}", records.len());
    println!("  Parsed:  {parsed}");
    println!("  Joints:  {joints}");
    println!("  Links:   {links}");
    println!();
}

fn print_tool_summary(comparison: &ToolComparison) {
    println!("=== Tool Comparison ===");
    println!("  Files:   {}", comparison.rows.len());
    for (t, tool) in comparison.tools.iter().enumerate() {
        let passed = comparison.rows.iter().filter(|r| r.results[t]).count();
        println!("  {tool:<16} {passed}/{}", comparison.rows.len());
    }
    println!();
}

fn print_duplicate_summary(report: &DuplicateReport) {
    let changed = report
        .diffs
        .iter()
        .filter(|d| {
            [d.joints_diff, d.links_diff, d.meshes_diff, d.lines_diff].contains(&DiffResult::Changed)
                || d.fk_diff == Some(DiffResult::Changed)
        })
        .count();

    println!("=== Duplicate Comparison ===");
    println!("  Robots:  {}", report.robots.len());
    println!("  Sources: {}", report.sources.len());
    println!("  Pairs:   {} ({changed} with differences)", report.diffs.len());
    println!();
}
