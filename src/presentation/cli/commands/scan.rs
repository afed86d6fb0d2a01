use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::{display_path, OutputFormat};
use crate::application::use_cases::scan_project_manifest::ScanProjectManifestUseCase;
use crate::domain::entities::scan_report::ScanReport;
use crate::presentation::ui::{DisplayHelper, StatusType};

/// Arguments of `reposync scan`
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Project manifest, or a directory containing one
    pub manifest: PathBuf,

    /// Files expected to be registered in the manifest
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format (text, json, yaml)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Handler for the scan command
pub struct ScanCommand {
    pub args: ScanArgs,
    pub directory: PathBuf,
}

impl ScanCommand {
    pub fn new(args: ScanArgs, directory: PathBuf) -> Self {
        Self { args, directory }
    }

    /// Exit code is 0 when every expected file is registered, 1 otherwise
    pub async fn execute(&self, display: &DisplayHelper) -> Result<i32> {
        let manifest = self.directory.join(&self.args.manifest);
        let report = ScanProjectManifestUseCase::default()
            .execute(&manifest, &self.args.files)
            .await?;

        match self.args.output {
            OutputFormat::Text => self.print_text(display, &report),
            OutputFormat::Json | OutputFormat::Yaml => self.args.output.print(&report)?,
        }

        Ok(if report.is_complete() { 0 } else { 1 })
    }

    fn print_text(&self, display: &DisplayHelper, report: &ScanReport) {
        display.section_header(&format!(
            "Project manifest {}",
            display.format_path(&display_path(&report.manifest_path, &self.directory))
        ));
        display.print_indented(
            &format!("{} file references registered", report.registered.len()),
            1,
        );

        for file in &report.present {
            display.print_status(StatusType::Success, file);
        }
        for file in &report.missing {
            display.print_status(StatusType::Error, &format!("{file} (not registered)"));
        }

        if report.is_complete() {
            display.success("All expected files are registered");
        } else {
            display.warning(&format!(
                "{} of {} expected files are not registered",
                report.missing.len(),
                report.missing.len() + report.present.len()
            ));
        }
    }
}
