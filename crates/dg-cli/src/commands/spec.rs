//! Spec command implementation

use anyhow::{Context, Result};
use dg_core::{Address, LoadedProject, PackageSpec};
use serde::Serialize;

use crate::cli::{GlobalArgs, Output, SpecArgs};
use crate::commands::common::{load_projects, load_workspace};

/// Execute the spec command
pub async fn execute(args: &SpecArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let loaded = load_projects(&workspace, args.project.project.as_deref())?;
    let reports = loaded
        .iter()
        .map(SpecReport::from_project)
        .collect::<Result<Vec<_>>>()?;

    match args.output {
        Output::Json => {
            let json = serde_json::to_string_pretty(&reports)
                .context("Failed to serialize project specs")?;
            println!("{}", json);
        }
        Output::Text => {
            for report in &reports {
                print_report(report);
            }
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct SpecReport<'a> {
    address: &'a Address,
    name: Option<&'a str>,
    profile: Option<&'a str>,
    profile_target: Option<&'a str>,
    requires_dbt_version: String,
    packages_file: &'a str,
    target_path: &'a str,
    digest: &'a str,
    packages: &'a [PackageSpec],
    targets: usize,
}

impl<'a> SpecReport<'a> {
    fn from_project(project: &'a LoadedProject) -> Result<Self> {
        let requires = project
            .spec
            .requires_dbt_version()
            .with_context(|| format!("Invalid requires-dbt-version in {}", project.target.address()))?;
        Ok(Self {
            address: project.target.address(),
            name: project.spec.name(),
            profile: project.spec.profile(),
            profile_target: project.target.profile_target(),
            requires_dbt_version: requires.to_string(),
            packages_file: project.target.packages_file(),
            target_path: project.spec.target_path(),
            digest: project.spec.digest(),
            packages: project.spec.packages(),
            targets: project.targets.len(),
        })
    }
}

fn print_report(report: &SpecReport<'_>) {
    println!("{}", report.address);
    println!("  name:                 {}", report.name.unwrap_or("-"));
    println!("  profile:              {}", report.profile.unwrap_or("-"));
    println!(
        "  profile target:       {}",
        report.profile_target.unwrap_or("default")
    );
    let requires = if report.requires_dbt_version.is_empty() {
        "-"
    } else {
        &report.requires_dbt_version
    };
    println!("  requires-dbt-version: {}", requires);
    println!("  packages file:        {}", report.packages_file);
    println!("  target-path:          {}", report.target_path);
    println!("  digest:               {}", report.digest);
    println!("  generated targets:    {}", report.targets);
    if report.packages.is_empty() {
        println!("  packages:             -");
    } else {
        println!("  packages:");
        for package in report.packages {
            let kind = if package.is_third_party() { "" } else { " (local)" };
            let text = serde_json::to_string(package).unwrap_or_default();
            println!("    - {}{}", text, kind);
        }
    }
}
