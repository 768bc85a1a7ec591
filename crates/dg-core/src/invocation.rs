//! How dbt is invoked for a project: arguments, environment, caches and the
//! runner script that carries dbt's target directory between runs.

use crate::env_vars::DbtEnvVars;
use crate::error::{CoreError, CoreResult};
use crate::paths;
use crate::project::{ProjectSpec, ProjectTarget};
use std::collections::BTreeMap;
use std::fmt;

/// File name of the generated runner script
pub const RUNNER_SCRIPT_NAME: &str = "__dbt_runner.sh";

/// The dbt CLI configured for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbtCli {
    project_dir: String,
    profiles_dir: String,
    project_name: String,
    profile_name: String,
    profile_target: Option<String>,
    target_path_in_project_dir: String,
    requirements: Vec<String>,
    resolve: String,
    env: DbtEnvVars,
}

impl DbtCli {
    /// Configure dbt for `target`. The project must declare `name` and `profile`.
    pub fn compose(target: &ProjectTarget, spec: &ProjectSpec, env: DbtEnvVars) -> CoreResult<Self> {
        let project_name = spec
            .name()
            .ok_or_else(|| CoreError::invalid_project("missing `name` in dbt_project.yml", None))?;
        let profile_name = spec.profile().ok_or_else(|| {
            CoreError::invalid_project("missing `profile` in dbt_project.yml", Some(project_name))
        })?;

        let requirements = std::iter::once("dbt-core".to_string())
            .chain(target.required_adapters().iter().cloned())
            .collect();

        Ok(Self {
            project_dir: target.project_dir(),
            profiles_dir: target.profiles_dir(),
            project_name: project_name.to_string(),
            profile_name: profile_name.to_string(),
            profile_target: target.profile_target().map(String::from),
            target_path_in_project_dir: spec.target_path().to_string(),
            requirements,
            resolve: target.resolve().to_string(),
            env,
        })
    }

    pub fn project_dir(&self) -> &str {
        &self.project_dir
    }

    pub fn profiles_dir(&self) -> &str {
        &self.profiles_dir
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn profile_target(&self) -> Option<&str> {
        self.profile_target.as_deref()
    }

    /// dbt's output directory relative to the build root
    pub fn target_path(&self) -> String {
        paths::join(&self.project_dir, &self.target_path_in_project_dir)
    }

    /// Directory dbt's output is saved to between runs
    pub fn cached_target_path(&self) -> String {
        format!(
            "__{}_{}_{}_{}_append_only_target_cache__",
            self.project_name,
            self.profile_name,
            self.profile_target_label(),
            self.target_path_in_project_dir
        )
    }

    /// Append a dbt subcommand with the project, profiles and target flags
    pub fn make_args<S: AsRef<str>>(&self, args: &[S]) -> Vec<String> {
        let mut argv: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        argv.push(format!("--project-dir={}", display_dir(&self.project_dir)));
        argv.push(format!("--profiles-dir={}", display_dir(&self.profiles_dir)));
        if let Some(target) = &self.profile_target {
            argv.push(format!("--target={}", target));
        }
        argv
    }

    /// Cache name to cache directory, one per project, profile and target
    pub fn append_only_caches(&self) -> BTreeMap<String, String> {
        let name = format!(
            "{}_{}_{}",
            self.project_name,
            self.profile_name,
            self.profile_target_label()
        )
        .to_lowercase();
        BTreeMap::from([(name, self.cached_target_path())])
    }

    /// Python requirements dbt needs: `dbt-core` plus every adapter
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    pub fn resolve(&self) -> &str {
        &self.resolve
    }

    pub fn env(&self) -> &DbtEnvVars {
        &self.env
    }

    fn profile_target_label(&self) -> &str {
        self.profile_target.as_deref().unwrap_or("default")
    }
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() {
        "."
    } else {
        dir
    }
}

/// dbt subcommands run by dbtgraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbtCommand {
    /// Install packages
    Deps,
    /// Parse the project into `manifest.json`
    Parse,
    /// Render compiled SQL
    Compile,
}

impl DbtCommand {
    pub fn subcommand(self) -> &'static str {
        match self {
            DbtCommand::Deps => "deps",
            DbtCommand::Parse => "parse",
            DbtCommand::Compile => "compile",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DbtCommand::Deps => "Hydrating dbt dependencies",
            DbtCommand::Parse => "Parsing dbt project",
            DbtCommand::Compile => "Compiling dbt project",
        }
    }

    /// Commands that must run first. Parsing and compiling need the
    /// project's packages installed.
    pub fn prerequisites(self) -> &'static [DbtCommand] {
        match self {
            DbtCommand::Deps => &[],
            DbtCommand::Parse | DbtCommand::Compile => &[DbtCommand::Deps],
        }
    }

    /// Full argv for this command
    pub fn argv(self, cli: &DbtCli) -> Vec<String> {
        cli.make_args(&[self.subcommand()])
    }

    /// Directories the command writes, relative to the build root
    pub fn output_directories(self) -> Vec<String> {
        match self {
            DbtCommand::Deps | DbtCommand::Compile => vec![".".to_string()],
            DbtCommand::Parse => Vec::new(),
        }
    }

    /// Files the command writes, relative to the build root
    pub fn output_files(self, cli: &DbtCli) -> Vec<String> {
        match self {
            DbtCommand::Parse => vec![paths::join(&cli.target_path(), "manifest.json")],
            DbtCommand::Deps | DbtCommand::Compile => Vec::new(),
        }
    }
}

impl fmt::Display for DbtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

/// Paths of the system tools the runner script calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemBinaries {
    pub mkdir: String,
    pub cp: String,
    pub chmod: String,
}

impl Default for SystemBinaries {
    fn default() -> Self {
        Self {
            mkdir: "/bin/mkdir".to_string(),
            cp: "/bin/cp".to_string(),
            chmod: "/bin/chmod".to_string(),
        }
    }
}

/// Render the runner script for `argv`.
///
/// It restores dbt's target directory from the append-only cache when
/// missing, runs dbt, copies the target directory back to the cache and
/// exits with dbt's status.
pub fn runner_script(cli: &DbtCli, binaries: &SystemBinaries, argv: &[String]) -> String {
    let target_path = shell_quote(&cli.target_path());
    let cached = shell_quote(&cli.cached_target_path());
    let command: Vec<String> = argv.iter().map(|arg| shell_quote(arg)).collect();
    let mkdir = shell_quote(&binaries.mkdir);
    let cp = shell_quote(&binaries.cp);
    let chmod = shell_quote(&binaries.chmod);

    format!(
        "#!/usr/bin/env sh
if [ ! -d {target_path} ]; then
    {mkdir} -p {target_path} > /dev/null 2>&1
    if [ -d {cached} ]; then
        {cp} -r {cached}/. {target_path} > /dev/null 2>&1
    fi
fi

{chmod} -R u+rwX {target_path} > /dev/null 2>&1
{command}
EXIT_CODE=$?

if [ -d {target_path} ]; then
    {mkdir} -p {cached} > /dev/null 2>&1
    {cp} -r {target_path}/. {cached} > /dev/null 2>&1
fi
exit $EXIT_CODE
",
        command = command.join(" "),
    )
}

/// Quote `arg` for a POSIX shell when it holds anything beyond plain word characters
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

#[cfg(test)]
#[path = "invocation_test.rs"]
mod tests;
