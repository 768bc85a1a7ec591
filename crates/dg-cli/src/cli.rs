//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// dbtgraph - dbt projects as fine-grained build-graph targets
#[derive(Parser, Debug)]
#[command(name = "dg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Build root holding `BUILD.yml` declarations
    #[arg(short = 'r', long, global = true, default_value = ".", env = "DG_BUILD_ROOT")]
    pub build_root: String,

    /// dbt executable, looked up on PATH when not a path
    #[arg(long, global = true, default_value = "dbt", env = "DG_DBT")]
    pub dbt: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the loaded `dbt_project.yml` and packages of each project
    Spec(SpecArgs),

    /// List targets
    Ls(LsArgs),

    /// Find `dbt_project.yml` files without a project target
    Tailor(TailorArgs),

    /// Show the environment dbt runs with
    Env(ProjectArgs),

    /// Print the runner script for a dbt command
    Script(ScriptArgs),

    /// Run `dbt parse` to produce the manifest
    Parse(ProjectArgs),

    /// Run `dbt compile`
    Compile(ProjectArgs),

    /// Run `dbt deps` to install third-party packages
    Install(ProjectArgs),

    /// Show dependencies inferred from the manifest
    Deps(DepsArgs),

    /// Show where the compiled SQL of a target lives
    Compiled(CompiledArgs),
}

/// Output formats shared by listing commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Arguments for commands acting on dbt projects
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project target address (default: every project)
    #[arg(short, long)]
    pub project: Option<String>,
}

/// Arguments for the spec command
#[derive(Args, Debug)]
pub struct SpecArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: Output,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Only list targets of this kind (e.g. dbt_model)
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: Output,
}

/// Arguments for the tailor command
#[derive(Args, Debug)]
pub struct TailorArgs {
    /// Write a `BUILD.yml` for each putative target
    #[arg(short, long)]
    pub write: bool,
}

/// dbt subcommands with a runner script
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbtSubcommand {
    Deps,
    Parse,
    Compile,
}

/// Arguments for the script command
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// dbt subcommand to render
    #[arg(value_enum)]
    pub subcommand: DbtSubcommand,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the deps command
#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Target addresses to query (default: every indexed target)
    pub addresses: Vec<String>,

    /// Manifest to read instead of `<target-path>/manifest.json`
    #[arg(short, long)]
    pub manifest: Option<String>,

    /// Show dependents instead of dependencies
    #[arg(short, long)]
    pub dependents: bool,

    /// Follow edges transitively
    #[arg(short, long)]
    pub transitive: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: Output,
}

/// Arguments for the compiled command
#[derive(Args, Debug)]
pub struct CompiledArgs {
    /// Address of a generated dbt target
    pub address: String,

    /// Manifest to read instead of `<target-path>/manifest.json`
    #[arg(short, long)]
    pub manifest: Option<String>,

    /// Print the compiled SQL instead of its path
    #[arg(short, long)]
    pub show: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
