//! Script command implementation

use anyhow::Result;
use dg_core::{runner_script, DbtCommand, SystemBinaries, RUNNER_SCRIPT_NAME};

use crate::cli::{DbtSubcommand, GlobalArgs, ScriptArgs};
use crate::commands::common::{compose_cli, load_projects, load_workspace};

/// Execute the script command
pub async fn execute(args: &ScriptArgs, global: &GlobalArgs) -> Result<()> {
    let workspace = load_workspace(global)?;
    let loaded = load_projects(&workspace, args.project.project.as_deref())?;
    let command = match args.subcommand {
        DbtSubcommand::Deps => DbtCommand::Deps,
        DbtSubcommand::Parse => DbtCommand::Parse,
        DbtSubcommand::Compile => DbtCommand::Compile,
    };
    let binaries = system_binaries();

    for project in &loaded {
        let cli = compose_cli(&workspace, project)?;
        let mut argv = vec![global.dbt.clone()];
        argv.extend(command.argv(&cli));
        println!("# {} for {} ({})", RUNNER_SCRIPT_NAME, project.target.address(), command.description());
        let outputs: Vec<String> = command
            .output_files(&cli)
            .into_iter()
            .chain(command.output_directories())
            .collect();
        if !outputs.is_empty() {
            println!("# outputs: {}", outputs.join(" "));
        }
        print!("{}", runner_script(&cli, &binaries, &argv));
    }
    Ok(())
}

/// System tools from PATH, falling back to `/bin`
fn system_binaries() -> SystemBinaries {
    let defaults = SystemBinaries::default();
    let find = |name: &str, fallback: String| {
        which::which(name)
            .map(|path| path.display().to_string())
            .unwrap_or(fallback)
    };
    SystemBinaries {
        mkdir: find("mkdir", defaults.mkdir),
        cp: find("cp", defaults.cp),
        chmod: find("chmod", defaults.chmod),
    }
}
