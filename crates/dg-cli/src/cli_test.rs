use super::*;
use clap::{CommandFactory, Parser};

#[test]
fn verify_cli_args() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_deps_arguments() {
    let cli = Cli::parse_from([
        "dg",
        "-r",
        "repo",
        "deps",
        "jaffle:project#models/orders.sql",
        "--dependents",
        "--transitive",
        "-o",
        "json",
    ]);
    assert_eq!(cli.global.build_root, "repo");
    match cli.command {
        Commands::Deps(args) => {
            assert_eq!(args.addresses, vec!["jaffle:project#models/orders.sql"]);
            assert!(args.dependents);
            assert!(args.transitive);
            assert_eq!(args.output, Output::Json);
            assert!(args.manifest.is_none());
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_script_arguments() {
    let cli = Cli::parse_from(["dg", "script", "parse", "--project", "jaffle"]);
    match cli.command {
        Commands::Script(args) => {
            assert_eq!(args.subcommand, DbtSubcommand::Parse);
            assert_eq!(args.project.project.as_deref(), Some("jaffle"));
        }
        other => panic!("unexpected command {:?}", other),
    }
}
