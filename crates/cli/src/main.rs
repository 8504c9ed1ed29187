//! `typeweave` command line front end.

mod generate;

use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "typeweave",
    version,
    about = "Generate TypeScript declarations from a host type universe"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate declarations for the given root types
    Generate(generate::GenerateArgs),
}

fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => generate::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

fn main() {
    typeweave_common::init_tracing();
    let code = run_cli(std::env::args().collect());
    std::process::exit(code);
}
