//! `typeweave generate`: load a universe and settings, then write declarations.

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use typeweave_common::Settings;
use typeweave_core::{SourceType, TypeUniverse, generate};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// JSON description of the host types
    #[arg(long, value_name = "PATH")]
    pub universe: PathBuf,

    /// TOML settings file (top level or `[tool.typeweave]`)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Type to start discovery from; repeatable
    #[arg(long = "root", value_name = "TYPE", required = true)]
    pub roots: Vec<String>,

    /// Write the declarations here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

pub fn run(args: GenerateArgs) -> i32 {
    match run_inner(&args) {
        Ok(Some(output)) => {
            print!("{output}");
            0
        }
        Ok(None) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// Returns the output when it should go to stdout.
fn run_inner(args: &GenerateArgs) -> Result<Option<String>, String> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let universe = load_universe(&args.universe)?;
    let roots = args
        .roots
        .iter()
        .map(|root| root.parse::<SourceType>().map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(roots = ?args.roots, "Generating declarations");

    let output = generate(&universe, &roots, &settings).map_err(|err| err.to_string())?;

    match &args.out {
        Some(path) => {
            fs::write(path, &output)
                .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;
            info!(path = %path.display(), bytes = output.len(), "Wrote declarations");
            Ok(None)
        }
        None => Ok(Some(output)),
    }
}

fn load_universe(path: &Path) -> Result<TypeUniverse, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
    TypeUniverse::from_json(&contents).map_err(|err| format!("{}: {err}", path.display()))
}
