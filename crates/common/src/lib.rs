//! Shared settings and logging setup for typeweave.
//!
//! This crate contains the pieces used by both the `typeweave-core` pipeline
//! and the `typeweave` binary: the generation [`Settings`] (loaded from TOML)
//! and the `tracing` subscriber initialisation.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "TYPEWEAVE_LOG";

/// Table under which settings may live inside a larger TOML document.
const TOOL_TABLE: &str = "typeweave";

/// Crates whose targets a plain log level applies to.
const LOG_TARGETS: [&str; 3] = ["typeweave_common", "typeweave_core", "typeweave_cli"];

/// Which interfaces the functional-interface synthesizer may turn into function types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamMode {
    /// Only interfaces explicitly tagged functional are eligible.
    AnnotationGated,
    /// Any interface with a single unimplemented method is eligible.
    #[default]
    Structural,
}

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Which interfaces may become function types.
    pub sam_mode: SamMode,
    /// Emit abstract interface methods.
    pub emit_abstract_methods: bool,
    /// Emit interface default methods, as optional methods.
    pub emit_default_methods: bool,
    /// Emit static methods.
    pub emit_static_methods: bool,
    /// Emit concrete instance methods.
    pub emit_other_methods: bool,
    /// When non-empty, a member must carry one of these markers to be emitted.
    pub include_member_markers: Vec<String>,
    /// Members carrying any of these markers are skipped.
    pub exclude_member_markers: Vec<String>,
    /// Properties carrying any of these markers are emitted as optional (`name?:`).
    pub optional_markers: Vec<String>,
    /// Order declarations by name instead of discovery order.
    pub sort_declarations: bool,
    /// Order members by name instead of declaration order.
    pub sort_members: bool,
    /// One level of indentation in the output.
    pub indent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sam_mode: SamMode::default(),
            emit_abstract_methods: false,
            emit_default_methods: false,
            emit_static_methods: false,
            emit_other_methods: false,
            include_member_markers: Vec::new(),
            exclude_member_markers: Vec::new(),
            optional_markers: Vec::new(),
            sort_declarations: true,
            sort_members: true,
            indent: "    ".to_string(),
        }
    }
}

impl Settings {
    /// Whether any method category is enabled at all.
    pub fn emits_methods(&self) -> bool {
        self.emit_abstract_methods
            || self.emit_default_methods
            || self.emit_static_methods
            || self.emit_other_methods
    }

    /// Parse settings from a TOML document.
    ///
    /// The keys may sit under `[tool.typeweave]` or at the top level, so the
    /// settings can share a file with other project configuration. Without a
    /// `[tool.typeweave]` table, other tables in the document are ignored;
    /// unknown top-level keys are still rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let document: toml::Table = contents
            .parse()
            .map_err(|err| format!("Failed to parse settings: {err}"))?;

        let table = match document.get("tool").and_then(|tool| tool.get(TOOL_TABLE)) {
            Some(table) => table.clone(),
            None => toml::Value::Table(
                document
                    .into_iter()
                    .filter(|(_, value)| !value.is_table())
                    .collect(),
            ),
        };

        table
            .try_into::<Self>()
            .map_err(|err| format!("Invalid settings: {err}"))
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        Self::from_toml_str(&contents)
    }
}

fn is_plain_level(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

/// Build the filter spec from the raw value of [`LOG_ENV_VAR`].
///
/// A plain level ("debug") applies to all typeweave crates; anything else is
/// used as a full filter spec ("typeweave_core=trace,warn").
pub fn log_filter_spec(raw: Option<&str>) -> String {
    match raw {
        Some(level) if is_plain_level(level) => LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(","),
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => log_filter_spec(Some("info")),
    }
}

/// Install a stderr fmt subscriber filtered by [`LOG_ENV_VAR`].
pub fn init_tracing() {
    let raw = std::env::var(LOG_ENV_VAR).ok();
    let filter = log_filter_spec(raw.as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}
