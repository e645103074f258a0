use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AnalysisConfig, AsymmetryParams, LoadParams, LoggingConfig, ReadingSelection,
    ResearchParams, Scope, TeamEntry,
};

/// Loads the analysis configuration.
///
/// With an explicit `path` that file must exist. Without one, an optional
/// `perfmon.toml` in the working directory is read. Environment variables
/// prefixed `PERFMON_` override either (nested keys use `__`, e.g.
/// `PERFMON_LOAD__PERCENTILE=0.95`). Omitted settings take their defaults and
/// the result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    load_config_with_env(path, None)
}

/// Same as [`load_config`], but the `PERFMON_` overrides come from `env`
/// instead of the process environment when it is given.
pub fn load_config_with_env(
    path: Option<&Path>,
    env: Option<&[(&str, &str)]>,
) -> Result<AnalysisConfig, ConfigError> {
    let builder = config::Config::builder();
    let builder = match path {
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::with_name("perfmon").required(false)),
    };

    let environment = config::Environment::with_prefix("PERFMON")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("metrics")
        .with_list_parse_key("scope.sports")
        .source(env.map(|vars| {
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        }));

    let settings = builder.add_source(environment).build()?;

    // Attempt to deserialize the entire configuration into our `AnalysisConfig` struct
    let config = settings.try_deserialize::<AnalysisConfig>()?;
    config.validate()?;

    Ok(config)
}
