pub use config::ConfigError;
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Load layered settings for `app_name`.
///
/// Sources, lowest precedence first:
/// 1. `config/base.yaml` (looked up in the current directory and in `<app_name>/config`)
/// 2. `<app_name>.yaml` in the current directory
/// 3. `explicit_file`, which must exist when given
/// 4. Environment variables `<ENV_PREFIX>_SECTION__KEY`
///
/// A `.env` file is read first so its values take part in step 4.
pub fn load_settings<T: DeserializeOwned>(
    app_name: &str,
    env_prefix: &str,
    explicit_file: Option<&Path>,
) -> Result<T, ConfigError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine current directory: {}", e)))?;

    let mut builder = Config::builder();

    for candidate in base_config_candidates(&base_path, app_name) {
        builder = builder.add_source(File::from(candidate).required(false));
    }

    builder = builder
        .add_source(File::from(base_path.join(format!("{}.yaml", app_name))).required(false));

    if let Some(path) = explicit_file {
        builder = builder.add_source(File::from(path.to_path_buf()).required(true));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize::<T>()
}

fn base_config_candidates(base_path: &Path, app_name: &str) -> Vec<PathBuf> {
    // Running from inside the crate directory or from the workspace root.
    if base_path.ends_with(app_name) {
        vec![base_path.join("config").join("base.yaml")]
    } else {
        vec![
            base_path.join("config").join("base.yaml"),
            base_path.join(app_name).join("config").join("base.yaml"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Sample {
        api: SampleApi,
    }

    #[derive(Debug, Deserialize)]
    struct SampleApi {
        base_url: String,
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    }

    fn default_timeout() -> u64 {
        30
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "api:\n  base_url: http://localhost:9000").unwrap();

        let sample: Sample =
            load_settings("console-core-test", "CONSOLECORETESTA", Some(file.path())).unwrap();
        assert_eq!(sample.api.base_url, "http://localhost:9000");
        assert_eq!(sample.api.timeout_secs, 30);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "api:\n  base_url: http://localhost:9000").unwrap();

        std::env::set_var("CONSOLECORETESTB_API__TIMEOUT_SECS", "5");
        let sample: Sample =
            load_settings("console-core-test", "CONSOLECORETESTB", Some(file.path())).unwrap();
        std::env::remove_var("CONSOLECORETESTB_API__TIMEOUT_SECS");

        assert_eq!(sample.api.timeout_secs, 5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result: Result<Sample, _> = load_settings(
            "console-core-test",
            "CONSOLECORETESTC",
            Some(Path::new("/definitely/not/here.yaml")),
        );
        assert!(result.is_err());
    }
}
