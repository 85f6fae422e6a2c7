#![deny(warnings)]

//! Settings seed files: load YAML/JSON over defaults and export snapshots.

use estimate_core::{validate_settings, Settings, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Environment variable naming the seed file when no path is given.
pub const SETTINGS_ENV: &str = "ESTIMATE_SETTINGS";

/// Seed file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", path.display(), source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Parse { line: Option<usize>, message: String },

    #[error("settings failed validation: {0}")]
    Invalid(#[from] ValidationError),

    #[error("failed to write {}: {}", path.display(), source)]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported settings format {0:?}; use .yaml, .yml or .json")]
    UnsupportedFormat(String),
}

/// On-disk encoding of a settings file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parse settings text; keys that are absent take their defaults.
    pub fn parse(self, text: &str) -> Result<Settings, ConfigError> {
        match self {
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            }),
            Format::Json => serde_json::from_str(text).map_err(|e| ConfigError::Parse {
                line: Some(e.line()),
                message: e.to_string(),
            }),
        }
    }

    /// Render settings as text.
    pub fn render(self, settings: &Settings) -> Result<String, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse {
            line: None,
            message,
        };
        match self {
            Format::Yaml => serde_yaml::to_string(settings).map_err(|e| parse_err(e.to_string())),
            Format::Json => {
                serde_json::to_string_pretty(settings).map_err(|e| parse_err(e.to_string()))
            }
        }
    }
}

/// Seed file loader.
pub struct SettingsLoader {
    path: Option<PathBuf>,
}

impl SettingsLoader {
    /// Loader for an explicit file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Loader for `path`, else the file named by `ESTIMATE_SETTINGS`, else
    /// none (defaults).
    pub fn resolve(path: Option<PathBuf>) -> Self {
        let path = path.or_else(|| std::env::var_os(SETTINGS_ENV).map(PathBuf::from));
        Self { path }
    }

    /// Path the loader will read, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load and validate settings. A missing file yields defaults.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let Some(path) = &self.path else {
            info!("no settings file configured; using defaults");
            return Ok(Settings::default());
        };
        if !path.exists() {
            info!(path = %path.display(), "settings file not found; using defaults");
            return Ok(Settings::default());
        }
        let format = Format::from_path(path)?;
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let settings = format.parse(&text)?;
        validate_settings(&settings)?;
        info!(
            path = %path.display(),
            resources = settings.resources.len(),
            "settings loaded"
        );
        Ok(settings)
    }
}

/// Validate and write `settings` to `path`, encoded by its extension.
pub fn export_settings(path: impl AsRef<Path>, settings: &Settings) -> Result<(), ConfigError> {
    let path = path.as_ref();
    validate_settings(settings)?;
    let text = Format::from_path(path)?.render(settings)?;
    fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "settings exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimate_core::{Resource, ResourceId, ResourceKind};
    use rust_decimal::Decimal;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = SettingsLoader::new(dir.path().join("none.yaml")).load().unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn partial_yaml_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            r#"
siteName: BuildRight
cementPrice: 1500
assumptions:
  qualityFactors:
    luxury: 1.9
resources:
  - id: 3
    title: Checklist
    url: http://x/doc.pdf
    type: checklist
"#,
        )
        .unwrap();
        let s = SettingsLoader::new(&path).load().unwrap();
        assert_eq!(s.site_name, "BuildRight");
        assert_eq!(s.cement_price, Decimal::new(1500, 0));
        assert_eq!(s.assumptions.quality_factors.luxury, Decimal::new(19, 1));
        assert_eq!(s.assumptions.quality_factors.premium, Decimal::new(13, 1));
        assert_eq!(s.assumptions.location_factors.urban, Decimal::new(12, 1));
        assert_eq!(s.resources[0].kind, ResourceKind::Checklist);
        assert_eq!(s.report_header, Settings::default().report_header);
    }

    #[test]
    fn yaml_errors_carry_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        fs::write(&path, "siteName: ok\nbrickPrice: [1, 2\n").unwrap();
        match SettingsLoader::new(&path).load() {
            Err(ConfigError::Parse { line, .. }) => assert!(line.is_some()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r##"{ "brandColor": "#12" }"##).unwrap();
        assert!(matches!(
            SettingsLoader::new(&path).load(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            SettingsLoader::new(&path).load(),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn export_then_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut s = Settings::default();
        s.resources.push(Resource {
            id: ResourceId(1),
            title: "Formulas".into(),
            description: "Quantity formulas".into(),
            category: "Formulas".into(),
            url: "http://x/f.pdf".into(),
            kind: ResourceKind::Pdf,
        });
        s.assumptions.location_factors.rural = Decimal::new(75, 2);
        export_settings(&path, &s).unwrap();
        let back = SettingsLoader::new(&path).load().unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn export_refuses_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = Settings::default();
        s.mortar_ratio = "four".into();
        assert!(export_settings(dir.path().join("out.yaml"), &s).is_err());
        assert!(!dir.path().join("out.yaml").exists());
    }

    #[test]
    fn explicit_path_wins_over_env() {
        // Only test that touches the process environment.
        std::env::set_var(SETTINGS_ENV, "from-env.json");
        let from_env = SettingsLoader::resolve(None);
        let given = SettingsLoader::resolve(Some(PathBuf::from("given.yaml")));
        std::env::remove_var(SETTINGS_ENV);
        let unset = SettingsLoader::resolve(None);

        assert_eq!(from_env.path(), Some(Path::new("from-env.json")));
        assert_eq!(given.path(), Some(Path::new("given.yaml")));
        assert_eq!(unset.path(), None);
    }
}
