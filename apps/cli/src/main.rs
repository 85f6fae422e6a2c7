#![deny(warnings)]

//! Headless admin CLI: load a settings seed, apply edits, validate, and print
//! or export the result.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use estimate_core::{
    validate_settings, LocationKind, QualityTier, ResourceId, ResourceKind, TextField,
};
use settings_admin::{
    parse_numeric, AdminPanel, NumericField, ResourceDraft, SettingsApi, SettingsPatch,
    SettingsStore,
};
use settings_config::{export_settings, Format, SettingsLoader, SETTINGS_ENV};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Yaml => Format::Yaml,
            OutputFormat::Json => Format::Json,
        }
    }
}

/// Edit estimator settings from the command line.
#[derive(Parser, Debug)]
#[command(name = "estimate-admin", version = VERSION)]
struct Args {
    /// Seed settings file (.yaml, .yml or .json); defaults when absent.
    #[arg(long, env = SETTINGS_ENV)]
    settings: Option<PathBuf>,

    /// JSON patch file merged before the individual edits.
    #[arg(long)]
    patch: Option<PathBuf>,

    /// Set a top-level text or price field, e.g. `--set pricePerSqFt=4800`.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,

    /// Set a numeric assumption, e.g. `--assumption doorCost=40000`.
    #[arg(long = "assumption", value_name = "FIELD=VALUE")]
    assumption: Vec<String>,

    /// Set a location factor, e.g. `--location urban=1.5`.
    #[arg(long = "location", value_name = "KIND=VALUE")]
    location: Vec<String>,

    /// Set a quality factor, e.g. `--quality luxury=1.8`.
    #[arg(long = "quality", value_name = "TIER=VALUE")]
    quality: Vec<String>,

    /// Image file to store as the logo.
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Remove a resource by id.
    #[arg(long = "remove-resource", value_name = "ID")]
    remove_resource: Vec<ResourceId>,

    /// Append a resource: `TITLE|DESCRIPTION|CATEGORY|URL[|TYPE]`.
    #[arg(long = "add-resource", value_name = "SPEC")]
    add_resource: Vec<String>,

    /// Write the result to this file (format from extension).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Format for stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,
}

fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    let (k, v) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {arg:?}"))?;
    Ok((k.trim(), v))
}

fn parse_resource(spec: &str) -> Result<ResourceDraft> {
    let parts: Vec<&str> = spec.split('|').map(str::trim).collect();
    let (title, description, category, url, kind) = match parts.as_slice() {
        [t, d, c, u] => (*t, *d, *c, *u, ResourceKind::default()),
        [t, d, c, u, k] => (*t, *d, *c, *u, ResourceKind::from_str(k)?),
        _ => bail!("expected TITLE|DESCRIPTION|CATEGORY|URL[|TYPE], got {spec:?}"),
    };
    Ok(ResourceDraft::new(title, description, category, url).with_kind(kind))
}

fn apply_set<S: SettingsApi>(panel: &mut AdminPanel<S>, arg: &str) -> Result<()> {
    let (field, value) = split_assignment(arg)?;
    if let Ok(text) = TextField::from_str(field) {
        panel.set_text(text, value);
        return Ok(());
    }
    panel
        .handle_numeric_input(value, field, None)
        .with_context(|| format!("--set {arg}"))?;
    Ok(())
}

fn apply_edits<S: SettingsApi>(panel: &mut AdminPanel<S>, args: &Args) -> Result<()> {
    if let Some(path) = &args.patch {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading patch {}", path.display()))?;
        let patch: SettingsPatch = serde_json::from_str(&text)
            .with_context(|| format!("parsing patch {}", path.display()))?;
        panel.store_mut().update_settings(patch);
    }
    for arg in &args.set {
        apply_set(panel, arg)?;
    }
    for arg in &args.assumption {
        let (field, value) = split_assignment(arg)?;
        let field = NumericField::resolve(field, Some("assumptions"))?;
        panel
            .set_numeric(field, value)
            .with_context(|| format!("--assumption {arg}"))?;
    }
    for arg in &args.location {
        let (kind, value) = split_assignment(arg)?;
        panel.update_location_factor(LocationKind::from_str(kind)?, parse_numeric(value)?);
    }
    for arg in &args.quality {
        let (tier, value) = split_assignment(arg)?;
        panel.update_quality_factor(QualityTier::from_str(tier)?, parse_numeric(value)?);
    }
    if let Some(path) = &args.logo {
        panel.set_logo_from_file(path)?;
    }
    for id in &args.remove_resource {
        if panel.remove_resource(*id).is_none() {
            bail!("no resource with id {id}");
        }
    }
    for spec in &args.add_resource {
        *panel.draft_mut() = parse_resource(spec)?;
        let id = panel.submit_resource_draft()?;
        info!(%id, "resource added from command line");
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!(settings = ?args.settings, out = ?args.out, "starting estimate-admin");

    let seed = SettingsLoader::resolve(args.settings.clone()).load()?;
    let mut store = SettingsStore::new(seed);
    store.subscribe(|s: &estimate_core::Settings| {
        tracing::debug!(resources = s.resources.len(), "settings changed")
    });

    let mut panel = AdminPanel::new(store);
    apply_edits(&mut panel, &args)?;
    validate_settings(panel.settings()).context("edited settings are invalid")?;

    if let Some(out) = &args.out {
        export_settings(out, panel.settings())?;
    }
    let rendered = Format::from(args.format).render(panel.settings())?;
    println!("{}", rendered.trim_end());
    info!(revision = panel.store().revision(), "done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["estimate-admin"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    fn run(extra: &[&str]) -> Result<estimate_core::Settings> {
        let mut panel = AdminPanel::new(SettingsStore::default());
        apply_edits(&mut panel, &args(extra))?;
        Ok(panel.into_store().into_settings())
    }

    #[test]
    fn applies_field_edits() {
        let s = run(&[
            "--set",
            "siteName=BuildRight",
            "--set",
            "pricePerSqFt=4800",
            "--assumption",
            "doorCost=",
            "--location",
            "urban=1.5",
            "--quality",
            "luxury=1.8",
        ])
        .unwrap();
        assert_eq!(s.site_name, "BuildRight");
        assert_eq!(s.price_per_sq_ft, Decimal::new(4800, 0));
        assert_eq!(s.assumptions.door_cost, Decimal::ZERO);
        assert_eq!(s.assumptions.location_factors.urban, Decimal::new(15, 1));
        assert_eq!(s.assumptions.location_factors.rural, Decimal::new(8, 1));
        assert_eq!(s.assumptions.quality_factors.luxury, Decimal::new(18, 1));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(run(&["--set", "pricePerSqFt=lots"]).is_err());
        assert!(run(&["--set", "pricePerSqFt"]).is_err());
        assert!(run(&["--assumption", "pricePerSqFt=1"]).is_err());
        assert!(run(&["--location", "downtown=1"]).is_err());
        assert!(run(&["--remove-resource", "7"]).is_err());
    }

    #[test]
    fn adds_resources_in_order() {
        let s = run(&[
            "--add-resource",
            "Checklist|Site checklist|Checklists|http://x/doc.pdf",
            "--add-resource",
            "Rates|Labor rates|Guidelines|http://x/rates.xlsx|spreadsheet",
        ])
        .unwrap();
        assert_eq!(s.resources.len(), 2);
        assert_eq!(s.resources[0].kind, ResourceKind::Pdf);
        assert_eq!(s.resources[1].title, "Rates");
        assert_eq!(s.resources[1].kind, ResourceKind::Spreadsheet);
    }

    #[test]
    fn resource_spec_needs_four_parts() {
        assert!(parse_resource("a|b|c").is_err());
        assert!(parse_resource("a|b|c|d|docx").is_err());
        assert_eq!(parse_resource(" a | b | c | d ").unwrap().url, "d");
    }

    #[test]
    fn patch_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.json");
        std::fs::write(
            &path,
            r#"{ "assumptions": { "locationFactors": { "rural": 0.7 } } }"#,
        )
        .unwrap();
        let s = run(&["--patch", path.to_str().unwrap()]).unwrap();
        assert_eq!(s.assumptions.location_factors.rural, Decimal::new(7, 1));
        assert_eq!(s.assumptions.location_factors.urban, Decimal::new(12, 1));
    }
}
