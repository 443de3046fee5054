// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, UnitypipeError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::UnitypipeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_unity(cfg)?;
    validate_pipeline(cfg)?;
    validate_reports(cfg)?;
    validate_build(cfg)?;
    validate_display(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> UnitypipeError {
    UnitypipeError::ConfigError(msg.into())
}

fn validate_unity(cfg: &RawConfigFile) -> Result<()> {
    if cfg.unity.project_path.as_os_str().is_empty() {
        return Err(config_error("[unity].project_path must not be empty"));
    }

    let has_executable = cfg
        .unity
        .executable
        .as_ref()
        .is_some_and(|p| !p.as_os_str().is_empty());
    let has_hub = cfg
        .unity
        .hub_editor_root
        .as_ref()
        .is_some_and(|p| !p.as_os_str().is_empty());

    if !has_executable && !has_hub {
        return Err(config_error(
            "[unity] needs either `executable` or `hub_editor_root`",
        ));
    }
    Ok(())
}

fn validate_pipeline(cfg: &RawConfigFile) -> Result<()> {
    if cfg.pipeline.branch.trim().is_empty() {
        return Err(config_error("[pipeline].branch must not be empty"));
    }
    if cfg.pipeline.report_root.as_os_str().is_empty() {
        return Err(config_error("[pipeline].report_root must not be empty"));
    }
    Ok(())
}

fn validate_reports(cfg: &RawConfigFile) -> Result<()> {
    for (key, value) in [
        ("deployment_url", &cfg.reports.deployment_url),
        ("pr_url", &cfg.reports.pr_url),
    ] {
        if value.trim().is_empty() {
            return Err(config_error(format!("[reports].{key} must not be empty")));
        }
    }
    Ok(())
}

fn validate_build(cfg: &RawConfigFile) -> Result<()> {
    if cfg.build.target.trim().is_empty() {
        return Err(config_error("[build].target must not be empty"));
    }
    if cfg.build.method.trim().is_empty() {
        return Err(config_error("[build].method must not be empty"));
    }
    Ok(())
}

fn validate_display(cfg: &RawConfigFile) -> Result<()> {
    if cfg.display.wrapper.first().is_none_or(|program| program.trim().is_empty()) {
        return Err(config_error(
            "[display].wrapper must name a program (e.g. [\"xvfb-run\", \"--auto-servernum\"])",
        ));
    }
    Ok(())
}
