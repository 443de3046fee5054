use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::UnitypipeError;

/// Pipeline stage driven through the editor in batch mode.
///
/// The set is closed: every component matches on it exhaustively, so adding
/// or removing a stage is a compile error everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Edit-mode test run with coverage instrumentation.
    EditMode,
    /// Play-mode test run with coverage instrumentation.
    PlayMode,
    /// Coverage report aggregation (HTML + badge).
    Coverage,
    /// Player build for the configured platform (WebGL by default).
    Build,
    /// IDE solution/project file regeneration.
    SolutionSync,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::EditMode,
        Stage::PlayMode,
        Stage::Coverage,
        Stage::Build,
        Stage::SolutionSync,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::EditMode => "EditMode",
            Stage::PlayMode => "PlayMode",
            Stage::Coverage => "Coverage",
            Stage::Build => "Build",
            Stage::SolutionSync => "SolutionSync",
        }
    }

    /// Test stages keep the editor resident after the run so the coverage
    /// package can flush its results.
    pub fn is_test_run(&self) -> bool {
        matches!(self, Stage::EditMode | Stage::PlayMode)
    }

    /// Whether the stage consumes coverage options at all.
    pub fn uses_coverage(&self) -> bool {
        match self {
            Stage::EditMode | Stage::PlayMode | Stage::Coverage => true,
            Stage::Build | Stage::SolutionSync => false,
        }
    }

    /// Whether the editor needs a (virtual) display surface for this stage.
    pub fn needs_display(&self) -> bool {
        match self {
            Stage::PlayMode | Stage::Build => true,
            Stage::EditMode | Stage::Coverage | Stage::SolutionSync => false,
        }
    }

    fn valid_names() -> String {
        Stage::ALL
            .iter()
            .map(Stage::name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Identifiers are case-sensitive. `Webgl` and `Rider` are the legacy
/// job names for `Build` and `SolutionSync`.
impl FromStr for Stage {
    type Err = UnitypipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EditMode" => Ok(Stage::EditMode),
            "PlayMode" => Ok(Stage::PlayMode),
            "Coverage" => Ok(Stage::Coverage),
            "Build" | "Webgl" => Ok(Stage::Build),
            "SolutionSync" | "Rider" => Ok(Stage::SolutionSync),
            other => Err(UnitypipeError::ConfigError(format!(
                "unknown stage '{other}' (expected one of: {})",
                Stage::valid_names()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_legacy_identifiers() {
        assert_eq!("EditMode".parse::<Stage>().unwrap(), Stage::EditMode);
        assert_eq!("PlayMode".parse::<Stage>().unwrap(), Stage::PlayMode);
        assert_eq!("Coverage".parse::<Stage>().unwrap(), Stage::Coverage);
        assert_eq!("Build".parse::<Stage>().unwrap(), Stage::Build);
        assert_eq!("Webgl".parse::<Stage>().unwrap(), Stage::Build);
        assert_eq!("SolutionSync".parse::<Stage>().unwrap(), Stage::SolutionSync);
        assert_eq!("Rider".parse::<Stage>().unwrap(), Stage::SolutionSync);
    }

    #[test]
    fn unknown_identifier_lists_every_stage() {
        let err = "Android".parse::<Stage>().unwrap_err();
        match err {
            UnitypipeError::ConfigError(msg) => {
                assert!(msg.contains("Android"));
                for stage in Stage::ALL {
                    assert!(msg.contains(stage.name()), "missing {stage} in {msg}");
                }
            }
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert!("editmode".parse::<Stage>().is_err());
        assert!("WEBGL".parse::<Stage>().is_err());
        assert!("rider".parse::<Stage>().is_err());
    }

    #[test]
    fn display_and_coverage_policy() {
        let with_display: Vec<_> = Stage::ALL.iter().filter(|s| s.needs_display()).collect();
        assert_eq!(with_display, vec![&Stage::PlayMode, &Stage::Build]);

        let with_coverage: Vec<_> = Stage::ALL.iter().filter(|s| s.uses_coverage()).collect();
        assert_eq!(
            with_coverage,
            vec![&Stage::EditMode, &Stage::PlayMode, &Stage::Coverage]
        );
    }
}
