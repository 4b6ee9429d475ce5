use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::risk::RiskLevel;

/// Tunable tables consumed by the advisor engine. Every field falls back to the built-in
/// defaults when omitted from an override file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub risk_scoring: RiskScoringConfig,
    pub risk_bands: Vec<RiskBand>,
    pub stress_scenarios: Vec<StressScenario>,
    pub consistency: ConsistencyPenalties,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            risk_scoring: RiskScoringConfig::default(),
            risk_bands: default_risk_bands(),
            stress_scenarios: default_stress_scenarios(),
            consistency: ConsistencyPenalties::default(),
        }
    }
}

impl AdvisorConfig {
    /// Load an override file. Missing sections keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AdvisorTablesError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| AdvisorTablesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AdvisorConfig =
            serde_json::from_str(&raw).map_err(|source| AdvisorTablesError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AdvisorTablesError> {
        if self.risk_bands.is_empty() {
            return Err(AdvisorTablesError::Invalid(
                "at least one risk band is required".to_string(),
            ));
        }
        if let Some(band) = self.risk_bands.iter().find(|band| band.min > band.max) {
            return Err(AdvisorTablesError::Invalid(format!(
                "risk band {} has min {} above max {}",
                band.level, band.min, band.max
            )));
        }
        let scoring = &self.risk_scoring;
        if !(scoring.base.is_finite() && scoring.safety_coef.is_finite() && scoring.offset.is_finite())
        {
            return Err(AdvisorTablesError::Invalid(
                "risk scoring constants must be finite".to_string(),
            ));
        }
        if !(scoring.min_score.is_finite() && scoring.max_score.is_finite()) {
            return Err(AdvisorTablesError::Invalid(
                "risk score bounds must be finite".to_string(),
            ));
        }
        if scoring.min_score > scoring.max_score {
            return Err(AdvisorTablesError::Invalid(format!(
                "risk score clamp {}..{} is inverted",
                scoring.min_score, scoring.max_score
            )));
        }
        Ok(())
    }
}

/// Linear risk score: `base + avg_equity - safety_coef * avg_safety + offset`, clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskScoringConfig {
    pub base: f64,
    pub safety_coef: f64,
    pub offset: f64,
    pub min_score: f64,
    pub max_score: f64,
}

impl Default for RiskScoringConfig {
    fn default() -> Self {
        Self {
            base: 55.0,
            safety_coef: 0.30,
            offset: 5.0,
            min_score: 10.0,
            max_score: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    pub level: RiskLevel,
    pub min: u8,
    pub max: u8,
    pub description: String,
    pub context: String,
}

fn default_risk_bands() -> Vec<RiskBand> {
    vec![
        RiskBand {
            level: RiskLevel::Conservative,
            min: 0,
            max: 39,
            description: "Low risk appetite with focus on stability".to_string(),
            context: "Suitable for short-term needs and capital protection".to_string(),
        },
        RiskBand {
            level: RiskLevel::Moderate,
            min: 40,
            max: 69,
            description: "Balanced growth with some volatility tolerance".to_string(),
            context: "Suitable for medium-term investors".to_string(),
        },
        RiskBand {
            level: RiskLevel::Aggressive,
            min: 70,
            max: 100,
            description: "High growth focus with 15-20% volatility tolerance".to_string(),
            context: "Suitable for long-term investors comfortable with swings".to_string(),
        },
    ]
}

/// Market indices a historical scenario can report a drawdown for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarketIndex {
    #[serde(rename = "NIFTY")]
    Nifty,
    #[serde(rename = "S&P500")]
    Sp500,
    #[serde(rename = "NASDAQ")]
    Nasdaq,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Gold,
}

impl fmt::Display for MarketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketIndex::Nifty => "NIFTY",
            MarketIndex::Sp500 => "S&P500",
            MarketIndex::Nasdaq => "NASDAQ",
            MarketIndex::RealEstate => "Real Estate",
            MarketIndex::Gold => "Gold",
        };
        f.write_str(label)
    }
}

/// Historical drawdown scenario. Drawdowns are signed percentages (`-37.0` for a 37% fall).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    pub drawdowns: BTreeMap<MarketIndex, f64>,
    pub evidence: String,
    pub recovery: String,
}

fn scenario(
    name: &str,
    drawdowns: &[(MarketIndex, f64)],
    evidence: &str,
    recovery: &str,
) -> StressScenario {
    StressScenario {
        name: name.to_string(),
        drawdowns: drawdowns.iter().copied().collect(),
        evidence: evidence.to_string(),
        recovery: recovery.to_string(),
    }
}

fn default_stress_scenarios() -> Vec<StressScenario> {
    vec![
        scenario(
            "2008 Financial Crisis",
            &[(MarketIndex::Sp500, -37.0), (MarketIndex::Nifty, -52.0)],
            "2008-2009 global financial crisis",
            "3-4 years",
        ),
        scenario(
            "COVID Crash",
            &[(MarketIndex::Nifty, -38.0)],
            "March 2020 pandemic shock",
            "6-9 months",
        ),
        scenario(
            "Dotcom Bust",
            &[(MarketIndex::Nasdaq, -78.0)],
            "2000-2002 tech bubble burst",
            "15 years for NASDAQ",
        ),
        scenario(
            "2016 Demonetization",
            &[
                (MarketIndex::Nifty, -15.0),
                (MarketIndex::RealEstate, -35.0),
                (MarketIndex::Gold, -20.0),
            ],
            "November 2016 currency ban, cash crunch",
            "6-8 months",
        ),
    ]
}

/// Points deducted from the consistency score per triggered rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyPenalties {
    pub warning: u32,
    pub critical: u32,
}

impl Default for ConsistencyPenalties {
    fn default() -> Self {
        Self {
            warning: 15,
            critical: 15,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisorTablesError {
    #[error("failed to read advisor tables from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("advisor tables at {path:?} are not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("advisor tables rejected: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config: AdvisorConfig =
            serde_json::from_str(r#"{"risk_scoring": {"base": 45.0}}"#).expect("parse override");
        assert_eq!(config.risk_scoring.base, 45.0);
        assert_eq!(config.risk_scoring.safety_coef, 0.30);
        assert_eq!(config.risk_bands.len(), 3);
        assert_eq!(config.stress_scenarios.len(), 4);
        assert_eq!(config.consistency.critical, 15);
    }

    #[test]
    fn scenario_drawdowns_use_index_labels() {
        let raw = r#"{"stress_scenarios": [{
            "name": "Custom", "drawdowns": {"NIFTY": -10.0, "Real Estate": -5.0},
            "evidence": "test", "recovery": "1 year"
        }]}"#;
        let config: AdvisorConfig = serde_json::from_str(raw).expect("parse scenarios");
        let drawdowns = &config.stress_scenarios[0].drawdowns;
        assert_eq!(drawdowns.get(&MarketIndex::Nifty), Some(&-10.0));
        assert_eq!(drawdowns.get(&MarketIndex::RealEstate), Some(&-5.0));
    }

    #[test]
    fn validate_rejects_inverted_band() {
        let mut config = AdvisorConfig::default();
        config.risk_bands[0].min = 50;
        let error = config.validate().expect_err("inverted band");
        assert!(error.to_string().contains("Conservative"));
    }

    #[test]
    fn validate_rejects_unusable_score_bounds() {
        let mut config = AdvisorConfig::default();
        config.risk_scoring.min_score = f64::NAN;
        let error = config.validate().expect_err("nan bound");
        assert!(error.to_string().contains("finite"));

        let mut config = AdvisorConfig::default();
        config.risk_scoring.min_score = 95.0;
        config.risk_scoring.max_score = 5.0;
        let error = config.validate().expect_err("inverted bounds");
        assert!(error.to_string().contains("inverted"));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let error = AdvisorConfig::from_json_file("/nonexistent/advisor-tables.json")
            .expect_err("missing file");
        assert!(matches!(error, AdvisorTablesError::Read { .. }));
    }
}
