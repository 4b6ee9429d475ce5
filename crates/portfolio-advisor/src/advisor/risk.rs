use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::RiskBand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Conservative => "Conservative",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Band an investor's score landed in, with the copy shown to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub level: RiskLevel,
    pub score: f64,
    pub band_min: u8,
    pub band_max: u8,
    pub description: String,
    pub context: String,
}

/// Map a score onto the configured bands. The score is floored before lookup so fractional
/// scores between two integer bands land in the lower one; scores outside every band (or not
/// finite) resolve to Moderate.
pub fn classify(score: f64, bands: &[RiskBand]) -> RiskProfile {
    let bucket = score.floor();
    let matched = bands
        .iter()
        .find(|band| score.is_finite() && bucket >= band.min as f64 && bucket <= band.max as f64);

    match matched {
        Some(band) => profile_from(band, score),
        None => {
            let fallback_score = if score.is_finite() { score } else { 50.0 };
            match bands.iter().find(|band| band.level == RiskLevel::Moderate) {
                Some(band) => profile_from(band, fallback_score),
                None => RiskProfile {
                    level: RiskLevel::Moderate,
                    score: fallback_score,
                    band_min: 40,
                    band_max: 69,
                    description: "Balanced growth with some volatility tolerance".to_string(),
                    context: "Suitable for medium-term investors".to_string(),
                },
            }
        }
    }
}

fn profile_from(band: &RiskBand, score: f64) -> RiskProfile {
    RiskProfile {
        level: band.level,
        score,
        band_min: band.min,
        band_max: band.max,
        description: band.description.clone(),
        context: band.context.clone(),
    }
}
