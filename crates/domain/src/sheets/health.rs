use serde::{Deserialize, Serialize};

/// Color band of the wound bar.
///
/// Bands follow the filled ratio of current wounds to the wound total, so a
/// nearly empty bar is `Good` and a full one is `Danger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    Good,
    Warning,
    Danger,
}

impl HealthBand {
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 25.0 {
            HealthBand::Good
        } else if percent <= 75.0 {
            HealthBand::Warning
        } else {
            HealthBand::Danger
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            HealthBand::Good => "health-good",
            HealthBand::Warning => "health-warning",
            HealthBand::Danger => "health-danger",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthBar {
    pub current: i32,
    pub max: i32,
    pub percent: f64,
    pub band: HealthBand,
}

impl HealthBar {
    pub fn new(current: i32, max: i32) -> Self {
        let percent = if max > 0 {
            (f64::from(current) / f64::from(max) * 100.0).min(100.0)
        } else {
            0.0
        };
        Self {
            current,
            max,
            percent,
            band: HealthBand::from_percent(percent),
        }
    }

    /// The "current / max" caption shown on the bar.
    pub fn label(&self) -> String {
        format!("{} / {}", self.current, self.max)
    }
}
