// Smart price-drop alerts
use crate::analyzer::PricePoint;
use crate::model::AlertError;
use crate::utils::format_price;
use serde::{Deserialize, Serialize};

/// Default fixed target: ten percent under the current price.
pub const DEFAULT_FIXED_RATIO: f64 = 0.9;
pub const DEFAULT_PERCENT: f64 = 20.0;
pub const DEFAULT_TREND_DAYS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Fixed,
    Percentage,
    Trend,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Fixed => "fixed",
            AlertKind::Percentage => "percentage",
            AlertKind::Trend => "trend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Target price, percent drop or number of days depending on `kind`.
    pub value: f64,
}

impl AlertConfig {
    pub fn new(kind: AlertKind, value: f64) -> Result<Self, AlertError> {
        let config = Self { kind, value };
        config.validate()?;
        Ok(config)
    }

    pub fn default_for(kind: AlertKind, current_price: f64) -> Self {
        let value = match kind {
            AlertKind::Fixed => current_price * DEFAULT_FIXED_RATIO,
            AlertKind::Percentage => DEFAULT_PERCENT,
            AlertKind::Trend => DEFAULT_TREND_DAYS,
        };
        Self { kind, value }
    }

    /// Restores the alert a tracked listing already carries, if any.
    pub fn from_threshold(
        has_alert: bool,
        threshold: Option<f64>,
        current_price: f64,
    ) -> Option<Self> {
        if !has_alert {
            return None;
        }
        let value = threshold.unwrap_or(current_price * DEFAULT_FIXED_RATIO);
        Some(Self {
            kind: AlertKind::Fixed,
            value,
        })
    }

    pub fn validate(&self) -> Result<(), AlertError> {
        let ok = self.value.is_finite()
            && self.value > 0.0
            && match self.kind {
                AlertKind::Fixed => true,
                AlertKind::Percentage => self.value <= 100.0,
                AlertKind::Trend => self.value.fract() == 0.0,
            };
        if ok {
            Ok(())
        } else {
            Err(AlertError::InvalidValue {
                kind: self.kind.as_str(),
                value: self.value,
            })
        }
    }

    pub fn description(&self) -> String {
        match self.kind {
            AlertKind::Fixed => {
                format!("Alert when price drops to {} or below", format_price(self.value))
            }
            AlertKind::Percentage => format!(
                "Alert when price drops by {}% or more from current price",
                self.value
            ),
            AlertKind::Trend => format!(
                "Alert when price reaches lowest point in last {} days",
                self.value
            ),
        }
    }

    /// The price-alert endpoint only understands absolute targets; other
    /// kinds are registered with a zero target and evaluated client-side.
    pub fn target_price(&self) -> f64 {
        match self.kind {
            AlertKind::Fixed => self.value,
            AlertKind::Percentage | AlertKind::Trend => 0.0,
        }
    }

    /// `reference_price` is the price the alert was set against; `history`
    /// is ordered oldest first.
    pub fn is_triggered(
        &self,
        reference_price: f64,
        current_price: f64,
        history: &[PricePoint],
    ) -> bool {
        match self.kind {
            AlertKind::Fixed => current_price <= self.value,
            AlertKind::Percentage => {
                if reference_price <= 0.0 {
                    return false;
                }
                let drop = (reference_price - current_price) / reference_price * 100.0;
                drop >= self.value
            }
            AlertKind::Trend => {
                let days = self.value.max(0.0) as usize;
                let window = &history[history.len().saturating_sub(days)..];
                window
                    .iter()
                    .map(|p| p.price)
                    .reduce(f64::min)
                    .is_some_and(|low| current_price <= low)
            }
        }
    }
}
