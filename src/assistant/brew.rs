//! Brewing parameters reported by the user for diagnosis.

use crate::error::{GuaxinimError, Result};
use serde::{Deserialize, Serialize};

/// Brewing methods offered for guides.
pub const BREWING_METHODS: &[&str] = &[
    "V60",
    "French Press",
    "Espresso",
    "Aeropress",
    "Cold Brew",
    "Moka Pot",
    "Chemex",
];

/// A brew that didn't come out right, with whatever parameters the user knows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrewReport {
    /// What went wrong, e.g. "too bitter".
    pub issue: String,
    pub brewing_method: String,
    /// Grams of coffee.
    pub coffee_grams: Option<f32>,
    /// Millilitres of water.
    pub water_ml: Option<f32>,
    pub bean: Option<String>,
    /// Total extraction time in seconds.
    pub extraction_seconds: Option<u32>,
    /// Water temperature in Celsius.
    pub water_temperature: Option<f32>,
    pub grind: Option<String>,
    pub bloom_seconds: Option<u32>,
    pub pours: Option<u32>,
    /// Millilitres per pour.
    pub pour_ml: Option<f32>,
    pub notes: Option<String>,
}

impl BrewReport {
    pub fn new(issue: impl Into<String>, brewing_method: impl Into<String>) -> Self {
        Self {
            issue: issue.into(),
            brewing_method: brewing_method.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.issue.trim().is_empty() {
            return Err(GuaxinimError::InvalidInput("Describe the issue with the brew".to_string()));
        }
        if self.brewing_method.trim().is_empty() {
            return Err(GuaxinimError::InvalidInput("Brewing method is required".to_string()));
        }
        Ok(())
    }

    /// One line per supplied parameter. Unset and zero values are left out.
    pub fn parameters(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Issue: {}", self.issue),
            format!("Brewing method: {}", self.brewing_method),
        ];

        let positive = |v: Option<f32>| v.filter(|v| *v > 0.0);
        let nonzero = |v: Option<u32>| v.filter(|v| *v > 0);
        fn text(v: &Option<String>) -> Option<&str> {
            v.as_deref().map(str::trim).filter(|s| !s.is_empty())
        }

        if let Some(v) = positive(self.coffee_grams) {
            lines.push(format!("Coffee amount: {}g", v));
        }
        if let Some(v) = positive(self.water_ml) {
            lines.push(format!("Water amount: {}ml", v));
        }
        if let Some(v) = text(&self.bean) {
            lines.push(format!("Bean type: {}", v));
        }
        if let Some(v) = nonzero(self.extraction_seconds) {
            lines.push(format!("Extraction time: {}s", v));
        }
        if let Some(v) = positive(self.water_temperature) {
            lines.push(format!("Water temp: {}°C", v));
        }
        if let Some(v) = text(&self.grind) {
            lines.push(format!("Grind size: {}", v));
        }
        if let Some(v) = nonzero(self.bloom_seconds) {
            lines.push(format!("Bloom time: {}s", v));
        }
        if let Some(v) = nonzero(self.pours) {
            lines.push(format!("Number of pours: {}", v));
        }
        if let Some(v) = positive(self.pour_ml) {
            lines.push(format!("Amount per pour: {}ml", v));
        }
        if let Some(v) = text(&self.notes) {
            lines.push(format!("Additional notes: {}", v));
        }

        lines
    }
}
