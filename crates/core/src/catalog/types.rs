//! Disease record types as found in the catalog data file.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Species
// ============================================================================

/// Species a diagnosis is run for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Dog,
    Cat,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dog" => Ok(Species::Dog),
            "cat" => Ok(Species::Cat),
            other => Err(format!("Unknown species: {}", other)),
        }
    }
}

/// Species a catalog record applies to.
///
/// `Both` and `Unspecified` admit every query species. Any other label
/// only admits a query species spelled the same way, which in practice
/// means it never matches a dog or cat query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SpeciesScope {
    Dog,
    Cat,
    Both,
    #[default]
    Unspecified,
    Other(String),
}

impl SpeciesScope {
    /// Parse the catalog label, case-insensitively. Empty means unspecified.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "" => SpeciesScope::Unspecified,
            "dog" => SpeciesScope::Dog,
            "cat" => SpeciesScope::Cat,
            "both" => SpeciesScope::Both,
            _ => SpeciesScope::Other(trimmed.to_string()),
        }
    }

    /// Whether a record with this scope is considered for `species`.
    pub fn admits(&self, species: Species) -> bool {
        match self {
            SpeciesScope::Both | SpeciesScope::Unspecified => true,
            SpeciesScope::Dog => species == Species::Dog,
            SpeciesScope::Cat => species == Species::Cat,
            SpeciesScope::Other(_) => false,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SpeciesScope::Dog => "Dog",
            SpeciesScope::Cat => "Cat",
            SpeciesScope::Both => "Both",
            SpeciesScope::Unspecified => "",
            SpeciesScope::Other(label) => label,
        }
    }
}

impl Serialize for SpeciesScope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for SpeciesScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label: Option<String> = Option::deserialize(deserializer)?;
        Ok(label
            .map(|l| SpeciesScope::parse(&l))
            .unwrap_or(SpeciesScope::Unspecified))
    }
}

// ============================================================================
// Severity
// ============================================================================

/// Severity shown next to a disease, derived from its 0-10 score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

/// Score used for display when a record carries none.
pub const DEFAULT_SEVERITY_SCORE: u8 = 5;

impl Severity {
    pub fn from_score(score: u8) -> Self {
        if score >= 8 {
            Severity::Severe
        } else if score >= 5 {
            Severity::Moderate
        } else {
            Severity::Mild
        }
    }
}

// ============================================================================
// Disease record
// ============================================================================

/// Diet guidance attached to a disease. Opaque to the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NutritionAdvice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_vi: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should_eat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoid: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_nutrients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_suggestion_vi: Option<String>,
}

/// One condition in the catalog.
///
/// Only `species`, `symptom_keywords`, `severity_score` and `needs_image`
/// drive the engine; the rest is carried through for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "disease_name")]
    pub name: String,
    #[serde(
        rename = "disease_name_vi",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub localized_name: Option<String>,
    #[serde(default)]
    pub species: SpeciesScope,
    /// Duplicates are kept; each occurrence scores on its own.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symptom_keywords: Vec<String>,
    /// 0-10, missing treated as 0. Fractions round, numeric strings parse,
    /// anything out of range clamps and anything else is the default.
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity_score: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_image: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(
        rename = "summary_vi",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_advice: Option<NutritionAdvice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub common_breeds: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<serde_json::Value>,
}

impl DiseaseRecord {
    /// Localized name when present, English name otherwise.
    pub fn display_name(&self) -> &str {
        self.localized_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }

    /// Severity badge, falling back to a moderate score when unset.
    pub fn severity(&self) -> Severity {
        let score = if self.severity_score == 0 {
            DEFAULT_SEVERITY_SCORE
        } else {
            self.severity_score
        };
        Severity::from_score(score)
    }

    /// Expected image kind for visual confirmation.
    pub fn expected_image_type(&self) -> &str {
        self.image_type.as_deref().unwrap_or("Photo")
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_severity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match &value {
        serde_json::Value::Null => return Ok(0),
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(match score {
        Some(score) if score.is_finite() => score.round().clamp(0.0, 10.0) as u8,
        _ => DEFAULT_SEVERITY_SCORE,
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
