//! Volcanic alert levels from `volcano/val`.

use super::{non_empty_trimmed, FeatureCollection, FeatureId};
use serde::{Deserialize, Deserializer, Serialize};

/// Current alert for one volcano.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolcanoAlert {
    /// Identifier such as `ruapehu` or `whiteisland`.
    #[serde(rename = "volcanoID", deserialize_with = "non_empty_trimmed")]
    pub volcano_id: String,
    /// Display name.
    #[serde(rename = "volcanoTitle")]
    pub volcano_title: String,
    /// Volcanic Alert Level, 0 (no unrest) to 5 (major eruption).
    #[serde(deserialize_with = "alert_level")]
    pub level: u8,
    /// Aviation colour code.
    pub acc: String,
    /// Description of current activity.
    pub activity: String,
    /// Hazards associated with the current level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hazards: Option<String>,
}

impl FeatureId for VolcanoAlert {
    fn feature_id(&self) -> &str {
        &self.volcano_id
    }
}

/// Alerts for every monitored volcano.
pub type VolcanoAlerts = FeatureCollection<VolcanoAlert>;

impl FeatureCollection<VolcanoAlert> {
    /// Keeps the alert for `volcano_id`, compared case-insensitively.
    pub fn for_volcano(&self, volcano_id: &str) -> Self {
        self.filter(|feature| feature.properties.volcano_id.eq_ignore_ascii_case(volcano_id))
    }

    /// Keeps volcanoes at or above `level`.
    pub fn at_least(&self, level: u8) -> Self {
        self.filter(|feature| feature.properties.level >= level)
    }
}

fn alert_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let level = u8::deserialize(deserializer)?;
    if level > 5 {
        return Err(serde::de::Error::custom(format!(
            "volcanic alert level {level} is outside 0..=5"
        )));
    }
    Ok(level)
}
