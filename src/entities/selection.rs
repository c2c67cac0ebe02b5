//! Selection requirement - one engineered valve/actuator need

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// One engineered selection: the valve/actuator need at a single tag position
/// and the model chosen to satisfy it. Produced by the engineering step and
/// frozen into a technical version snapshot on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequirement {
    /// Unique identifier
    pub id: EntityId,

    /// Tag identifier, unique within the project (e.g. "V-101")
    pub tag: String,

    /// Torque the application requires (N·m)
    pub required_torque: f64,

    /// Selected model identifier
    pub model: String,

    /// Product series of the selected model
    pub series: String,

    /// Action type (e.g. double_acting, spring_return)
    pub action_type: String,

    /// Mechanism type, if constrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,

    /// Temperature code, if constrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_code: Option<String>,

    /// Valve type, if constrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valve_type: Option<String>,

    /// Yoke type, if constrained
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yoke_type: Option<String>,

    /// Unit price of the selected model
    pub unit_price: f64,

    /// Torque the selected model actually delivers (N·m)
    pub actual_torque: f64,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Engineer who made the selection
    pub author: String,
}

impl SelectionRequirement {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tag: impl Into<String>,
        required_torque: f64,
        model: impl Into<String>,
        series: impl Into<String>,
        action_type: impl Into<String>,
        unit_price: f64,
        actual_torque: f64,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Sel),
            tag: tag.into(),
            required_torque,
            model: model.into(),
            series: series.into(),
            action_type: action_type.into(),
            mechanism: None,
            temperature_code: None,
            valve_type: None,
            yoke_type: None,
            unit_price,
            actual_torque,
            created: Utc::now(),
            author: author.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requirement() {
        let req = SelectionRequirement::new(
            "V-101",
            500.0,
            "SF10-DA",
            "SF",
            "double_acting",
            120.0,
            550.0,
            "jsmith",
        );
        assert!(req.id.to_string().starts_with("SEL-"));
        assert_eq!(req.tag, "V-101");
        assert_eq!(req.mechanism, None);
    }

    #[test]
    fn test_yaml_roundtrip_skips_absent_attributes() {
        let mut req = SelectionRequirement::new(
            "V-101",
            500.0,
            "SF10-DA",
            "SF",
            "double_acting",
            120.0,
            550.0,
            "jsmith",
        );
        req.temperature_code = Some("HT".to_string());

        let yaml = serde_yml::to_string(&req).unwrap();
        assert!(yaml.contains("temperature_code: HT"));
        assert!(!yaml.contains("valve_type"));

        let parsed: SelectionRequirement = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(req, parsed);
    }
}
