//! Spoor event data model — the immutable description of one tracking event
//! handed to the transport.
//!
//! Optional fields are omitted from the serialized form when absent, so an
//! absent value and an empty string never look the same on the wire.

use serde::{Deserialize, Serialize};

use crate::error::SpoorResult;

/// Action/category pair used by page views and funnel steps.
pub const PAGE_VIEW_ACTION: &str = "view";
pub const PAGE_VIEW_CATEGORY: &str = "page";

/// One tracking event, produced by a parameter builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterSnapshot {
    pub action: String,
    pub category: String,
    pub context: Context,
    pub device: Device,
    pub user: User,
}

/// Where and how the event occurred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    /// Fresh identifier, unique per snapshot.
    pub id: String,
    pub product: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
    /// Canonical URL rebuilt against the configured application root.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel: Option<FunnelStepData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoor_session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ft_session: Option<String>,
}

/// A position within a multi-step conversion flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FunnelStepData {
    pub funnel_name: String,
    pub funnel_sequence: i32,
    pub step_name: String,
    pub step_sequence: i32,
}

impl FunnelStepData {
    pub fn new(
        funnel_name: impl Into<String>,
        funnel_sequence: i32,
        step_name: impl Into<String>,
        step_sequence: i32,
    ) -> Self {
        Self {
            funnel_name: funnel_name.into(),
            funnel_sequence,
            step_name: step_name.into(),
            step_sequence,
        }
    }
}

impl ParameterSnapshot {
    /// Serialize into the JSON document expected by the collector.
    pub fn to_json(&self) -> SpoorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether this snapshot describes a page view (including funnel steps).
    pub fn is_page_view(&self) -> bool {
        self.action == PAGE_VIEW_ACTION && self.category == PAGE_VIEW_CATEGORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> ParameterSnapshot {
        ParameterSnapshot {
            action: "view".into(),
            category: "page".into(),
            context: Context {
                id: "ctx-1".into(),
                product: "aProduct".into(),
                root_id: None,
                url: "https://approot.com/contextpath".into(),
                funnel: None,
            },
            device: Device::default(),
            user: User::default(),
        }
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let json = sample_snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["device"].get("spoor_id").is_none());
        assert!(value["device"].get("user_agent").is_none());
        assert!(value["user"].get("ft_session").is_none());
        assert!(value["context"].get("root_id").is_none());
        assert!(value["context"].get("funnel").is_none());
        assert_eq!(value["context"]["url"], "https://approot.com/contextpath");
    }

    #[test]
    fn test_empty_string_differs_from_absent() {
        let mut snapshot = sample_snapshot();
        snapshot.device.spoor_id = Some(String::new());

        let value: serde_json::Value =
            serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["device"]["spoor_id"], "");

        let parsed: ParameterSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.device.spoor_id, Some(String::new()));
        assert_eq!(parsed.device.spoor_session, None);
    }

    #[test]
    fn test_funnel_serde() {
        let mut snapshot = sample_snapshot();
        snapshot.context.funnel = Some(FunnelStepData::new("Funnel1", 1, "Step1", 2));

        let json = snapshot.to_json().unwrap();
        let parsed: ParameterSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
        assert!(parsed.is_page_view());
    }
}
