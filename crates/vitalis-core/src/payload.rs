//! Outbound report payload.
//!
//! A sparse `{ "hr"?, "rr"? }` map. Fields are independently optional and,
//! when present, always finite.

use serde::{Deserialize, Serialize};

/// Sparse per-tick vitals report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Heart rate in beats/minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr: Option<f32>,
    /// Respiration rate in breaths/minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rr: Option<f32>,
}

impl ReportPayload {
    /// Build a payload, dropping any non-finite field.
    pub fn from_parts(hr: Option<f32>, rr: Option<f32>) -> Self {
        Self {
            hr: hr.filter(|v| v.is_finite()),
            rr: rr.filter(|v| v.is_finite()),
        }
    }

    /// An empty payload is never emitted.
    pub fn is_empty(&self) -> bool {
        self.hr.is_none() && self.rr.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let payload = ReportPayload::from_parts(Some(72.0), None);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"hr":72.0}"#);

        let payload = ReportPayload::from_parts(None, Some(18.0));
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"rr":18.0}"#);
    }

    #[test]
    fn non_finite_fields_are_dropped() {
        let payload = ReportPayload::from_parts(Some(f32::NAN), Some(f32::INFINITY));
        assert!(payload.is_empty());
    }

    #[test]
    fn both_fields_serialize() {
        let payload = ReportPayload::from_parts(Some(72.0), Some(18.0));
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"hr":72.0,"rr":18.0}"#);
    }
}
