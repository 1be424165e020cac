//! Response envelopes returned by the boundary layer.
//!
//! Every envelope carries a `status` marker so a caller can always tell a
//! degraded payload from a failed request without inspecting the body.

use serde::{Deserialize, Serialize};

use crate::models::{EnrichedRecord, SummaryStatistics};

/// Outcome marker on every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Envelope for `/dashboard/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub status: ResponseStatus,
    pub data: Vec<EnrichedRecord>,
}

impl MetricsResponse {
    /// Wraps enriched records in a success envelope
    pub fn success(data: Vec<EnrichedRecord>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data,
        }
    }
}

/// Envelope for `/dashboard/alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsResponse {
    pub status: ResponseStatus,
    pub count: usize,
    pub alerts: Vec<EnrichedRecord>,
}

impl AlertsResponse {
    /// Wraps anomalous records in a success envelope
    pub fn success(alerts: Vec<EnrichedRecord>) -> Self {
        Self {
            status: ResponseStatus::Success,
            count: alerts.len(),
            alerts,
        }
    }
}

/// Envelope for `/dashboard/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub status: ResponseStatus,
    pub summary: SummaryStatistics,
}

impl SummaryResponse {
    /// Wraps summary statistics in a success envelope
    pub fn success(summary: SummaryStatistics) -> Self {
        Self {
            status: ResponseStatus::Success,
            summary,
        }
    }
}

/// Envelope for failures. Carries a generic message, never internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
}

/// Message used when an internal failure reaches the boundary
pub const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

impl ErrorResponse {
    /// Creates an error envelope with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }

    /// Creates an error envelope with the generic message
    pub fn generic() -> Self {
        Self::new(GENERIC_ERROR_MESSAGE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metrics_response_shape() {
        let json = serde_json::to_value(MetricsResponse::success(vec![])).unwrap();
        assert_eq!(json, json!({"status": "success", "data": []}));
    }

    #[test]
    fn test_alerts_response_counts() {
        let response = AlertsResponse::success(vec![]);
        assert_eq!(response.count, 0);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], json!("success"));
        assert_eq!(json["count"], json!(0));
        assert_eq!(json["alerts"], json!([]));
    }

    #[test]
    fn test_summary_response_shape() {
        let json =
            serde_json::to_value(SummaryResponse::success(SummaryStatistics::default())).unwrap();
        assert_eq!(json["status"], json!("success"));
        assert_eq!(json["summary"]["total_value"], json!(0.0));
        assert_eq!(json["summary"]["top_consumer_block"], json!("N/A"));
        assert_eq!(json["summary"]["high_anomalies"], json!(0));
    }

    #[test]
    fn test_error_response_is_generic() {
        let json = serde_json::to_value(ErrorResponse::generic()).unwrap();
        assert_eq!(
            json,
            json!({"status": "error", "message": "Internal Server Error"})
        );
    }
}
