//! Admission review wire types.
//!
//! The subset of the `admission.k8s.io/v1` review envelope the webhook
//! reads and writes. The embedded object stays raw JSON until the
//! interceptor decodes it, so an envelope with a broken Ingress inside
//! still parses and gets a well-formed rejection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const API_VERSION: &str = "admission.k8s.io/v1";
pub const KIND: &str = "AdmissionReview";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

impl AdmissionReview {
    /// Envelope carrying a request, as the API server sends it.
    pub fn request(request: AdmissionRequest) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            request: Some(request),
            response: None,
        }
    }

    /// Envelope carrying a response, as the webhook answers.
    pub fn response(response: AdmissionResponse) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            request: None,
            response: Some(response),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    #[serde(default)]
    pub uid: String,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub name: String,

    /// The object under review, left undecoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    #[serde(default)]
    pub uid: String,

    #[serde(default)]
    pub allowed: bool,

    // The upstream field is named `result` but serialized as `status`.
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ReviewStatus>,
}

impl AdmissionResponse {
    /// An allowing response with the given reason.
    pub fn allowed(uid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            allowed: true,
            result: Some(ReviewStatus {
                code: Some(200),
                message: String::new(),
                reason: reason.into(),
            }),
        }
    }

    /// A denying response carrying an error code and message.
    pub fn errored(uid: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            allowed: false,
            result: Some(ReviewStatus { code: Some(code), message: message.into(), reason: String::new() }),
        }
    }

    /// The reason string of an allowing response, when present.
    pub fn reason(&self) -> Option<&str> {
        self.result.as_ref().map(|status| status.reason.as_str())
    }

    /// The message string of a denying response, when present.
    pub fn message(&self) -> Option<&str> {
        self.result.as_ref().map(|status| status.message.as_str())
    }
}

/// Subset of the upstream `Status` type carried in responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_api_server_request_envelope() {
        let raw = serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "namespace": "target",
                "name": "example-io",
                "object": {"metadata": {"namespace": "target", "name": "example-io"}}
            }
        });

        let review: AdmissionReview = serde_json::from_value(raw).unwrap();
        let request = review.request.unwrap();
        assert_eq!(request.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
        assert_eq!(request.namespace, "target");
        assert!(request.object.is_some());
    }

    #[test]
    fn test_response_serializes_result_under_status_key() {
        let review =
            AdmissionReview::response(AdmissionResponse::allowed("uid-1", "No new Secrets created"));
        let value = serde_json::to_value(&review).unwrap();

        assert_eq!(value["apiVersion"], "admission.k8s.io/v1");
        assert_eq!(value["kind"], "AdmissionReview");
        assert_eq!(value["response"]["uid"], "uid-1");
        assert_eq!(value["response"]["allowed"], true);
        assert_eq!(value["response"]["status"]["reason"], "No new Secrets created");
        assert_eq!(value["response"]["status"]["code"], 200);
        assert!(value["response"]["status"].get("message").is_none());
    }

    #[test]
    fn test_errored_response_carries_code_and_message() {
        let response = AdmissionResponse::errored("uid-2", 400, "failed to decode");
        assert!(!response.allowed);
        assert_eq!(response.result.as_ref().unwrap().code, Some(400));
        assert_eq!(response.message(), Some("failed to decode"));
    }
}
