//! Custom resource response document and its delivery to CloudFormation.

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LinkError;
use crate::event::LifecycleEvent;
use crate::orchestrator::{Invocation, Outputs};

/// Response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    /// The resource operation succeeded.
    Success,
    /// The resource operation failed.
    Failed,
}

/// Document PUT to the event's `ResponseURL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    /// Success or failure.
    pub status: ResponseStatus,
    /// Error text, or where to find the logs.
    pub reason: String,
    /// Physical id of the resource.
    pub physical_resource_id: String,
    /// Echoed from the request.
    pub stack_id: String,
    /// Echoed from the request.
    pub request_id: String,
    /// Echoed from the request.
    pub logical_resource_id: String,
    /// Never masks outputs.
    pub no_echo: bool,
    /// Outputs; omitted on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Outputs>,
}

impl CustomResourceResponse {
    /// Build the response for `invocation` of `event`.
    pub fn new(event: &LifecycleEvent, invocation: &Invocation, log_hint: &str) -> Self {
        let (status, reason, data) = match &invocation.outcome {
            Ok(outputs) => (
                ResponseStatus::Success,
                format!("See details in {log_hint}"),
                Some(outputs.clone()),
            ),
            Err(e) => (ResponseStatus::Failed, e.to_string(), None),
        };
        Self {
            status,
            reason,
            physical_resource_id: invocation.physical_resource_id.clone(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

/// PUT `response` to the pre-signed `url`.
///
/// The pre-signed URL is signed with an empty content type, so none is sent.
pub async fn send(
    client: &reqwest::Client,
    url: &str,
    response: &CustomResourceResponse,
) -> Result<(), LinkError> {
    let body = serde_json::to_vec(response).map_err(|e| LinkError::Response(e.to_string()))?;
    let reply = client
        .put(url)
        .header(CONTENT_TYPE, "")
        .body(body)
        .send()
        .await
        .map_err(|e| LinkError::Response(e.to_string()))?;

    let status = reply.status();
    if !status.is_success() {
        return Err(LinkError::Response(format!("response URL returned {status}")));
    }
    info!(%status, "sent custom resource response");
    Ok(())
}
