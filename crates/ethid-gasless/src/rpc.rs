//! Minimal JSON-RPC plumbing shared by the paymaster and bundler clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Serialize)]
struct JsonRpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

// `result` stays a raw value so that a JSON `null` (e.g. a receipt that is
// not available yet) deserializes into `Option::None` rather than reading as
// a missing field.
#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<JsonRpcErrorObject>,
}

/// Error object returned by a JSON-RPC endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Outcome of one JSON-RPC call: transport failures and endpoint-reported
/// errors are distinct because they classify differently.
#[derive(Debug)]
pub(crate) enum RpcCallError {
    Transport(String),
    Endpoint(JsonRpcErrorObject),
}

pub(crate) async fn call<P: Serialize, R: DeserializeOwned>(
    http: &reqwest::Client,
    endpoint: &Url,
    method: &str,
    params: P,
) -> Result<R, RpcCallError> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method,
        params,
    };

    let response = http
        .post(endpoint.clone())
        .json(&request)
        .send()
        .await
        .map_err(|e| RpcCallError::Transport(e.to_string()))?;

    let body: JsonRpcResponse = response
        .json()
        .await
        .map_err(|e| RpcCallError::Transport(format!("malformed response: {}", e)))?;

    if let Some(error) = body.error {
        return Err(RpcCallError::Endpoint(error));
    }
    serde_json::from_value(body.result)
        .map_err(|e| RpcCallError::Transport(format!("malformed result: {}", e)))
}
