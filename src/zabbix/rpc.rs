//! JSON-RPC 2.0 envelope used by the Zabbix API

use crate::models::{Result, WatchError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Outgoing request envelope
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub auth: &'a str,
    pub id: u32,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn new(method: &'a str, params: P, auth: &'a str, id: u32) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            auth,
            id,
        }
    }
}

/// Error object reported by the remote side. A zero code means "no error".
#[derive(Debug, Default, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: T,
    #[serde(default)]
    error: Option<RpcError>,
}

/// Decode a response body, surfacing remote-reported errors.
///
/// The HTTP status is not consulted: the platform reports failures inside the
/// envelope.
pub fn decode_response<T>(method: &str, body: &[u8]) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let response: RpcResponse<T> =
        serde_json::from_slice(body).map_err(|source| WatchError::MalformedResponse {
            method: method.to_string(),
            source,
        })?;

    match response.error {
        Some(err) if err.code != 0 => Err(WatchError::RemoteApi {
            code: err.code,
            message: err.message,
            data: err.data,
        }),
        _ => Ok(response.result),
    }
}
