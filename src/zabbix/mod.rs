//! Remote directory client for the Zabbix JSON-RPC API
//!
//! Exposes the three operations the watcher needs: list media types, re-enable
//! a media type, and list user groups with their members.

pub mod rpc;

use crate::constants::API_ENDPOINT;
use crate::models::{ChannelStatus, MediaChannel, Result, UserGroup, WatchError};
use async_trait::async_trait;
use log::{debug, info};
use rpc::{decode_response, RpcRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Operations the watcher performs against the monitoring platform
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// List media channels whose name is in `names` (all channels when empty)
    async fn list_channels(&self, names: &[String]) -> Result<Vec<MediaChannel>>;

    /// Set a media channel's status to enabled
    async fn enable_channel(&self, channel_id: &str) -> Result<()>;

    /// List user groups with their member ids
    async fn list_groups(&self) -> Result<Vec<UserGroup>>;
}

/// HTTP client for a Zabbix server
#[derive(Debug, Clone)]
pub struct ZabbixClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ZabbixClient {
    /// `base_url` is the frontend root, e.g. `https://zabbix.example.com`
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), API_ENDPOINT),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<P, T>(&self, method: &str, params: P, id: u32) -> Result<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned + Default,
    {
        let request = RpcRequest::new(method, params, &self.token, id);
        let transport = |source| WatchError::Transport {
            method: method.to_string(),
            source,
        };

        debug!("Calling {} at {}", method, self.endpoint);
        let body = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)?;

        decode_response(method, &body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct UpdateResult {
    #[serde(default, rename = "mediatypeids")]
    _ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RemoteGroup {
    usrgrpid: String,
    name: String,
    #[serde(default)]
    users: Vec<RemoteUser>,
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    userid: String,
}

impl From<RemoteGroup> for UserGroup {
    fn from(group: RemoteGroup) -> Self {
        UserGroup {
            id: group.usrgrpid,
            name: group.name,
            members: group.users.into_iter().map(|u| u.userid).collect(),
        }
    }
}

pub(crate) fn media_get_params(names: &[String]) -> serde_json::Value {
    let mut params = json!({ "output": ["mediatypeid", "name", "status"] });
    if !names.is_empty() {
        params["filter"] = json!({ "name": names });
    }
    params
}

#[async_trait]
impl DirectoryClient for ZabbixClient {
    async fn list_channels(&self, names: &[String]) -> Result<Vec<MediaChannel>> {
        let channels: Vec<MediaChannel> = self
            .call("mediatype.get", media_get_params(names), 1)
            .await?;
        info!("Received {} media types", channels.len());
        Ok(channels)
    }

    async fn enable_channel(&self, channel_id: &str) -> Result<()> {
        let params = json!({
            "mediatypeid": channel_id,
            "status": ChannelStatus::Enabled.as_wire(),
        });
        let _: UpdateResult = self.call("mediatype.update", params, 2).await?;
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<UserGroup>> {
        let params = json!({
            "output": ["usrgrpid", "name"],
            "selectUsers": "extend",
        });
        let groups: Vec<RemoteGroup> = self.call("usergroup.get", params, 10).await?;
        info!("Received {} user groups", groups.len());
        Ok(groups.into_iter().map(UserGroup::from).collect())
    }
}
