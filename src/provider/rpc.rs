use std::{
    fs,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    configuration::Config,
    error::Error,
    types::{BlockHeader, RpcRequest, RpcResponse, StakingInfo},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Node calls the collector depends on.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn get_staking_info(&self, wallet: &str) -> Result<StakingInfo, Error>;

    async fn get_block_header(&self, hash: &str) -> Result<BlockHeader, Error>;
}

#[derive(Debug)]
pub struct ParticlRpc {
    client: reqwest::Client,
    url: Url,
    user: String,
    password: String,
    id: AtomicU64,
}

impl ParticlRpc {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let cookie_path = config.cookie_path();
        let cookie = fs::read_to_string(&cookie_path).map_err(|e| {
            Error::ConfigurationError(format!(
                "cannot read rpc cookie {}: {}",
                cookie_path.display(),
                e
            ))
        })?;
        let (user, password) = parse_cookie(&cookie)?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(ParticlRpc {
            client,
            url: config.rpc_url()?,
            user,
            password,
            id: AtomicU64::new(1),
        })
    }

    fn wallet_url(&self, wallet: &str) -> Result<Url, Error> {
        if wallet.is_empty() {
            return Ok(self.url.clone());
        }

        let url = self.url.join(&format!("wallet/{}", wallet))?;
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        url: Url,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, Error> {
        let request = RpcRequest {
            jsonrpc: "1.0",
            id: self.id.fetch_add(1, Ordering::SeqCst),
            method,
            params,
        };

        debug!("RPC {} -> {}", method, url);

        // The node answers failed calls with HTTP 500 and an error body,
        // so the body is decoded regardless of status.
        let response = self
            .client
            .post(url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request)
            .send()
            .await
            .map_err(|e| rpc_error(method, e))?;

        let status = response.status();
        let body = response
            .json::<RpcResponse<T>>()
            .await
            .map_err(|e| rpc_error(method, format!("HTTP {}: {}", status, e)))?;

        if let Some(error) = body.error {
            return Err(rpc_error(
                method,
                format!("code {}: {}", error.code, error.message),
            ));
        }

        body.result
            .ok_or_else(|| rpc_error(method, "empty result"))
    }
}

#[async_trait]
impl NodeRpc for ParticlRpc {
    async fn get_staking_info(&self, wallet: &str) -> Result<StakingInfo, Error> {
        let url = self.wallet_url(wallet)?;
        self.call(url, "getstakinginfo", vec![]).await
    }

    async fn get_block_header(&self, hash: &str) -> Result<BlockHeader, Error> {
        self.call(
            self.url.clone(),
            "getblockheader",
            vec![Value::from(hash)],
        )
        .await
    }
}

fn rpc_error(method: &str, cause: impl std::fmt::Display) -> Error {
    Error::InputFetchError(format!("RPC {} failed: {}", method, cause))
}

fn parse_cookie(cookie: &str) -> Result<(String, String), Error> {
    match cookie.trim().split_once(':') {
        Some((user, password)) if !user.is_empty() => {
            Ok((user.to_owned(), password.to_owned()))
        },
        _ => Err(Error::ConfigurationError(String::from(
            "rpc cookie is not in user:password form",
        ))),
    }
}
