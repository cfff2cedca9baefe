//! XML-RPC transport to the two Odoo endpoints (`common` and `object`).

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;

use brujula_core::{ErpUid, HubError};

use crate::config::OdooConfig;
use crate::xmlrpc::{Value, XmlRpcError, decode_response, encode_call};

/// Failure talking to the ERP.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Http(u16),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Protocol(#[from] XmlRpcError),

    #[error("authentication rejected for user {0}")]
    AuthenticationRejected(String),

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl From<RpcError> for HubError {
    fn from(err: RpcError) -> Self {
        HubError::upstream(err.to_string())
    }
}

/// Stateless client; [`crate::OdooSession`] adds the cached uid on top.
#[derive(Debug, Clone)]
pub struct OdooClient {
    http: reqwest::Client,
    base_url: String,
    db: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl OdooClient {
    pub fn new(config: &OdooConfig) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            db: config.db.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout,
        })
    }

    /// `common.authenticate(db, user, password, {})`.
    ///
    /// Odoo answers `false` (not a fault) for bad credentials.
    pub async fn authenticate(&self) -> Result<ErpUid, RpcError> {
        let value = self
            .call(
                "common",
                "authenticate",
                vec![
                    Value::from(self.db.as_str()),
                    Value::from(self.username.as_str()),
                    Value::from(self.password.as_str()),
                    Value::empty_struct(),
                ],
            )
            .await?;

        match value {
            Value::Int(uid) if uid > 0 => Ok(ErpUid::new(uid)),
            Value::Bool(false) | Value::Int(_) => {
                Err(RpcError::AuthenticationRejected(self.username.clone()))
            }
            other => Err(RpcError::UnexpectedShape(format!(
                "authenticate returned {other:?}"
            ))),
        }
    }

    /// `object.execute_kw(db, uid, password, model, method, args, kwargs)`.
    pub async fn execute_kw(
        &self,
        uid: ErpUid,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: BTreeMap<String, Value>,
    ) -> Result<Value, RpcError> {
        self.call(
            "object",
            "execute_kw",
            vec![
                Value::from(self.db.as_str()),
                Value::Int(uid.get()),
                Value::from(self.password.as_str()),
                Value::from(model),
                Value::from(method),
                Value::Array(args),
                Value::Struct(kwargs),
            ],
        )
        .await
    }

    async fn call(&self, endpoint: &str, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let url = format!("{}/xmlrpc/2/{endpoint}", self.base_url);
        let body = encode_call(method, &params);
        debug!(%url, method, "xml-rpc call");

        tokio::time::timeout(self.timeout, self.post(&url, body))
            .await
            .map_err(|_| RpcError::Timeout(self.timeout))?
    }

    async fn post(&self, url: &str, body: String) -> Result<Value, RpcError> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(decode_response(&text)?)
    }
}
