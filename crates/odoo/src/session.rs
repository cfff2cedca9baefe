//! Lazily authenticated ERP session.
//!
//! The uid is obtained on first use and then shared by every request. The
//! first-use authentication is single-flight: concurrent callers wait on the
//! same in-flight `authenticate` instead of each starting their own. A failed
//! attempt leaves the session unauthenticated, so the next request tries again.

use std::collections::BTreeMap;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use brujula_core::ErpUid;

use crate::client::{OdooClient, RpcError};
use crate::xmlrpc::Value;

#[derive(Debug)]
pub struct OdooSession {
    client: OdooClient,
    uid: OnceCell<ErpUid>,
}

impl OdooSession {
    pub fn new(client: OdooClient) -> Self {
        Self {
            client,
            uid: OnceCell::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.uid.initialized()
    }

    /// The cached uid, authenticating first if needed.
    pub async fn uid(&self) -> Result<ErpUid, RpcError> {
        self.uid
            .get_or_try_init(|| async {
                match self.client.authenticate().await {
                    Ok(uid) => {
                        info!(%uid, "authenticated against ERP");
                        Ok(uid)
                    }
                    Err(e) => {
                        warn!(error = %e, "ERP authentication failed");
                        Err(e)
                    }
                }
            })
            .await
            .copied()
    }

    /// `execute_kw` with the session uid.
    pub async fn execute(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: BTreeMap<String, Value>,
    ) -> Result<Value, RpcError> {
        let uid = self.uid().await?;
        self.client.execute_kw(uid, model, method, args, kwargs).await
    }
}
