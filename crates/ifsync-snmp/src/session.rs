// ── Session trait and the async-snmp transport ──
//
// The engine only ever sees `SnmpSession`; the async-snmp client is
// confined to `UdpSession` so protocol types never cross into
// ifsync-core.

use std::net::IpAddr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::SnmpError;
use crate::oid::Oid;
use crate::value::SnmpValue;

// ── Session configuration ───────────────────────────────────────────

/// Per-node session parameters. Built once per run from the profile and
/// handed to the session factory for every candidate host.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: IpAddr,
    pub port: u16,
    pub community: SecretString,
    pub timeout: Duration,
    pub retries: u32,
}

impl SessionConfig {
    pub fn target(&self) -> String {
        match self.host {
            IpAddr::V4(v4) => format!("{}:{}", v4, self.port),
            IpAddr::V6(v6) => format!("[{}]:{}", v6, self.port),
        }
    }
}

// ── The session seam ────────────────────────────────────────────────

/// What the engine needs from an SNMP session: scalar reads, table
/// walks keyed by index suffix, and the one write the update stage
/// issues. Walks return rows in agent order; an empty table is an empty
/// vec, not an error.
#[allow(async_fn_in_trait)]
pub trait SnmpSession {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, SnmpError>;

    /// Walk every cell under `base`. Each entry is
    /// `(index suffix, value)`; compound indexes (e.g. Cisco's
    /// `module.port`) keep all their arcs.
    async fn walk(&self, base: &Oid) -> Result<Vec<(Oid, SnmpValue)>, SnmpError>;

    async fn set_string(&self, oid: &Oid, text: &str) -> Result<(), SnmpError>;
}

/// Shared handles forward to the inner session, so factories can vend
/// the same session to discovery and update without re-opening sockets.
impl<S: SnmpSession + Sync> SnmpSession for std::sync::Arc<S> {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, SnmpError> {
        (**self).get(oid).await
    }

    async fn walk(&self, base: &Oid) -> Result<Vec<(Oid, SnmpValue)>, SnmpError> {
        (**self).walk(base).await
    }

    async fn set_string(&self, oid: &Oid, text: &str) -> Result<(), SnmpError> {
        (**self).set_string(oid, text).await
    }
}

// ── async-snmp implementation ───────────────────────────────────────

/// Production session over a dedicated UDP socket.
pub struct UdpSession {
    client: async_snmp::UdpClient,
    target: String,
    retries: u32,
}

impl UdpSession {
    /// Open a v2c session. This binds the socket and resolves the
    /// target; whether the agent answers is only known at the first
    /// request, which is why the prober classifies on its initial get.
    pub async fn connect(config: &SessionConfig) -> Result<Self, SnmpError> {
        let target = config.target();
        let retry = async_snmp::Retry::fixed(config.retries, Duration::from_secs(1)).map_err(
            |err| SnmpError::SessionOpen {
                target: target.clone(),
                reason: err.to_string(),
            },
        )?;
        let client = async_snmp::Client::builder(
            target.clone(),
            async_snmp::Auth::v2c(config.community.expose_secret()),
        )
        .request_timeout(config.timeout)
        .retry(retry)
        .connect()
        .await
        .map_err(|err| SnmpError::SessionOpen {
            target: target.clone(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            client,
            target,
            retries: config.retries,
        })
    }

    fn translate(&self, oid: &Oid, err: &async_snmp::Error) -> SnmpError {
        match err {
            async_snmp::Error::Timeout { .. } => SnmpError::Timeout {
                target: self.target.clone(),
                retries: self.retries,
            },
            other => SnmpError::Agent {
                oid: oid.clone(),
                status: other.to_string(),
            },
        }
    }
}

fn proto_oid(oid: &Oid) -> Result<async_snmp::Oid, SnmpError> {
    oid.to_string()
        .parse::<async_snmp::Oid>()
        .map_err(|_| SnmpError::BadOid {
            text: oid.to_string(),
        })
}

/// Fold an async-snmp value into the engine's shape. String content
/// stays a string; numeric kinds render through Display and parse back.
fn decode(value: &async_snmp::Value) -> SnmpValue {
    if let Some(s) = value.as_str() {
        return SnmpValue::Str(s.to_owned());
    }
    let rendered = value.to_string();
    match rendered.parse::<i64>() {
        Ok(n) => SnmpValue::Int(n),
        Err(_) => SnmpValue::Str(rendered),
    }
}

impl SnmpSession for UdpSession {
    async fn get(&self, oid: &Oid) -> Result<SnmpValue, SnmpError> {
        let varbind = self
            .client
            .get(&proto_oid(oid)?)
            .await
            .map_err(|e| self.translate(oid, &e))?
            .into_single()
            .map_err(|response| SnmpError::Agent {
                oid: oid.clone(),
                status: format!(
                    "expected a single varbind, got {}",
                    response.varbinds.len()
                ),
            })?;
        Ok(decode(&varbind.value))
    }

    async fn walk(&self, base: &Oid) -> Result<Vec<(Oid, SnmpValue)>, SnmpError> {
        let mut stream = self
            .client
            .walk(proto_oid(base)?)
            .map_err(|e| self.translate(base, &e))?;
        let mut rows = Vec::new();
        while let Some(item) = stream.next().await {
            let varbind = item.map_err(|e| self.translate(base, &e))?;
            let full: Oid = varbind
                .oid
                .to_string()
                .parse()
                .map_err(|_| SnmpError::BadOid {
                    text: varbind.oid.to_string(),
                })?;
            // Agents occasionally run past the subtree; stop at the
            // first cell that no longer sits under the base.
            let Some(suffix) = full.strip_prefix(base) else {
                break;
            };
            rows.push((suffix, decode(&varbind.value)));
        }
        debug!(target = %self.target, base = %base, rows = rows.len(), "walk complete");
        Ok(rows)
    }

    async fn set_string(&self, oid: &Oid, text: &str) -> Result<(), SnmpError> {
        self.client
            .set(
                &proto_oid(oid)?,
                async_snmp::Value::OctetString(text.as_bytes().to_vec().into()),
            )
            .await
            .map_err(|e| self.translate(oid, &e))?;
        Ok(())
    }
}
