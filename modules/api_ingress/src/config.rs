use serde::{Deserialize, Serialize};

const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
const DEFAULT_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// HTTP host configuration, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    /// Explicit `host:port`. Empty means "use server.host and server.port".
    pub bind_addr: String,
    pub cors_enabled: bool,
    pub request_timeout_sec: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            cors_enabled: false,
            request_timeout_sec: DEFAULT_REQUEST_TIMEOUT_SEC,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ApiIngressConfig {
    /// Address to bind: `bind_addr` when set, otherwise `host:port`.
    pub fn resolve_bind_addr(&self, host: &str, port: u16) -> anyhow::Result<std::net::SocketAddr> {
        let raw = if self.bind_addr.trim().is_empty() {
            format!("{host}:{port}")
        } else {
            self.bind_addr.trim().to_string()
        };
        raw.parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", raw, e))
    }
}
