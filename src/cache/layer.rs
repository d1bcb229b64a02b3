use super::client::CacheClient;
use crate::config::CacheTtlConfig;
use std::sync::Arc;

/// What services hold: the shared client plus the TTL table
///
/// Read-through lives in `read_through.rs`, write-path invalidation in
/// `invalidation.rs`. Both contain cache failures instead of returning them.
#[derive(Debug, Clone)]
pub struct CacheLayer {
    client: Arc<CacheClient>,
    ttl: CacheTtlConfig,
}

impl CacheLayer {
    pub fn new(client: Arc<CacheClient>, ttl: CacheTtlConfig) -> Self {
        Self { client, ttl }
    }

    pub fn client(&self) -> &Arc<CacheClient> {
        &self.client
    }

    pub fn ttl(&self) -> &CacheTtlConfig {
        &self.ttl
    }
}
