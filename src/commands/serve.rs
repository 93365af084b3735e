use crate::config::ModmapConfig;
use crate::server;
use anyhow::{Context, Result};

pub fn serve_http(addr: Option<String>, config: ModmapConfig) -> Result<()> {
    let addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(server::serve(&addr, config))
}
