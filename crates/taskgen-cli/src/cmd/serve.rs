use anyhow::Context;
use std::path::Path;
use taskgen_core::config::Config;

pub fn run(root: &Path, port: Option<u16>, bind: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load taskgen.yaml")?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        tokio::select! {
            res = taskgen_server::serve(&root_buf, &config) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
