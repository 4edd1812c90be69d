use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use holdco::config::Config;
use holdco::logging::log_startup;
use holdco::seed::Portfolio;
use holdco::server::{self, Dashboard};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let portfolio = Portfolio::seed();
    portfolio
        .validate()
        .map_err(|e| anyhow!(e))
        .context("seed dataset failed validation")?;

    let listener = server::bind(&cfg).await?;
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| cfg.listen_addr());
    log_startup(&addr, portfolio.len(), &portfolio.fingerprint());

    let dashboard = Arc::new(Dashboard::new(portfolio, cfg));
    server::serve(dashboard, listener).await
}
