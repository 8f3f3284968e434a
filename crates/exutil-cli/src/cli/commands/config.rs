//! `exutil config` – show where config lives and what it resolves to.

use anyhow::Result;
use exutil_core::config::{self, ExutilConfig};

pub fn run_config(cfg: &ExutilConfig) -> Result<()> {
    let path = config::config_path()?;
    let backoff = cfg.backoff()?;
    println!("config: {}", path.display());
    println!("rate_limit_retries: {}", cfg.rate_limit_retries);
    println!(
        "backoff: {} step(s), factor {}, {:?}..{:?}",
        backoff.retries, backoff.factor, backoff.min_delay, backoff.max_delay
    );
    Ok(())
}
