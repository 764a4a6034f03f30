/*
[INPUT]:  CLI configuration
[OUTPUT]: Auth store wired to the HTTP backend and on-disk session slots
[POS]:    Session layer - builds the process-wide session context
[UPDATE]: When store wiring or status rendering changes
*/

use std::sync::Arc;

use anyhow::Context;
use ijazah_adapter::{AuthSnapshot, AuthStore, FileSessionStorage, IjazahClient};
use tracing::debug;

use crate::config::CliConfig;

pub fn build_store(config: &CliConfig) -> anyhow::Result<AuthStore> {
    let client = IjazahClient::with_config_and_base_url(config.client_config(), &config.api_base_url)
        .context("create backend client")?;
    let storage_dir = config.resolved_storage_dir()?;
    debug!(storage_dir = %storage_dir.display(), "using session storage");

    Ok(AuthStore::with_config(
        Arc::new(client),
        Arc::new(FileSessionStorage::new(storage_dir)),
        config.auth_config(),
    ))
}

/// One-line human summary of a session
pub fn describe(snapshot: &AuthSnapshot) -> String {
    match (&snapshot.user, snapshot.is_authenticated()) {
        (Some(user), true) => format!("signed in as {} ({})", user.address, user.role),
        _ => format!("not signed in ({:?})", snapshot.phase),
    }
}
