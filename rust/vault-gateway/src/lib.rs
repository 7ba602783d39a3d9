//! HTTP gateway for the upload vault.
//!
//! Wires an [`AuthorizationGate`], a storage [`Client`] and a
//! [`SpaceManager`] into a [`Pipeline`](vault_upload::Pipeline) from a
//! [`Config`], and exposes it through the [`router`].

mod config;
pub use config::*;

mod api;
pub use api::*;

use std::sync::Arc;

use anyhow::Result;
use vault_capability::Principal;
use vault_ledger::AuthorizationGate;
use vault_storage::{Client, StorageNetwork};
use vault_upload::SpaceManager;

/// Build the handler state described by `config`.
pub fn build_state(config: &Config) -> Result<AppState> {
    let agent = config.agent()?;
    tracing::info!(agent = %agent.did(), "gateway agent");

    let network: Arc<dyn StorageNetwork> = Arc::new(Client::new(agent, config.service()));
    let gate = AuthorizationGate::new(config.ledger()?).with_confirmation(config.confirmation_policy());
    let pipeline = GatewayPipeline::new(gate, network)
        .with_space_manager(SpaceManager::new(config.space_name.clone()));

    let state = AppState::new(pipeline);
    Ok(match &config.operator_token {
        Some(token) => state.with_operator_token(token.clone()),
        None => {
            tracing::warn!("no operator token configured, access grants are disabled");
            state
        }
    })
}
