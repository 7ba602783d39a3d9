use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use url::Url;
use vault_capability::Ed25519Signer;
use vault_ledger::{Address, ConfirmationPolicy, JsonRpcLedger, Ledger, MemoryLedger, RpcLedgerConfig};
use vault_storage::{MemoryService, RestService, RestServiceConfig, Service};
use vault_upload::DEFAULT_SPACE_NAME;

#[derive(Debug, Clone, Parser)]
#[command(name = "vault-gateway")]
#[command(bin_name = "vault-gateway")]
#[command(about = "Gateway for capability-gated uploads", long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "VAULT_LISTEN", default_value = "127.0.0.1:8787")]
    pub listen: SocketAddr,

    /// Ethereum JSON-RPC endpoint. Without one an in-memory ledger is used.
    #[arg(long, env = "VAULT_LEDGER_RPC")]
    pub ledger_rpc: Option<Url>,

    /// Address of the access-control contract.
    #[arg(long, env = "VAULT_CONTRACT")]
    pub contract: Option<Address>,

    /// Account grants are sent from.
    #[arg(long, env = "VAULT_LEDGER_SENDER")]
    pub ledger_sender: Option<Address>,

    /// Contract owner for the in-memory ledger. Unset means anyone may grant.
    #[arg(long, env = "VAULT_LEDGER_OWNER")]
    pub ledger_owner: Option<Address>,

    /// Storage service endpoint. Without one an in-memory service is used.
    #[arg(long, env = "VAULT_STORAGE_ENDPOINT")]
    pub storage_endpoint: Option<Url>,

    /// Name of the space created on first upload.
    #[arg(long, env = "VAULT_SPACE_NAME", default_value = DEFAULT_SPACE_NAME)]
    pub space_name: String,

    /// Hex encoded 32 byte seed of the gateway's agent key. A fresh key is
    /// generated when unset.
    #[arg(long, env = "VAULT_AGENT_SEED", hide_env_values = true)]
    pub agent_seed: Option<String>,

    /// Bearer token required by `POST /access`. Grants are refused while
    /// unset, since they are sent from the gateway's own ledger account.
    #[arg(long, env = "VAULT_OPERATOR_TOKEN", hide_env_values = true)]
    pub operator_token: Option<String>,

    /// Seconds to wait for a grant to be confirmed.
    #[arg(long, env = "VAULT_CONFIRMATION_TIMEOUT", default_value_t = 120)]
    pub confirmation_timeout: u64,

    /// Milliseconds between receipt lookups.
    #[arg(long, env = "VAULT_CONFIRMATION_POLL_MS", default_value_t = 1000)]
    pub confirmation_poll_ms: u64,
}

impl Config {
    /// How long, and how often, to wait on grant receipts.
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy::default()
            .with_timeout(Duration::from_secs(self.confirmation_timeout))
            .with_poll_interval(Duration::from_millis(self.confirmation_poll_ms))
    }

    /// The JSON-RPC ledger when an endpoint is configured, an in-memory
    /// contract otherwise.
    pub fn ledger(&self) -> Result<Arc<dyn Ledger>> {
        match &self.ledger_rpc {
            Some(endpoint) => {
                let Some(contract) = self.contract else {
                    bail!("--contract is required with --ledger-rpc");
                };
                let mut config = RpcLedgerConfig::new(endpoint.to_string(), contract);
                if let Some(sender) = self.ledger_sender {
                    config = config.with_sender(sender);
                }
                tracing::info!(%endpoint, %contract, "using JSON-RPC ledger");
                Ok(Arc::new(JsonRpcLedger::new(config)))
            }
            None => {
                let mut ledger = MemoryLedger::new();
                if let Some(owner) = self.ledger_owner {
                    ledger = ledger.with_owner(owner);
                }
                if let Some(sender) = self.ledger_sender {
                    ledger = ledger.with_sender(sender);
                }
                tracing::warn!("no ledger endpoint configured, using an in-memory ledger");
                Ok(Arc::new(ledger))
            }
        }
    }

    /// The REST storage service when an endpoint is configured, an
    /// in-memory one otherwise.
    pub fn service(&self) -> Arc<dyn Service> {
        match &self.storage_endpoint {
            Some(endpoint) => {
                tracing::info!(%endpoint, "using REST storage service");
                Arc::new(RestService::new(RestServiceConfig::new(endpoint.to_string())))
            }
            None => {
                tracing::warn!("no storage endpoint configured, using an in-memory service");
                Arc::new(MemoryService::new())
            }
        }
    }

    /// The gateway's agent key, from the configured seed or freshly
    /// generated.
    pub fn agent(&self) -> Result<Ed25519Signer> {
        match &self.agent_seed {
            Some(seed) => {
                let seed = hex::decode(seed.trim()).context("agent seed is not hex")?;
                Ok(Ed25519Signer::import(&seed)?)
            }
            None => Ok(Ed25519Signer::generate()?),
        }
    }
}
