//! Ethereum JSON-RPC backend for the access-control contract.

use crate::abi::{decode_bool, encode_address_call};
use crate::{AccessCall, Address, Ledger, LedgerError, Receipt, ReceiptStatus, TransactionHash};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

/// Configuration for [`JsonRpcLedger`].
#[derive(Clone, Debug)]
pub struct RpcLedgerConfig {
    /// JSON-RPC endpoint of an Ethereum node (e.g. "http://localhost:8545").
    pub endpoint: String,

    /// Address of the access-control contract.
    pub contract: Address,

    /// Account the node signs state changes with (`eth_sendTransaction`).
    /// Without one the ledger is read-only.
    pub sender: Option<Address>,

    /// Optional timeout for requests in seconds (default: 30)
    pub timeout_seconds: Option<u64>,
}

impl RpcLedgerConfig {
    /// Create a new configuration for `contract` at `endpoint`.
    pub fn new(endpoint: impl Into<String>, contract: Address) -> Self {
        Self {
            endpoint: endpoint.into(),
            contract,
            sender: None,
            timeout_seconds: Some(30),
        }
    }

    /// Set the sending account.
    pub fn with_sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    status: String,
    block_number: String,
}

enum RpcFailure {
    Transport(String),
    Remote { code: i64, message: String },
}

impl RpcFailure {
    fn into_ledger_error(self, on_remote: fn(String) -> LedgerError) -> LedgerError {
        match self {
            RpcFailure::Transport(reason) => LedgerError::Unreachable(reason),
            RpcFailure::Remote { code, message } => on_remote(format!("{message} (code {code})")),
        }
    }
}

/// A [`Ledger`] that talks to an Ethereum node over JSON-RPC.
///
/// - `isAuthorized` is an `eth_call` against the latest block.
/// - Grants and revocations are `eth_sendTransaction`s from
///   [`RpcLedgerConfig::sender`], which the node must be able to sign for.
/// - Receipts come from `eth_getTransactionReceipt`.
pub struct JsonRpcLedger {
    config: RpcLedgerConfig,
    client: Client,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a new ledger client with the given configuration.
    pub fn new(config: RpcLedgerConfig) -> Self {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout_seconds {
            client_builder = client_builder.timeout(std::time::Duration::from_secs(timeout));
        }

        let client = client_builder.build().unwrap_or_else(|_| Client::new());

        Self {
            config,
            client,
            next_id: AtomicU64::new(1),
        }
    }

    /// The configuration this ledger was created with.
    pub fn config(&self) -> &RpcLedgerConfig {
        &self.config
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcFailure::Transport(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcFailure::Transport(format!("Invalid JSON-RPC response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(RpcFailure::Remote {
                code: error.code,
                message: error.message,
            });
        }

        Ok(body.result.unwrap_or(Value::Null))
    }
}

fn parse_quantity(quantity: &str) -> Result<u64, LedgerError> {
    let digits = quantity.strip_prefix("0x").unwrap_or(quantity);
    u64::from_str_radix(digits, 16)
        .map_err(|_| LedgerError::InvalidResponse(format!("invalid quantity '{quantity}'")))
}

fn as_string(value: Value, what: &str) -> Result<String, LedgerError> {
    match value {
        Value::String(value) => Ok(value),
        other => Err(LedgerError::InvalidResponse(format!(
            "expected {what} as a string, got {other}"
        ))),
    }
}

#[async_trait]
impl Ledger for JsonRpcLedger {
    async fn is_authorized(&self, account: &Address) -> Result<bool, LedgerError> {
        let data = encode_address_call("isAuthorized(address)", account);
        let params = json!([
            {
                "to": self.config.contract.to_string(),
                "data": format!("0x{}", hex::encode(data)),
            },
            "latest"
        ]);

        let output = self
            .request("eth_call", params)
            .await
            .map_err(|failure| failure.into_ledger_error(LedgerError::InvalidResponse))?;

        decode_bool(&as_string(output, "eth_call output")?)
    }

    async fn submit(&self, call: AccessCall) -> Result<TransactionHash, LedgerError> {
        let sender = self.config.sender.ok_or_else(|| {
            LedgerError::Rejected("no sending account configured for state changes".into())
        })?;

        let data = encode_address_call(call.signature(), call.account());
        let params = json!([{
            "from": sender.to_string(),
            "to": self.config.contract.to_string(),
            "data": format!("0x{}", hex::encode(data)),
        }]);

        let hash = self
            .request("eth_sendTransaction", params)
            .await
            .map_err(|failure| failure.into_ledger_error(LedgerError::Rejected))?;

        as_string(hash, "transaction hash")?.parse()
    }

    async fn receipt(&self, transaction: &TransactionHash) -> Result<Option<Receipt>, LedgerError> {
        let value = self
            .request("eth_getTransactionReceipt", json!([transaction.to_string()]))
            .await
            .map_err(|failure| failure.into_ledger_error(LedgerError::InvalidResponse))?;

        if value.is_null() {
            return Ok(None);
        }

        let receipt: RpcReceipt = serde_json::from_value(value)
            .map_err(|e| LedgerError::InvalidResponse(format!("invalid receipt: {e}")))?;

        let status = match parse_quantity(&receipt.status)? {
            1 => ReceiptStatus::Success,
            _ => ReceiptStatus::Reverted,
        };

        Ok(Some(Receipt {
            transaction: *transaction,
            block_number: parse_quantity(&receipt.block_number)?,
            status,
        }))
    }
}
