//! On-chain root registry over JSON-RPC.

use std::time::Duration;

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    sol,
};
use ark_bn254::Fr;
use async_trait::async_trait;
use passport_disclose_lib::proof::field_to_u256;
use passport_disclose_lib::{CapabilityError, RootRegistry};
use tracing::debug;

sol! {
    #[sol(rpc)]
    interface IRegister {
        function checkRoot(uint256 root) external view returns (bool);
    }
}

/// Default limit on a single `checkRoot` round trip.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Root registry backed by the register contract's `checkRoot` view.
pub struct RpcRootRegistry {
    contract: IRegister::IRegisterInstance<DynProvider>,
    timeout: Duration,
}

impl RpcRootRegistry {
    /// Connect to `rpc_url` and bind the register contract at `address`.
    pub async fn connect(rpc_url: &str, address: Address) -> Result<Self, CapabilityError> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        Ok(Self::from_provider(provider.erased(), address))
    }

    /// Bind the register contract at `address` on an existing provider.
    pub fn from_provider(provider: DynProvider, address: Address) -> Self {
        Self {
            contract: IRegister::new(address, provider),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }
}

#[async_trait]
impl RootRegistry for RpcRootRegistry {
    async fn is_root_registered(&self, root: Fr) -> Result<bool, CapabilityError> {
        let call = self.contract.checkRoot(field_to_u256(&root));
        let registered = tokio::time::timeout(self.timeout, call.call())
            .await
            .map_err(|_| {
                CapabilityError::Transport(format!(
                    "checkRoot timed out after {}s",
                    self.timeout.as_secs_f64()
                ))
            })?
            .map_err(|e| CapabilityError::Transport(e.to_string()))?;
        debug!(contract = %self.address(), registered, "Queried root registry");
        Ok(registered)
    }
}
