// # Contract Deployer Trait
//
// Defines the deployment primitive the binder uses to provision missing
// infrastructure (a registry, a resolver).
//
// ## Purpose
//
// A deployer submits contract bytecode with constructor arguments, waits
// for the receipt, and hands back the deployed address. Nothing more: it
// does not know why a contract is being deployed.

use async_trait::async_trait;

use crate::types::{Address, ContractArtifact, ContractHandle};

/// Trait for contract deployment implementations
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Submit one deployment transaction per call and await its receipt
///
/// ## Forbidden Capabilities
/// - ❌ Retry failed deployments (the caller re-runs the whole reconciliation)
/// - ❌ Reuse a previously deployed contract instead of deploying
/// - ❌ Configure the deployed contract (owned by `NameBinder`)
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Deploy `artifact` with `constructor_args`, sent by `from`
    ///
    /// # Returns
    ///
    /// - `Ok(ContractHandle)`: The confirmed deployment
    /// - `Err(Error)`: Submission or confirmation failed
    async fn deploy(
        &self,
        artifact: ContractArtifact,
        constructor_args: &[Address],
        from: Address,
    ) -> Result<ContractHandle, crate::Error>;

    /// Deployer name (for logging/debugging)
    fn deployer_name(&self) -> &'static str;
}
