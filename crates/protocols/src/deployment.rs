//! Factory deployment helpers.
//!
//! Two deployments exist: the plain factory, which only takes the vault,
//! the fee percentages provider and the queries helper, and the rebalanced
//! one, which also carries factory and pool version tags and the Euler
//! protocol address its rebalancers approve when wrapping.

use crate::chain::Chain;
use crate::contracts::{
    Erc20Contract, EulerTokenContract, FactoryContract, FeesProviderContract, QueriesContract,
    VaultContract,
};
use crate::euler::{FactoryArgs, FactoryVersioning};
use linear_pool_domain::errors::Revert;
use linear_pool_domain::value_objects::VersionInfo;
use linear_pool_domain::{Address, H160};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Euler main contract on mainnet, 0x27182842E098f60e3D576794A5bFFb0777E025d3.
pub const EULER_PROTOCOL: Address = H160([
    0x27, 0x18, 0x28, 0x42, 0xe0, 0x98, 0xf6, 0x0e, 0x3d, 0x57, 0x67, 0x94, 0xa5, 0xbf, 0xfb, 0x07,
    0x77, 0xe0, 0x25, 0xd3,
]);

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("contract call reverted: {0}")]
    Revert(#[from] Revert),
    #[error("version metadata: {0}")]
    Version(#[from] serde_json::Error),
}

/// Inputs of a factory deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryDeployment {
    pub vault: Address,
    pub protocol_fee_percentages_provider: Address,
    pub balancer_queries: Address,
    pub versioning: Option<FactoryVersioning>,
}

impl FactoryDeployment {
    /// Three-argument factory without version tags.
    pub fn unversioned(
        vault: Address,
        protocol_fee_percentages_provider: Address,
        balancer_queries: Address,
    ) -> Self {
        Self {
            vault,
            protocol_fee_percentages_provider,
            balancer_queries,
            versioning: None,
        }
    }

    /// Factory tagged with the rebalanced deployment's versions and wired to
    /// [`EULER_PROTOCOL`].
    pub fn rebalanced(
        vault: Address,
        protocol_fee_percentages_provider: Address,
        balancer_queries: Address,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            vault,
            protocol_fee_percentages_provider,
            balancer_queries,
            versioning: Some(FactoryVersioning {
                factory_version: VersionInfo::euler_factory().to_json()?,
                pool_version: VersionInfo::euler_pool().to_json()?,
                euler_protocol: EULER_PROTOCOL,
            }),
        })
    }

    /// Same deployment with a different Euler protocol address.
    pub fn with_euler_protocol(mut self, euler_protocol: Address) -> Self {
        if let Some(versioning) = self.versioning.as_mut() {
            versioning.euler_protocol = euler_protocol;
        }
        self
    }

    fn factory_args(&self) -> FactoryArgs {
        FactoryArgs {
            vault: self.vault,
            protocol_fee_percentages_provider: self.protocol_fee_percentages_provider,
            balancer_queries: self.balancer_queries,
            versioning: self.versioning.clone(),
        }
    }
}

/// Deploys a factory from `input`, signed by `from`.
pub async fn deploy_factory(
    chain: &Chain,
    input: &FactoryDeployment,
    from: Address,
) -> Result<FactoryContract, Revert> {
    let args = input.factory_args();
    let versioned = args.versioning.is_some();
    let (address, receipt) = chain
        .transact(|s| s.deploy_euler_linear_pool_factory(from, args))
        .await?;
    info!(
        factory = ?address,
        block = receipt.block_number,
        versioned,
        "EulerLinearPoolFactory deployed"
    );
    Ok(FactoryContract::new(chain.clone(), address, from))
}

/// Deploys a mintable ERC-20.
pub async fn deploy_token(
    chain: &Chain,
    name: &str,
    symbol: &str,
    decimals: u8,
    from: Address,
) -> Result<Erc20Contract, Revert> {
    let (address, _) = chain
        .transact(|s| Ok(s.deploy_erc20(name, symbol, decimals)))
        .await?;
    Ok(Erc20Contract::new(chain.clone(), address, from))
}

/// Deploys a mock eToken over `underlying`.
pub async fn deploy_euler_token(
    chain: &Chain,
    name: &str,
    symbol: &str,
    underlying: Address,
    euler_protocol: Option<Address>,
    from: Address,
) -> Result<EulerTokenContract, Revert> {
    let (address, _) = chain
        .transact(|s| s.deploy_mock_euler_token(name, symbol, underlying, euler_protocol))
        .await?;
    Ok(EulerTokenContract::new(chain.clone(), address, from))
}

/// Vault, fee provider, queries helper and factory deployed together.
#[derive(Debug, Clone)]
pub struct ProtocolDeployment {
    pub vault: VaultContract,
    pub fees_provider: FeesProviderContract,
    pub queries: QueriesContract,
    pub factory: FactoryContract,
}

impl ProtocolDeployment {
    /// Deploys the whole stack, with a rebalanced (versioned) factory when
    /// `euler_protocol` is given.
    pub async fn deploy(
        chain: &Chain,
        deployer: Address,
        euler_protocol: Option<Address>,
    ) -> Result<Self, DeploymentError> {
        let ((vault, fees_provider, queries), _) = chain
            .transact(|s| {
                let vault = s.deploy_vault();
                let fees_provider = s.deploy_fee_percentages_provider(vault, deployer);
                let queries = s.deploy_balancer_queries(vault);
                Ok((vault, fees_provider, queries))
            })
            .await?;
        info!(vault = ?vault, "Vault deployed");

        let input = match euler_protocol {
            Some(protocol) => FactoryDeployment::rebalanced(vault, fees_provider, queries)?
                .with_euler_protocol(protocol),
            None => FactoryDeployment::unversioned(vault, fees_provider, queries),
        };
        let factory = deploy_factory(chain, &input, deployer).await?;

        Ok(Self {
            vault: VaultContract::new(chain.clone(), vault, deployer),
            fees_provider: FeesProviderContract::new(chain.clone(), fees_provider, deployer),
            queries: QueriesContract::new(chain.clone(), queries, deployer),
            factory,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linear_pool_domain::enums::ProtocolFeeType;
    use linear_pool_domain::math::fixed_point::ONE;

    fn deployer() -> Address {
        Address::from_low_u64_be(0x1000)
    }

    #[test]
    fn test_euler_protocol_address() {
        assert_eq!(
            format!("{EULER_PROTOCOL:?}"),
            "0x27182842e098f60e3d576794a5bffb0777e025d3"
        );
    }

    #[test]
    fn test_rebalanced_input_carries_versions() {
        let vault = Address::from_low_u64_be(1);
        let input = FactoryDeployment::rebalanced(vault, vault, vault).unwrap();
        let versioning = input.versioning.unwrap();

        assert_eq!(
            versioning.factory_version,
            r#"{"name":"EulerLinearPoolFactory","version":1,"deployment":"20221113-euler-rebalanced-linear-pool"}"#
        );
        assert_eq!(
            versioning.pool_version,
            r#"{"name":"EulerLinearPool","version":1,"deployment":"20221113-euler-rebalanced-linear-pool"}"#
        );
        assert_eq!(versioning.euler_protocol, EULER_PROTOCOL);
    }

    #[test]
    fn test_unversioned_input_ignores_protocol_override() {
        let vault = Address::from_low_u64_be(1);
        let input = FactoryDeployment::unversioned(vault, vault, vault)
            .with_euler_protocol(Address::from_low_u64_be(2));
        assert_eq!(input.versioning, None);
    }

    #[tokio::test]
    async fn test_deploy_unversioned_stack() {
        let chain = Chain::new();
        let deployment = ProtocolDeployment::deploy(&chain, deployer(), None)
            .await
            .unwrap();

        assert_eq!(deployment.factory.version().await.unwrap(), None);
        assert_eq!(deployment.factory.last_created_pool().await.unwrap(), None);
        let swap_fee = deployment
            .fees_provider
            .get_fee_type_percentage(ProtocolFeeType::Swap)
            .await
            .unwrap();
        assert!(swap_fee.is_zero());

        deployment
            .fees_provider
            .set_fee_type_percentage(ProtocolFeeType::Swap, ONE / 2)
            .await
            .unwrap();
        assert_eq!(
            deployment
                .fees_provider
                .get_fee_type_percentage(ProtocolFeeType::Swap)
                .await
                .unwrap(),
            ONE / 2
        );
    }

    #[tokio::test]
    async fn test_deploy_rebalanced_factory() {
        let chain = Chain::new();
        let deployment = ProtocolDeployment::deploy(&chain, deployer(), Some(EULER_PROTOCOL))
            .await
            .unwrap();

        let version = deployment.factory.version().await.unwrap().unwrap();
        let info = VersionInfo::from_json(&version).unwrap();
        assert_eq!(info, VersionInfo::euler_factory());
        let pool_version = deployment.factory.pool_version().await.unwrap().unwrap();
        assert_eq!(
            VersionInfo::from_json(&pool_version).unwrap(),
            VersionInfo::euler_pool()
        );
    }

    #[tokio::test]
    async fn test_deploy_factory_requires_existing_vault() {
        let chain = Chain::new();
        let nowhere = Address::from_low_u64_be(0xdead);
        let input = FactoryDeployment::unversioned(nowhere, nowhere, nowhere);

        let result = deploy_factory(&chain, &input, deployer()).await;
        assert_eq!(result.unwrap_err(), Revert::ContractNotFound(nowhere));
    }
}
