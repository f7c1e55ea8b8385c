use crate::chain::{ChainState, Event};
use linear_pool_domain::enums::ProtocolFeeType;
use linear_pool_domain::errors::Revert;
use linear_pool_domain::{Address, U256};
use std::collections::HashMap;

/// Protocol fee percentages keyed by fee type.
#[derive(Debug, Clone)]
pub struct ProtocolFeePercentagesProvider {
    vault: Address,
    owner: Address,
    percentages: HashMap<ProtocolFeeType, U256>,
}

impl ProtocolFeePercentagesProvider {
    /// 50%
    pub const MAX_FEE_PERCENTAGE: U256 = U256([500_000_000_000_000_000, 0, 0, 0]);

    pub fn vault(&self) -> Address {
        self.vault
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn fee_type_percentage(&self, fee_type: ProtocolFeeType) -> U256 {
        self.percentages
            .get(&fee_type)
            .copied()
            .unwrap_or_default()
    }
}

impl ChainState {
    pub fn deploy_fee_percentages_provider(&mut self, vault: Address, owner: Address) -> Address {
        let address = self.allocate_address();
        self.fee_providers.insert(
            address,
            ProtocolFeePercentagesProvider {
                vault,
                owner,
                percentages: HashMap::new(),
            },
        );
        address
    }

    pub fn fees_set_fee_type_percentage(
        &mut self,
        provider: Address,
        caller: Address,
        fee_type: ProtocolFeeType,
        percentage: U256,
    ) -> Result<(), Revert> {
        let state = self.fee_provider_mut(provider)?;
        if caller != state.owner {
            return Err(Revert::SenderNotAllowed);
        }
        if percentage > ProtocolFeePercentagesProvider::MAX_FEE_PERCENTAGE {
            return Err(Revert::FeePercentageTooHigh);
        }
        state.percentages.insert(fee_type, percentage);

        self.emit(
            provider,
            Event::ProtocolFeePercentageChanged {
                fee_type,
                percentage,
            },
        );
        Ok(())
    }
}
