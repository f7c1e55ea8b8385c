use linear_pool_domain::enums::{PoolBalanceOpKind, PoolSpecialization, ProtocolFeeType};
use linear_pool_domain::value_objects::PoolId;
use linear_pool_domain::{Address, U256};

/// Event emitted by a simulated contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // ERC20
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },

    // Vault
    PoolRegistered {
        pool_id: PoolId,
        pool: Address,
        specialization: PoolSpecialization,
    },
    TokensRegistered {
        pool_id: PoolId,
        tokens: Vec<Address>,
        asset_managers: Vec<Address>,
    },
    Swap {
        pool_id: PoolId,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out: U256,
    },
    PoolBalanceManaged {
        pool_id: PoolId,
        asset_manager: Address,
        token: Address,
        kind: PoolBalanceOpKind,
        amount: U256,
    },

    // Factory
    PoolCreated {
        pool: Address,
    },
    FactoryDisabled,

    // Linear pool
    TargetsSet {
        token: Address,
        lower_target: U256,
        upper_target: U256,
    },
    SwapFeePercentageChanged {
        swap_fee_percentage: U256,
    },

    // Fees provider
    ProtocolFeePercentageChanged {
        fee_type: ProtocolFeeType,
        percentage: U256,
    },
}

/// Event together with the contract that emitted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub event: Event,
}

/// Outcome of a committed transaction.
#[derive(Debug, Clone, Default)]
pub struct Receipt {
    pub block_number: u64,
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.logs.iter().map(|log| &log.event)
    }

    /// Address carried by the first `PoolCreated` event, if any.
    pub fn pool_created(&self) -> Option<Address> {
        self.events().find_map(|event| match event {
            Event::PoolCreated { pool } => Some(*pool),
            _ => None,
        })
    }
}
