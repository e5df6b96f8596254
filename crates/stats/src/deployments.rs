// Copyright 2025 RISC Zero, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use alloy::primitives::{address, Address};
use clap::Args;
use derive_builder::Builder;

pub use alloy_chains::NamedChain;

/// Configuration for a deployment of the lockdrop contract.
// NOTE: See https://github.com/clap-rs/clap/issues/5092#issuecomment-1703980717 about clap usage.
#[non_exhaustive]
#[derive(Clone, Debug, Builder, Args)]
#[group(requires = "lockdrop_address")]
pub struct Deployment {
    /// EIP-155 chain ID of the network.
    #[clap(long, env)]
    #[builder(setter(into, strip_option), default)]
    pub chain_id: Option<u64>,

    /// Address of the [ILockdrop] contract.
    ///
    /// [ILockdrop]: crate::contracts::ILockdrop
    #[clap(long, env, required = false, long_help = "Address of the lockdrop contract")]
    #[builder(setter(into))]
    pub lockdrop_address: Address,

    /// First block scanned for lockdrop events.
    #[clap(skip)]
    #[builder(default)]
    pub from_block: u64,
}

impl Deployment {
    /// Create a new [DeploymentBuilder].
    pub fn builder() -> DeploymentBuilder {
        Default::default()
    }

    /// Lookup the [Deployment] for a named chain.
    pub const fn from_chain(chain: NamedChain) -> Option<Deployment> {
        match chain {
            NamedChain::Mainnet => Some(MAINNET),
            NamedChain::Ropsten => Some(ROPSTEN),
            _ => None,
        }
    }

    /// Lookup the [Deployment] by chain ID.
    pub fn from_chain_id(chain_id: impl Into<u64>) -> Option<Deployment> {
        let chain = NamedChain::try_from(chain_id.into()).ok()?;
        Self::from_chain(chain)
    }
}

/// Mainnet block mined in late May 2019, ahead of the contract deployment. The contract
/// rejects locks and signals before its start time of June 1st 2019.
pub const MAINNET_START_BLOCK: u64 = 7_800_000;

/// [Deployment] for Ethereum mainnet.
pub const MAINNET: Deployment = Deployment {
    chain_id: Some(NamedChain::Mainnet as u64),
    lockdrop_address: address!("0x1b75b90e60070d37cfa9d87affd124bb345bf70a"),
    from_block: MAINNET_START_BLOCK,
};

/// [Deployment] for the Ropsten testnet. Scanned from genesis since the test
/// contract's start block is not pinned.
pub const ROPSTEN: Deployment = Deployment {
    chain_id: Some(NamedChain::Ropsten as u64),
    lockdrop_address: address!("0x111ee804560787e0bfc1898ed79dae24f2457a04"),
    from_block: 0,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_chain_id() {
        let mainnet = Deployment::from_chain_id(1u64).unwrap();
        assert_eq!(mainnet.lockdrop_address, MAINNET.lockdrop_address);
        assert_eq!(mainnet.from_block, MAINNET_START_BLOCK);
        let ropsten = Deployment::from_chain_id(3u64).unwrap();
        assert_eq!(ropsten.lockdrop_address, ROPSTEN.lockdrop_address);
        assert!(Deployment::from_chain_id(11155111u64).is_none());
    }

    #[test]
    fn test_builder() {
        let deployment = Deployment::builder()
            .lockdrop_address(MAINNET.lockdrop_address)
            .chain_id(1u64)
            .build()
            .unwrap();
        assert_eq!(deployment.chain_id, Some(1));
        assert_eq!(deployment.from_block, 0);
    }
}
