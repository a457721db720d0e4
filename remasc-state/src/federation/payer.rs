//! Federation payout with carry-over.
//!
//! The federation's earmark is taken out of every payout. If splitting the
//! pooled earmarks between the federators would give each less than a
//! gas-cost floor, nothing is paid and the pool is carried to the next cycle.

use remasc_core::{BlockHeader, RemascConfig, U256};
use tracing::{debug, warn};

use crate::error::{RemascError, RemascResult};
use crate::execute::FeesPayer;
use crate::federation::FederationProvider;
use crate::ledger::Ledger;
use crate::math;
use crate::state::Repository;

/// Result of one federation payout step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FederationPayout {
    /// Amount taken out of the payout for the federation, paid or not.
    pub earmark: U256,
    /// Whether the pool was distributed this cycle.
    pub distributed: bool,
}

/// Computes and pays the federation's share of a payout.
pub struct FederationPayer<'a> {
    config: &'a RemascConfig,
    federation: &'a dyn FederationProvider,
}

impl<'a> FederationPayer<'a> {
    /// Payer using the federation reported by `federation`.
    pub fn new(config: &'a RemascConfig, federation: &'a dyn FederationProvider) -> Self {
        Self { config, federation }
    }

    /// Take the federation's earmark out of `synthetic` and pay or carry the pool.
    ///
    /// The earmark is returned whether or not it was disbursed; the caller
    /// subtracts it from the amount left for miners either way.
    pub fn pay<R: Repository + ?Sized>(
        &self,
        repo: &mut R,
        ledger: &mut Ledger,
        payer: &mut FeesPayer,
        processing: &BlockHeader,
        execution: &BlockHeader,
        synthetic: U256,
    ) -> RemascResult<FederationPayout> {
        let earmark = math::div(synthetic, self.config.federation_divisor)?;
        let pool = math::add(ledger.federation_balance(repo)?, earmark)?;

        let federators = self.federation.federation_size(processing)?;
        if federators == 0 {
            return Err(RemascError::EmptyFederation);
        }
        let (per_federator, remainder) = math::div_mod(pool, federators as u64)?;

        if self.config.gas_floor_active(execution.number) {
            let floor = math::mul(
                execution.minimum_gas_price,
                U256::from(self.config.federator_minimum_payable_gas),
            )?;
            if per_federator < floor {
                warn!(%pool, %per_federator, %floor, "federator share below gas floor, carrying over");
                ledger.set_federation_balance(pool);
                return Ok(FederationPayout {
                    earmark,
                    distributed: false,
                });
            }
        }

        ledger.set_federation_balance(U256::zero());
        let processing_hash = processing.hash();
        for index in 0..federators {
            let address = self.federation.federator_address(processing, index)?;
            let amount = if index == federators - 1 {
                math::add(per_federator, remainder)?
            } else {
                per_federator
            };
            payer.pay(repo, &processing_hash, amount, &address)?;
        }
        debug!(%pool, federators, "paid federation");

        Ok(FederationPayout {
            earmark,
            distributed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execute::decode_payment;
    use crate::federation::StaticFederation;
    use crate::state::MemoryRepository;
    use proptest::prelude::*;
    use remasc_core::Address;

    const CONTRACT: Address = [0xCC; 20];

    fn config(federator_minimum_payable_gas: u64) -> RemascConfig {
        RemascConfig {
            federation_divisor: 10,
            federator_minimum_payable_gas,
            ..RemascConfig::regtest()
        }
    }

    fn execution(gas_price: u64) -> BlockHeader {
        BlockHeader {
            number: 100,
            minimum_gas_price: U256::from(gas_price),
            ..BlockHeader::default()
        }
    }

    fn funded_repo() -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        repo.credit(&CONTRACT, U256::from(1_000_000u64)).unwrap();
        repo
    }

    #[test]
    fn test_remainder_goes_to_last_federator() {
        let config = config(0);
        let federation = StaticFederation::new(vec![[1u8; 20], [2u8; 20], [3u8; 20]]);
        let mut repo = funded_repo();
        let mut ledger = Ledger::new(CONTRACT);
        let mut payer = FeesPayer::new(CONTRACT);

        let payout = FederationPayer::new(&config, &federation)
            .pay(
                &mut repo,
                &mut ledger,
                &mut payer,
                &BlockHeader::default(),
                &execution(1),
                U256::from(1_000u64),
            )
            .unwrap();

        assert_eq!(payout.earmark, U256::from(100u64));
        assert!(payout.distributed);
        assert_eq!(repo.balance_of(&[1u8; 20]), U256::from(33u64));
        assert_eq!(repo.balance_of(&[2u8; 20]), U256::from(33u64));
        assert_eq!(repo.balance_of(&[3u8; 20]), U256::from(34u64));
        assert_eq!(ledger.federation_balance(&mut repo).unwrap(), U256::zero());
        assert_eq!(repo.logs.len(), 3);
        assert_eq!(decode_payment(&repo.logs[2]).unwrap().1, U256::from(34u64));
    }

    #[test]
    fn test_carry_over_below_floor_then_release() {
        // Each federator needs at least 10 * 3 = 30.
        let config = config(10);
        let federation = StaticFederation::new(vec![[1u8; 20], [2u8; 20]]);
        let mut repo = funded_repo();
        let mut ledger = Ledger::new(CONTRACT);
        let mut payer = FeesPayer::new(CONTRACT);
        let fed_payer = FederationPayer::new(&config, &federation);

        let first = fed_payer
            .pay(&mut repo, &mut ledger, &mut payer, &BlockHeader::default(), &execution(3), U256::from(400u64))
            .unwrap();
        assert_eq!(first.earmark, U256::from(40u64));
        assert!(!first.distributed);
        assert_eq!(ledger.federation_balance(&mut repo).unwrap(), U256::from(40u64));
        assert_eq!(payer.payments(), 0);

        let second = fed_payer
            .pay(&mut repo, &mut ledger, &mut payer, &BlockHeader::default(), &execution(3), U256::from(250u64))
            .unwrap();
        assert_eq!(second.earmark, U256::from(25u64));
        assert!(second.distributed);
        assert_eq!(ledger.federation_balance(&mut repo).unwrap(), U256::zero());
        assert_eq!(repo.balance_of(&[1u8; 20]), U256::from(32u64));
        assert_eq!(repo.balance_of(&[2u8; 20]), U256::from(33u64));
    }

    #[test]
    fn test_floor_ignored_before_activation() {
        let mut config = config(1_000);
        config.activations.gas_floor = Some(101);
        let federation = StaticFederation::new(vec![[1u8; 20]]);
        let mut repo = funded_repo();
        let mut ledger = Ledger::new(CONTRACT);
        let mut payer = FeesPayer::new(CONTRACT);

        let payout = FederationPayer::new(&config, &federation)
            .pay(&mut repo, &mut ledger, &mut payer, &BlockHeader::default(), &execution(1), U256::from(10u64))
            .unwrap();
        assert!(payout.distributed);
        assert_eq!(repo.balance_of(&[1u8; 20]), U256::one());
    }

    #[test]
    fn test_empty_federation_is_fatal() {
        let config = config(0);
        let federation = StaticFederation::default();
        let mut repo = funded_repo();
        let mut ledger = Ledger::new(CONTRACT);
        let mut payer = FeesPayer::new(CONTRACT);

        let err = FederationPayer::new(&config, &federation)
            .pay(&mut repo, &mut ledger, &mut payer, &BlockHeader::default(), &execution(1), U256::from(10u64))
            .unwrap_err();
        assert_eq!(err, RemascError::EmptyFederation);
    }

    proptest! {
        #[test]
        fn prop_federator_remainder_law(synthetic in 0u64..1_000_000_000, members in 1u8..32) {
            let config = config(0);
            let addresses: Vec<Address> = (1..=members).map(|i| [i; 20]).collect();
            let federation = StaticFederation::new(addresses.clone());
            let mut repo = MemoryRepository::new();
            repo.credit(&CONTRACT, U256::from(synthetic)).unwrap();
            let mut ledger = Ledger::new(CONTRACT);
            let mut payer = FeesPayer::new(CONTRACT);

            let payout = FederationPayer::new(&config, &federation)
                .pay(&mut repo, &mut ledger, &mut payer, &BlockHeader::default(), &execution(1), U256::from(synthetic))
                .unwrap();

            let paid = addresses
                .iter()
                .fold(U256::zero(), |acc, a| acc + repo.balance_of(a));
            prop_assert_eq!(paid, payout.earmark);
            prop_assert_eq!(payer.payments(), members as usize);

            let share = repo.balance_of(&addresses[0]);
            let last = repo.balance_of(&addresses[addresses.len() - 1]);
            prop_assert!(last - share < U256::from(members as u64));
        }
    }
}
