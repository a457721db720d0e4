//! Federation membership lookup.

use remasc_core::{Address, BlockHeader};

use crate::error::{RemascError, RemascResult};

/// Source of the federation members entitled to a payout.
///
/// Membership is resolved as of the processing block, so a federation change
/// never affects payouts for blocks mined before it.
pub trait FederationProvider {
    /// Number of federators as of `processing`.
    fn federation_size(&self, processing: &BlockHeader) -> RemascResult<usize>;

    /// Address of federator `index` as of `processing`.
    fn federator_address(&self, processing: &BlockHeader, index: usize) -> RemascResult<Address>;
}

/// Federation with a fixed member list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticFederation {
    members: Vec<Address>,
}

impl StaticFederation {
    /// Federation made of `members`, in payout order.
    pub fn new(members: Vec<Address>) -> Self {
        Self { members }
    }

    /// Members in payout order.
    pub fn members(&self) -> &[Address] {
        &self.members
    }
}

impl FederationProvider for StaticFederation {
    fn federation_size(&self, _processing: &BlockHeader) -> RemascResult<usize> {
        Ok(self.members.len())
    }

    fn federator_address(&self, _processing: &BlockHeader, index: usize) -> RemascResult<Address> {
        self.members
            .get(index)
            .copied()
            .ok_or(RemascError::FederatorNotFound {
                index,
                size: self.members.len(),
            })
    }
}
