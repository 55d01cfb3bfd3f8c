//! # Player Accounts
//!
//! The per-player ledger of credits, resource balances and gear. All
//! debits are checked; a failed debit changes nothing.

use std::collections::HashMap;

use blackice_shared::ResourceKind;

use crate::error::{MarketError, MarketResult};

/// A player's ledger.
#[derive(Clone, Debug, Default)]
pub struct Account {
    credits: u64,
    resources: HashMap<ResourceKind, u32>,
    gear: HashMap<String, u32>,
}

impl Account {
    /// Creates an account with a starting credit balance.
    #[must_use]
    pub fn new(starting_credits: u64) -> Self {
        Self {
            credits: starting_credits,
            resources: HashMap::new(),
            gear: HashMap::new(),
        }
    }

    /// Current credit balance.
    #[must_use]
    pub const fn credits(&self) -> u64 {
        self.credits
    }

    /// Checks that at least `amount` credits are on hand.
    ///
    /// # Errors
    ///
    /// [`MarketError::InsufficientCredits`] when the balance is short.
    pub fn ensure_credits(&self, amount: u64) -> MarketResult<()> {
        if self.credits < amount {
            return Err(MarketError::InsufficientCredits {
                needed: amount,
                available: self.credits,
            });
        }
        Ok(())
    }

    /// Debits credits.
    ///
    /// # Errors
    ///
    /// [`MarketError::InsufficientCredits`] when the balance is short;
    /// the balance is untouched in that case.
    pub fn charge(&mut self, amount: u64) -> MarketResult<()> {
        self.ensure_credits(amount)?;
        self.credits -= amount;
        Ok(())
    }

    /// Credits the balance.
    pub fn deposit(&mut self, amount: u64) {
        self.credits = self.credits.saturating_add(amount);
    }

    /// On-hand amount of a resource.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> u32 {
        self.resources.get(&kind).copied().unwrap_or(0)
    }

    /// Removes resources from the on-hand balance (escrow or
    /// consumption).
    ///
    /// # Errors
    ///
    /// [`MarketError::InsufficientResources`] when the balance is
    /// short; the balance is untouched in that case.
    pub fn take_resource(&mut self, kind: ResourceKind, amount: u32) -> MarketResult<()> {
        let available = self.resource(kind);
        if available < amount {
            return Err(MarketError::InsufficientResources {
                resource: kind.as_str(),
                needed: amount,
                available,
            });
        }
        self.resources.insert(kind, available - amount);
        Ok(())
    }

    /// Adds resources to the on-hand balance.
    pub fn give_resource(&mut self, kind: ResourceKind, amount: u32) {
        *self.resources.entry(kind).or_insert(0) += amount;
    }

    /// Owned count of a gear item.
    #[must_use]
    pub fn gear(&self, item_id: &str) -> u32 {
        self.gear.get(item_id).copied().unwrap_or(0)
    }

    /// Adds gear (computers, modules, contraband).
    pub fn give_gear(&mut self, item_id: &str, amount: u32) {
        *self.gear.entry(item_id.to_owned()).or_insert(0) += amount;
    }

    /// Removes gear.
    ///
    /// # Errors
    ///
    /// [`MarketError::InsufficientResources`] when the count is short.
    pub fn take_gear(&mut self, item_id: &'static str, amount: u32) -> MarketResult<()> {
        let available = self.gear(item_id);
        if available < amount {
            return Err(MarketError::InsufficientResources {
                resource: item_id,
                needed: amount,
                available,
            });
        }
        self.gear.insert(item_id.to_owned(), available - amount);
        Ok(())
    }

    /// Snapshot of all resource balances, for response payloads.
    #[must_use]
    pub fn resource_balances(&self) -> HashMap<&'static str, u32> {
        ResourceKind::ALL
            .iter()
            .map(|&kind| (kind.as_str(), self.resource(kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_charge_changes_nothing() {
        let mut account = Account::new(100);
        let result = account.charge(150);
        assert!(matches!(
            result,
            Err(MarketError::InsufficientCredits {
                needed: 150,
                available: 100
            })
        ));
        assert_eq!(account.credits(), 100);
    }

    #[test]
    fn test_resource_take_and_give() {
        let mut account = Account::new(0);
        account.give_resource(ResourceKind::DataPackets, 25);
        account.take_resource(ResourceKind::DataPackets, 10).unwrap();
        assert_eq!(account.resource(ResourceKind::DataPackets), 15);

        let short = account.take_resource(ResourceKind::DataPackets, 20);
        assert!(short.is_err());
        assert_eq!(account.resource(ResourceKind::DataPackets), 15);
    }

    #[test]
    fn test_gear_counts() {
        let mut account = Account::new(0);
        account.give_gear("coprocessor", 2);
        account.take_gear("coprocessor", 1).unwrap();
        assert_eq!(account.gear("coprocessor"), 1);
        assert!(account.take_gear("coprocessor", 5).is_err());
    }
}
