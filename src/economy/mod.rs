//! Economy domain: energy budget, coins, seed inventory and the seed shop.
//!
//! All mutations are all-or-nothing: a request that would drive energy,
//! coins or a seed count below zero is rejected before anything changes.

use crate::shared::*;

impl EconomyState {
    /// Fresh economy for a new farm.
    pub fn starter(config: &FarmConfig) -> Self {
        Self {
            energy: MAX_ENERGY,
            coins: config.starting_coins,
            inventory: config
                .starter_seeds
                .iter()
                .filter(|(_, &count)| count > 0)
                .map(|(key, &count)| (key.clone(), count))
                .collect(),
        }
    }

    pub fn seeds(&self, key: &str) -> u32 {
        self.inventory.get(key).copied().unwrap_or(0)
    }

    pub fn ensure_energy(&self, cost: u32) -> Result<(), ActionError> {
        if self.energy < cost {
            Err(ActionError::InsufficientEnergy {
                needed: cost,
                available: self.energy,
            })
        } else {
            Ok(())
        }
    }

    pub fn spend_energy(&mut self, cost: u32) -> Result<(), ActionError> {
        self.ensure_energy(cost)?;
        self.energy -= cost;
        Ok(())
    }

    pub fn ensure_seed(&self, key: &str) -> Result<(), ActionError> {
        if self.seeds(key) == 0 {
            Err(ActionError::InsufficientSeedStock(key.to_string()))
        } else {
            Ok(())
        }
    }

    /// Take one seed. Returns the remaining count; the key is dropped at zero.
    pub fn take_seed(&mut self, key: &str) -> Result<u32, ActionError> {
        self.ensure_seed(key)?;
        let remaining = self.seeds(key) - 1;
        if remaining == 0 {
            self.inventory.remove(key);
        } else {
            self.inventory.insert(key.to_string(), remaining);
        }
        Ok(remaining)
    }

    pub fn add_seeds(&mut self, key: &str, count: u32) -> u32 {
        if count == 0 {
            return self.seeds(key);
        }
        let entry = self.inventory.entry(key.to_string()).or_insert(0);
        *entry = entry.saturating_add(count);
        *entry
    }

    pub fn earn(&mut self, coins: u32) {
        self.coins = self.coins.saturating_add(coins);
    }

    pub fn spend_coins(&mut self, cost: u32) -> Result<(), ActionError> {
        if self.coins < cost {
            return Err(ActionError::InsufficientCoins {
                needed: cost,
                available: self.coins,
            });
        }
        self.coins -= cost;
        Ok(())
    }

    pub fn restore_energy(&mut self) {
        self.energy = MAX_ENERGY;
    }
}

/// Buy one pack of seeds at the species' seed cost. Returns the new stock.
pub fn buy_seeds(
    economy: &mut EconomyState,
    catalog: &PlantCatalog,
    key: &str,
    pack_size: u32,
) -> Result<u32, ActionError> {
    let species = catalog.lookup(key)?;
    economy.spend_coins(species.seed_cost)?;
    Ok(economy.add_seeds(key, pack_size))
}

/// Format a coin amount with thousands separators: `1234` → `"1,234c"`.
pub fn format_coins(amount: u32) -> String {
    let digits: Vec<char> = amount.to_string().chars().collect();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*ch);
    }
    result.push('c');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PlantCatalog {
        PlantCatalog::new(vec![PlantSpecies {
            key: "saffron".into(),
            id: 101,
            name: "Saffron".into(),
            family: Family::Premium,
            emoji: String::new(),
            growth_time: 8,
            base_sell_price: 120,
            seed_cost: 50,
            water_needed: 2,
        }])
        .unwrap()
    }

    #[test]
    fn test_starter_economy_matches_config() {
        let economy = EconomyState::starter(&FarmConfig::default());
        assert_eq!(economy.energy, 100);
        assert_eq!(economy.coins, 500);
        assert_eq!(economy.seeds("tomato"), 10);
        assert_eq!(economy.seeds("ginseng"), 2);
        assert_eq!(economy.seeds("saffron"), 0);
    }

    #[test]
    fn test_spend_energy_rejects_without_mutation() {
        let mut economy = EconomyState {
            energy: 4,
            ..Default::default()
        };
        assert_eq!(
            economy.spend_energy(5),
            Err(ActionError::InsufficientEnergy {
                needed: 5,
                available: 4
            })
        );
        assert_eq!(economy.energy, 4);
        economy.spend_energy(4).unwrap();
        assert_eq!(economy.energy, 0);
    }

    #[test]
    fn test_take_last_seed_removes_key() {
        let mut economy = EconomyState::default();
        economy.add_seeds("basil", 1);
        assert_eq!(economy.take_seed("basil"), Ok(0));
        assert!(!economy.inventory.contains_key("basil"));
        assert_eq!(
            economy.take_seed("basil"),
            Err(ActionError::InsufficientSeedStock("basil".into()))
        );
    }

    #[test]
    fn test_buy_seeds() {
        let catalog = catalog();
        let mut economy = EconomyState {
            coins: 120,
            ..Default::default()
        };
        assert_eq!(buy_seeds(&mut economy, &catalog, "saffron", 5), Ok(5));
        assert_eq!(economy.coins, 70);
        assert_eq!(buy_seeds(&mut economy, &catalog, "saffron", 5), Ok(10));
        assert_eq!(economy.coins, 20);

        assert_eq!(
            buy_seeds(&mut economy, &catalog, "saffron", 5),
            Err(ActionError::InsufficientCoins {
                needed: 50,
                available: 20
            })
        );
        assert_eq!(economy.seeds("saffron"), 10);
        assert!(matches!(
            buy_seeds(&mut economy, &catalog, "mystery", 5),
            Err(ActionError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_format_coins() {
        assert_eq!(format_coins(0), "0c");
        assert_eq!(format_coins(500), "500c");
        assert_eq!(format_coins(1234), "1,234c");
        assert_eq!(format_coins(1_000_000), "1,000,000c");
    }
}
