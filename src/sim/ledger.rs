//! Coins, hearts and owned upgrades
//!
//! Funds are split into coins picked up on the current stage and coins
//! banked from cleared stages. Purchases spend stage coins first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Something the shop sells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    /// One extra heart
    Heart,
    /// Speed shoes, tier 1..=4
    Shoe(u8),
}

impl ShopItem {
    /// Catalogue in shop order
    pub const CATALOGUE: [ShopItem; 5] = [
        ShopItem::Heart,
        ShopItem::Shoe(1),
        ShopItem::Shoe(2),
        ShopItem::Shoe(3),
        ShopItem::Shoe(4),
    ];

    /// Catalogue entry by shop index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::CATALOGUE.get(index).copied()
    }

    pub fn price(self) -> u32 {
        match self {
            ShopItem::Heart => 2,
            ShopItem::Shoe(tier) => 10 * 2u32.pow(tier.clamp(1, MAX_SHOE_TIER) as u32),
        }
    }

    /// Speed bonus granted by a shoe tier, in percent
    pub fn speed_bonus(self) -> u32 {
        match self {
            ShopItem::Heart => 0,
            ShopItem::Shoe(tier) => 10 * tier.clamp(1, MAX_SHOE_TIER) as u32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShopItem::Heart => "Heart",
            ShopItem::Shoe(1) => "Shoes",
            ShopItem::Shoe(2) => "Shiny Shoes",
            ShopItem::Shoe(3) => "Sparkling Shoes",
            ShopItem::Shoe(_) => "Legendary Shoes",
        }
    }
}

/// Why a purchase was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseRejection {
    InsufficientFunds { price: u32, available: u32 },
    AlreadyMaxHearts,
    AlreadyOwnsBetterShoe { owned: u8 },
}

impl fmt::Display for PurchaseRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFunds { price, available } => {
                write!(f, "not enough coins ({available}/{price})")
            }
            Self::AlreadyMaxHearts => write!(f, "hearts are already full"),
            Self::AlreadyOwnsBetterShoe { owned } => {
                write!(f, "already own shoes of tier {owned}")
            }
        }
    }
}

impl std::error::Error for PurchaseRejection {}

/// Upgrades bought so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Items {
    /// Hearts bought in the shop
    pub heart_bonus: u32,
    /// Movement speed bonus in percent
    pub speed_bonus: u32,
    /// Best shoe tier owned, 0 = none
    pub best_shoe: u8,
}

/// Ledger state captured when a stage is cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub coins: u32,
    pub hearts: u8,
    pub items: Items,
}

/// Coins, hearts and upgrades for one playthrough
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Coins picked up on the current stage
    pub stage_coins: u32,
    /// Coins banked from cleared stages
    pub cumulative_coins: u32,
    pub hearts: u8,
    pub max_hearts: u8,
    pub items: Items,
    starting_hearts: u8,
    last_clear: LedgerSnapshot,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(STARTING_HEARTS, MAX_HEARTS)
    }
}

impl Ledger {
    pub fn new(starting_hearts: u8, max_hearts: u8) -> Self {
        let hearts = starting_hearts.min(max_hearts);
        Self {
            stage_coins: 0,
            cumulative_coins: 0,
            hearts,
            max_hearts,
            items: Items::default(),
            starting_hearts: hearts,
            last_clear: LedgerSnapshot {
                coins: 0,
                hearts,
                items: Items::default(),
            },
        }
    }

    /// Coins available for spending
    pub fn funds(&self) -> u32 {
        self.stage_coins + self.cumulative_coins
    }

    pub fn collect_coin(&mut self) {
        self.stage_coins += 1;
    }

    /// Debug helper: add coins to the current stage
    pub fn grant_coins(&mut self, amount: u32) {
        self.stage_coins += amount;
    }

    /// Remove one heart; returns the hearts left
    pub fn lose_heart(&mut self) -> u8 {
        self.hearts = self.hearts.saturating_sub(1);
        self.hearts
    }

    pub fn is_out_of_hearts(&self) -> bool {
        self.hearts == 0
    }

    /// Movement speed multiplier from owned shoes
    pub fn speed_multiplier(&self) -> f32 {
        1.0 + self.items.speed_bonus as f32 / 100.0
    }

    /// Check a purchase without applying it
    pub fn can_buy(&self, item: ShopItem) -> Result<(), PurchaseRejection> {
        match item {
            ShopItem::Heart if self.hearts >= self.max_hearts => {
                return Err(PurchaseRejection::AlreadyMaxHearts);
            }
            ShopItem::Shoe(tier) if self.items.best_shoe >= tier.min(MAX_SHOE_TIER) => {
                return Err(PurchaseRejection::AlreadyOwnsBetterShoe {
                    owned: self.items.best_shoe,
                });
            }
            _ => {}
        }

        let price = item.price();
        if self.funds() < price {
            return Err(PurchaseRejection::InsufficientFunds {
                price,
                available: self.funds(),
            });
        }
        Ok(())
    }

    /// Buy an item, spending stage coins before banked coins
    pub fn purchase(&mut self, item: ShopItem) -> Result<(), PurchaseRejection> {
        self.can_buy(item)?;

        let price = item.price();
        if self.stage_coins >= price {
            self.stage_coins -= price;
        } else {
            let remainder = price - self.stage_coins;
            self.stage_coins = 0;
            self.cumulative_coins -= remainder;
        }

        match item {
            ShopItem::Heart => {
                self.hearts += 1;
                self.items.heart_bonus += 1;
            }
            ShopItem::Shoe(tier) => {
                self.items.best_shoe = tier.min(MAX_SHOE_TIER);
                self.items.speed_bonus = item.speed_bonus();
            }
        }
        log::info!("Bought {} for {price}, {} coins left", item.name(), self.funds());
        Ok(())
    }

    /// Bank stage coins and remember the state for "continue"
    pub fn bank_stage(&mut self) -> LedgerSnapshot {
        self.cumulative_coins += self.stage_coins;
        self.stage_coins = 0;
        self.last_clear = LedgerSnapshot {
            coins: self.cumulative_coins,
            hearts: self.hearts,
            items: self.items,
        };
        self.last_clear
    }

    pub fn last_clear(&self) -> LedgerSnapshot {
        self.last_clear
    }

    /// Roll back to the last cleared stage
    pub fn restore_last_clear(&mut self) {
        let snapshot = self.last_clear;
        self.stage_coins = 0;
        self.cumulative_coins = snapshot.coins;
        self.hearts = snapshot.hearts;
        self.items = snapshot.items;
    }

    /// Back to a fresh playthrough
    pub fn reset(&mut self) {
        *self = Self::new(self.starting_hearts, self.max_hearts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(stage: u32, cumulative: u32) -> Ledger {
        let mut ledger = Ledger::default();
        ledger.stage_coins = stage;
        ledger.cumulative_coins = cumulative;
        ledger
    }

    #[test]
    fn test_catalogue_prices() {
        let prices: Vec<_> = ShopItem::CATALOGUE.iter().map(|i| i.price()).collect();
        assert_eq!(prices, vec![2, 20, 40, 80, 160]);
        assert_eq!(ShopItem::Shoe(3).speed_bonus(), 30);
        assert_eq!(ShopItem::from_index(0), Some(ShopItem::Heart));
        assert_eq!(ShopItem::from_index(4), Some(ShopItem::Shoe(4)));
        assert_eq!(ShopItem::from_index(5), None);
    }

    #[test]
    fn test_insufficient_funds_leaves_coins() {
        let mut ledger = ledger_with(5, 0);
        let result = ledger.purchase(ShopItem::Shoe(1));
        assert_eq!(
            result,
            Err(PurchaseRejection::InsufficientFunds {
                price: 20,
                available: 5
            })
        );
        assert_eq!(ledger.stage_coins, 5);
        assert_eq!(ledger.cumulative_coins, 0);
        assert_eq!(ledger.items.best_shoe, 0);
    }

    #[test]
    fn test_spends_stage_coins_first() {
        let mut ledger = ledger_with(15, 10);
        ledger.purchase(ShopItem::Shoe(1)).unwrap();
        assert_eq!(ledger.stage_coins, 0);
        assert_eq!(ledger.cumulative_coins, 5);
        assert_eq!(ledger.items.best_shoe, 1);
        assert_eq!(ledger.items.speed_bonus, 10);
        assert!((ledger.speed_multiplier() - 1.1).abs() < 1e-6);

        let mut rich_stage = ledger_with(30, 10);
        rich_stage.purchase(ShopItem::Shoe(1)).unwrap();
        assert_eq!(rich_stage.stage_coins, 10);
        assert_eq!(rich_stage.cumulative_coins, 10);
    }

    #[test]
    fn test_shoe_tier_never_decreases() {
        let mut ledger = ledger_with(1000, 0);
        ledger.purchase(ShopItem::Shoe(3)).unwrap();
        for tier in 1..=3 {
            assert_eq!(
                ledger.purchase(ShopItem::Shoe(tier)),
                Err(PurchaseRejection::AlreadyOwnsBetterShoe { owned: 3 })
            );
        }
        assert_eq!(ledger.items.best_shoe, 3);
        ledger.purchase(ShopItem::Shoe(4)).unwrap();
        assert_eq!(ledger.items.best_shoe, 4);
        assert_eq!(ledger.items.speed_bonus, 40);
    }

    #[test]
    fn test_blocked_upgrade_reported_before_funds() {
        let mut ledger = ledger_with(0, 0);
        ledger.items.best_shoe = 2;
        assert_eq!(
            ledger.can_buy(ShopItem::Shoe(2)),
            Err(PurchaseRejection::AlreadyOwnsBetterShoe { owned: 2 })
        );
        ledger.hearts = ledger.max_hearts;
        assert_eq!(
            ledger.can_buy(ShopItem::Heart),
            Err(PurchaseRejection::AlreadyMaxHearts)
        );
    }

    #[test]
    fn test_heart_purchase_until_cap() {
        let mut ledger = ledger_with(100, 0);
        while ledger.hearts < MAX_HEARTS {
            ledger.purchase(ShopItem::Heart).unwrap();
        }
        assert_eq!(ledger.items.heart_bonus, (MAX_HEARTS - STARTING_HEARTS) as u32);
        assert_eq!(
            ledger.purchase(ShopItem::Heart),
            Err(PurchaseRejection::AlreadyMaxHearts)
        );
        assert_eq!(ledger.hearts, MAX_HEARTS);
    }

    #[test]
    fn test_bank_and_restore() {
        let mut ledger = ledger_with(7, 3);
        ledger.purchase(ShopItem::Heart).unwrap();
        let snapshot = ledger.bank_stage();
        assert_eq!(snapshot.coins, 8);
        assert_eq!(snapshot.hearts, 4);
        assert_eq!(ledger.stage_coins, 0);

        // Lose progress on the next stage
        ledger.collect_coin();
        ledger.lose_heart();
        ledger.lose_heart();
        ledger.restore_last_clear();
        assert_eq!(ledger.cumulative_coins, 8);
        assert_eq!(ledger.stage_coins, 0);
        assert_eq!(ledger.hearts, 4);
        assert_eq!(ledger.items.heart_bonus, 1);
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut ledger = ledger_with(500, 500);
        ledger.purchase(ShopItem::Shoe(4)).unwrap();
        ledger.bank_stage();
        ledger.reset();
        assert_eq!(ledger.hearts, 3);
        assert_eq!(ledger.funds(), 0);
        assert_eq!(ledger.items, Items::default());
        assert_eq!(ledger.last_clear().coins, 0);
    }

    #[test]
    fn test_lose_heart_saturates() {
        let mut ledger = Ledger::new(1, 7);
        assert_eq!(ledger.lose_heart(), 0);
        assert_eq!(ledger.lose_heart(), 0);
        assert!(ledger.is_out_of_hearts());
    }
}
