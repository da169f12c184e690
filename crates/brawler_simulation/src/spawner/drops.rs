//! Drop tables: пул предметов зависит от уровня убитого врага

use rand::{Rng, RngCore};

use crate::inventory::ItemId;

/// Тир дропа: активен начиная с `min_level`
#[derive(Debug, Clone, PartialEq)]
pub struct DropTier {
    pub min_level: u32,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    /// По возрастанию min_level
    tiers: Vec<DropTier>,
}

impl Default for DropTable {
    /// 1-2, 3-4, 5-6, 7+
    fn default() -> Self {
        Self::new(vec![
            DropTier {
                min_level: 1,
                items: vec!["small_health_potion".into(), "strength_tonic".into(), "leather_boots".into()],
            },
            DropTier {
                min_level: 3,
                items: vec!["health_potion".into(), "iron_sword".into(), "swift_boots".into()],
            },
            DropTier {
                min_level: 5,
                items: vec!["large_health_potion".into(), "berserker_elixir".into(), "chain_mail".into()],
            },
            DropTier {
                min_level: 7,
                items: vec!["vitality_elixir".into(), "knight_blade".into(), "dragon_plate".into()],
            },
        ])
    }
}

impl DropTable {
    pub fn new(mut tiers: Vec<DropTier>) -> Self {
        tiers.sort_by_key(|tier| tier.min_level);
        Self { tiers }
    }

    /// Самый старший тир, доступный на этом уровне
    pub fn pool_for_level(&self, level: u32) -> &[ItemId] {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.min_level <= level)
            .or_else(|| self.tiers.first())
            .map(|tier| tier.items.as_slice())
            .unwrap_or(&[])
    }

    /// Roll на дроп: сначала шанс, потом равновероятный выбор из пула
    pub fn roll(&self, level: u32, drop_chance: f32, rng: &mut dyn RngCore) -> Option<ItemId> {
        if rng.gen::<f32>() >= drop_chance {
            return None;
        }
        let pool = self.pool_for_level(level);
        if pool.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..pool.len());
        pool.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_tier_by_level() {
        let table = DropTable::default();
        assert_eq!(table.pool_for_level(1)[0], ItemId::from("small_health_potion"));
        assert_eq!(table.pool_for_level(2)[0], ItemId::from("small_health_potion"));
        assert_eq!(table.pool_for_level(4)[1], ItemId::from("iron_sword"));
        assert_eq!(table.pool_for_level(6)[2], ItemId::from("chain_mail"));
        assert_eq!(table.pool_for_level(30)[2], ItemId::from("dragon_plate"));
    }

    #[test]
    fn test_roll_respects_chance() {
        let table = DropTable::default();

        let mut never = StepRng::new(u64::MAX, 0);
        assert_eq!(table.roll(1, 0.35, &mut never), None);

        let mut always = StepRng::new(0, 0);
        assert_eq!(table.roll(1, 0.35, &mut always), Some("small_health_potion".into()));
    }
}
