//! Inventory collaborator: контракт + дефолтная slot-реализация
//!
//! # Архитектура
//!
//! **InventoryPort**: всё, что combat core знает об инвентаре:
//! - `is_full()` перед дропом
//! - `add(item)` → `InventoryAddResult { success, slot_index }`
//!
//! **ItemCatalog**: статические определения предметов (ItemId → ItemDefinition),
//! захардкожены в `ItemCatalog::default()`.
//!
//! **ItemEffect / StatModifier**: контракт эффектов зелий и экипировки,
//! применяется через stat mutation hooks игрока (`Actor::adjust_stat`).
//!
//! Ошибки не бросаются: out-of-range слот и пр. возвращают sentinel результат
//! с `FailureReason`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::components::StatKind;
use crate::timers::Millis;

pub mod slots;

pub use slots::{SlotInventory, DEFAULT_SLOT_COUNT};

// ============================================================================
// ItemId
// ============================================================================

/// Item identifier (unique string ID)
///
/// # Examples
/// - "small_health_potion"
/// - "iron_sword"
/// - "dragon_plate"
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Reflect)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Effects contract
// ============================================================================

/// Изменение одного стата на `amount` (может быть отрицательным)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: StatKind,
    pub amount: f32,
}

impl StatModifier {
    pub fn new(stat: StatKind, amount: f32) -> Self {
        Self { stat, amount }
    }

    pub fn inverse(&self) -> Self {
        Self {
            stat: self.stat,
            amount: -self.amount,
        }
    }
}

/// Эффект consumable предмета
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal { amount: u32 },
    /// Модификатор снимается через `duration_ms`
    TimedBuff {
        modifier: StatModifier,
        duration_ms: Millis,
    },
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// Расходуется при использовании
    Consumable(ItemEffect),
    /// Постоянные модификаторы пока надето
    Equipment(Vec<StatModifier>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
}

/// Static item definitions (HashMap lookup)
#[derive(Resource, Debug, Clone)]
pub struct ItemCatalog {
    definitions: HashMap<ItemId, ItemDefinition>,
}

impl ItemCatalog {
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    pub fn insert(&mut self, definition: ItemDefinition) {
        self.definitions.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemDefinition> {
        self.definitions.get(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn consumable(&mut self, id: &str, name: &str, effect: ItemEffect) {
        self.insert(ItemDefinition {
            id: id.into(),
            name: name.to_string(),
            kind: ItemKind::Consumable(effect),
        });
    }

    fn equipment(&mut self, id: &str, name: &str, modifiers: Vec<StatModifier>) {
        self.insert(ItemDefinition {
            id: id.into(),
            name: name.to_string(),
            kind: ItemKind::Equipment(modifiers),
        });
    }
}

impl Default for ItemCatalog {
    /// Все предметы из drop tables (см. spawner::drops)
    fn default() -> Self {
        let mut catalog = Self::empty();

        // Tier 1
        catalog.consumable("small_health_potion", "Small Health Potion", ItemEffect::Heal { amount: 25 });
        catalog.consumable(
            "strength_tonic",
            "Strength Tonic",
            ItemEffect::TimedBuff {
                modifier: StatModifier::new(StatKind::AttackDamage, 5.0),
                duration_ms: 10_000,
            },
        );
        catalog.equipment("leather_boots", "Leather Boots", vec![StatModifier::new(StatKind::Speed, 10.0)]);

        // Tier 2
        catalog.consumable("health_potion", "Health Potion", ItemEffect::Heal { amount: 50 });
        catalog.equipment("iron_sword", "Iron Sword", vec![StatModifier::new(StatKind::AttackDamage, 8.0)]);
        catalog.equipment("swift_boots", "Swift Boots", vec![StatModifier::new(StatKind::Speed, 20.0)]);

        // Tier 3
        catalog.consumable("large_health_potion", "Large Health Potion", ItemEffect::Heal { amount: 100 });
        catalog.consumable(
            "berserker_elixir",
            "Berserker Elixir",
            ItemEffect::TimedBuff {
                modifier: StatModifier::new(StatKind::AttackDamage, 15.0),
                duration_ms: 15_000,
            },
        );
        catalog.equipment("chain_mail", "Chain Mail", vec![StatModifier::new(StatKind::MaxHealth, 30.0)]);

        // Tier 4
        catalog.consumable(
            "vitality_elixir",
            "Vitality Elixir",
            ItemEffect::TimedBuff {
                modifier: StatModifier::new(StatKind::MaxHealth, 50.0),
                duration_ms: 20_000,
            },
        );
        catalog.equipment(
            "knight_blade",
            "Knight Blade",
            vec![
                StatModifier::new(StatKind::AttackDamage, 20.0),
                StatModifier::new(StatKind::Speed, -10.0),
            ],
        );
        catalog.equipment("dragon_plate", "Dragon Plate", vec![StatModifier::new(StatKind::MaxHealth, 60.0)]);

        catalog
    }
}

// ============================================================================
// Port
// ============================================================================

/// Почему операция с инвентарём не удалась
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    SlotOutOfRange,
    SlotEmpty,
    UnknownItem,
    InventoryFull,
    ActorDead,
}

/// Результат `add` (sentinel вместо ошибки)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryAddResult {
    pub success: bool,
    pub slot_index: Option<usize>,
}

impl InventoryAddResult {
    pub fn added(slot_index: usize) -> Self {
        Self {
            success: true,
            slot_index: Some(slot_index),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            slot_index: None,
        }
    }
}

/// Результат использования слота
#[derive(Debug, Clone, PartialEq)]
pub enum UseItemResult {
    /// Consumable израсходован, эффект нужно применить к игроку
    Consumed { item: ItemId, effect: ItemEffect },
    /// Экипировка надета, модификаторы нужно применить
    Equipped { item: ItemId, modifiers: Vec<StatModifier> },
    Failed { reason: FailureReason },
}

/// Всё, что combat core требует от инвентаря
pub trait InventoryPort {
    fn is_full(&self) -> bool;
    fn add(&mut self, item: ItemId) -> InventoryAddResult;
}
