//! SlotInventory: фиксированное число слотов + список надетой экипировки

use super::{
    FailureReason, InventoryAddResult, InventoryPort, ItemCatalog, ItemId, ItemKind,
    StatModifier, UseItemResult,
};

pub const DEFAULT_SLOT_COUNT: usize = 12;

#[derive(Debug, Clone)]
pub struct SlotInventory {
    slots: Vec<Option<ItemId>>,
    equipped: Vec<ItemId>,
}

impl Default for SlotInventory {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}

impl SlotInventory {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            equipped: Vec::new(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&ItemId> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn item_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn equipped(&self) -> &[ItemId] {
        &self.equipped
    }

    /// Использовать предмет из слота.
    ///
    /// Consumable удаляется из слота, экипировка переезжает в `equipped`.
    /// Применение эффекта к игроку на вызывающем.
    pub fn use_slot(&mut self, index: usize, catalog: &ItemCatalog) -> UseItemResult {
        let Some(slot) = self.slots.get_mut(index) else {
            return UseItemResult::Failed {
                reason: FailureReason::SlotOutOfRange,
            };
        };
        let Some(item) = slot.clone() else {
            return UseItemResult::Failed {
                reason: FailureReason::SlotEmpty,
            };
        };
        let Some(definition) = catalog.get(&item) else {
            return UseItemResult::Failed {
                reason: FailureReason::UnknownItem,
            };
        };

        *slot = None;
        match &definition.kind {
            ItemKind::Consumable(effect) => UseItemResult::Consumed {
                item,
                effect: *effect,
            },
            ItemKind::Equipment(modifiers) => {
                self.equipped.push(item.clone());
                UseItemResult::Equipped {
                    item,
                    modifiers: modifiers.clone(),
                }
            }
        }
    }

    /// Снять экипировку обратно в сумку. Возвращает модификаторы,
    /// которые нужно откатить, или причину отказа.
    pub fn unequip(
        &mut self,
        equipped_index: usize,
        catalog: &ItemCatalog,
    ) -> Result<Vec<StatModifier>, FailureReason> {
        if equipped_index >= self.equipped.len() {
            return Err(FailureReason::SlotOutOfRange);
        }
        if self.is_full() {
            return Err(FailureReason::InventoryFull);
        }

        let item = self.equipped.remove(equipped_index);
        let modifiers = match catalog.get(&item).map(|definition| &definition.kind) {
            Some(ItemKind::Equipment(modifiers)) => modifiers.clone(),
            _ => Vec::new(),
        };
        self.add(item);
        Ok(modifiers)
    }
}

impl InventoryPort for SlotInventory {
    fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_some())
    }

    fn add(&mut self, item: ItemId) -> InventoryAddResult {
        match self.slots.iter().position(|slot| slot.is_none()) {
            Some(index) => {
                self.slots[index] = Some(item);
                InventoryAddResult::added(index)
            }
            None => InventoryAddResult::rejected(),
        }
    }
}
