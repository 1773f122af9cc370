//! Slot-based item storage that takes part in transactions.
//!
//! A [`SlotInventory`] is a fixed number of slots, each empty or holding one
//! [`ItemStack`]. It implements both handler traits, so it can be either end
//! of a transaction and supports undo.
//!
//! All count arithmetic is checked; a slot never exceeds its limit.

use serde::{Deserialize, Serialize};

use colonies_types::{ItemKind, ItemStack};

use crate::handler::{ExtractionHandler, InsertionHandler};
use crate::result::TransactionResult;

/// Errors from direct slot manipulation (outside a transaction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    /// The slot index does not exist.
    #[error("slot {index} out of range for an inventory of {slots} slots")]
    SlotOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of slots.
        slots: usize,
    },

    /// The stack is larger than the slot may hold.
    #[error("stack of {count} exceeds the slot limit of {limit}")]
    ExceedsSlotLimit {
        /// The rejected count.
        count: u32,
        /// The limit for that item in this inventory.
        limit: u32,
    },
}

/// A fixed-size slot inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
    slot_limit: Option<u32>,
    allow_replace: bool,
}

impl SlotInventory {
    /// An inventory of `slots` empty slots.
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![None; slots],
            slot_limit: None,
            allow_replace: false,
        }
    }

    /// Cap every slot at `limit` items (below the item's own stack size).
    #[must_use]
    pub const fn with_slot_limit(mut self, limit: u32) -> Self {
        self.slot_limit = Some(limit);
        self
    }

    /// Let an insertion of a different item swap out the slot's contents.
    #[must_use]
    pub const fn allowing_replacement(mut self) -> Self {
        self.allow_replace = true;
        self
    }

    /// The number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The stack in `index`, if any.
    pub fn get(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// The largest count a slot of this inventory may hold of `item`.
    pub fn limit_for(&self, item: ItemKind) -> u32 {
        let max = item.max_stack_size();
        self.slot_limit.map_or(max, |limit| limit.min(max))
    }

    /// Overwrite slot `index`, returning its previous contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot does not exist or the stack is larger
    /// than the slot limit.
    pub fn set_slot(
        &mut self,
        index: usize,
        stack: Option<ItemStack>,
    ) -> Result<Option<ItemStack>, InventoryError> {
        let slots = self.slots.len();
        if let Some(stack) = stack {
            let limit = self.limit_for(stack.item);
            if stack.count > limit {
                return Err(InventoryError::ExceedsSlotLimit {
                    count: stack.count,
                    limit,
                });
            }
        }
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(InventoryError::SlotOutOfRange { index, slots })?;
        let stack = stack.filter(|s| !s.is_empty());
        Ok(std::mem::replace(slot, stack))
    }

    /// Iterate the occupied slots as `(index, stack)`.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|stack| (i, stack)))
    }

    /// Total count of `item` across all slots (saturating).
    pub fn count_of(&self, item: ItemKind) -> u32 {
        self.occupied()
            .filter(|(_, stack)| stack.item == item)
            .fold(0_u32, |acc, (_, stack)| acc.saturating_add(stack.count))
    }

    /// Total number of items held (saturating).
    pub fn total_items(&self) -> u32 {
        self.occupied()
            .fold(0_u32, |acc, (_, stack)| acc.saturating_add(stack.count))
    }

    /// Whether no slot holds anything.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// The first slot holding `item`.
    pub fn first_slot_with(&self, item: ItemKind) -> Option<usize> {
        self.occupied().find(|(_, s)| s.item == item).map(|(i, _)| i)
    }

    /// The first slot that can take at least one unit of `item`: a slot
    /// holding the same item with room left, otherwise the first empty one.
    pub fn first_slot_for(&self, item: ItemKind) -> Option<usize> {
        let limit = self.limit_for(item);
        self.slots
            .iter()
            .position(|slot| slot.is_some_and(|s| s.item == item && s.count < limit))
            .or_else(|| self.slots.iter().position(Option::is_none))
    }

    /// Spread `stack` over the inventory, merging first. Returns what did
    /// not fit.
    pub fn add_stack(&mut self, stack: ItemStack) -> Option<ItemStack> {
        let mut remaining = stack;
        while !remaining.is_empty() {
            let Some(index) = self.first_slot_for(remaining.item) else {
                return Some(remaining);
            };
            let result = self.perform_insertion(index, remaining);
            if result.is_failed() {
                return Some(remaining);
            }
            match result.into_payload() {
                Some(leftover) => remaining = leftover,
                None => return None,
            }
        }
        None
    }

    /// Remove up to `amount` of `item` from any slots. Returns what was
    /// removed, or `None` if the inventory held none.
    pub fn take_item(&mut self, item: ItemKind, amount: u32) -> Option<ItemStack> {
        let mut taken = 0_u32;
        while taken < amount {
            let Some(index) = self.first_slot_with(item) else {
                break;
            };
            let wanted = amount.saturating_sub(taken);
            let Some(stack) = self.perform_extraction(index, wanted).into_payload() else {
                break;
            };
            taken = taken.saturating_add(stack.count);
        }
        (taken > 0).then_some(ItemStack::new(item, taken))
    }
}

impl InsertionHandler<ItemStack> for SlotInventory {
    fn perform_insertion(&mut self, index: usize, item: ItemStack) -> TransactionResult<ItemStack> {
        let limit = self.limit_for(item.item);
        let allow_replace = self.allow_replace;
        let Some(slot) = self.slots.get_mut(index) else {
            return TransactionResult::failed();
        };
        if item.is_empty() {
            return TransactionResult::success();
        }

        match slot {
            None => {
                let accepted = item.count.min(limit);
                if accepted == 0 {
                    return TransactionResult::failed();
                }
                *slot = Some(item.with_count(accepted));
                leftover_result(item, accepted)
            }
            Some(existing) if existing.is_same_item(item) => {
                let room = limit.saturating_sub(existing.count);
                let accepted = item.count.min(room);
                let Some(count) = existing.count.checked_add(accepted) else {
                    return TransactionResult::failed();
                };
                if accepted == 0 {
                    return TransactionResult::failed();
                }
                existing.count = count;
                leftover_result(item, accepted)
            }
            Some(existing) => {
                if !allow_replace || item.count > limit {
                    return TransactionResult::failed();
                }
                let displaced = *existing;
                *existing = item;
                TransactionResult::replaced(displaced)
            }
        }
    }
}

impl ExtractionHandler<ItemStack> for SlotInventory {
    fn perform_extraction(&mut self, index: usize, amount: u32) -> TransactionResult<ItemStack> {
        let Some(slot) = self.slots.get_mut(index) else {
            return TransactionResult::failed();
        };
        let Some(stack) = slot.as_mut() else {
            return TransactionResult::failed();
        };
        let Some(taken) = stack.split(amount) else {
            return TransactionResult::failed();
        };
        if stack.is_empty() {
            *slot = None;
        }
        if taken.count < amount {
            TransactionResult::partial(taken)
        } else {
            TransactionResult::success_with(taken)
        }
    }
}

fn leftover_result(item: ItemStack, accepted: u32) -> TransactionResult<ItemStack> {
    match item.count.checked_sub(accepted) {
        Some(0) | None => TransactionResult::success(),
        Some(rest) => TransactionResult::partial(item.with_count(rest)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use colonies_types::TreeVariety;

    const OAK_LOG: ItemKind = ItemKind::Log(TreeVariety::Oak);

    fn seeded(slots: usize, index: usize, stack: ItemStack) -> SlotInventory {
        let mut inv = SlotInventory::new(slots);
        inv.set_slot(index, Some(stack)).unwrap();
        inv
    }

    #[test]
    fn out_of_range_insertion_fails() {
        let mut inv = SlotInventory::new(2);
        let result = inv.perform_insertion(2, ItemStack::new(OAK_LOG, 1));
        assert!(result.is_failed());
        assert!(inv.is_empty());
    }

    #[test]
    fn empty_slot_accepts_up_to_limit() {
        let mut inv = SlotInventory::new(1).with_slot_limit(4);
        let result = inv.perform_insertion(0, ItemStack::new(OAK_LOG, 10));
        assert!(result.is_partial());
        assert_eq!(result.payload(), Some(&ItemStack::new(OAK_LOG, 6)));
        assert_eq!(inv.get(0), Some(&ItemStack::new(OAK_LOG, 4)));
    }

    #[test]
    fn same_item_merges() {
        let mut inv = seeded(1, 0, ItemStack::new(OAK_LOG, 60));
        let result = inv.perform_insertion(0, ItemStack::new(OAK_LOG, 10));
        assert_eq!(result.payload(), Some(&ItemStack::new(OAK_LOG, 6)));
        assert_eq!(inv.count_of(OAK_LOG), 64);
    }

    #[test]
    fn full_slot_rejects_same_item() {
        let mut inv = seeded(1, 0, ItemStack::new(OAK_LOG, 64));
        assert!(inv.perform_insertion(0, ItemStack::new(OAK_LOG, 1)).is_failed());
    }

    #[test]
    fn different_item_fails_without_replacement() {
        let mut inv = seeded(1, 0, ItemStack::new(ItemKind::Dirt, 3));
        assert!(inv.perform_insertion(0, ItemStack::new(OAK_LOG, 1)).is_failed());
        assert_eq!(inv.get(0), Some(&ItemStack::new(ItemKind::Dirt, 3)));
    }

    #[test]
    fn different_item_replaces_when_allowed() {
        let mut inv = seeded(1, 0, ItemStack::new(ItemKind::Dirt, 3)).allowing_replacement();
        let result = inv.perform_insertion(0, ItemStack::new(OAK_LOG, 5));
        assert!(result.is_replaced());
        assert_eq!(result.payload(), Some(&ItemStack::new(ItemKind::Dirt, 3)));
        assert_eq!(inv.get(0), Some(&ItemStack::new(OAK_LOG, 5)));
    }

    #[test]
    fn zero_count_insertion_is_noop_success() {
        let mut inv = SlotInventory::new(1);
        let result = inv.perform_insertion(0, ItemStack::new(OAK_LOG, 0));
        assert!(result.is_complete_success());
        assert!(inv.is_empty());
    }

    #[test]
    fn extraction_rules() {
        let mut inv = seeded(2, 0, ItemStack::new(OAK_LOG, 5));
        assert!(inv.perform_extraction(0, 0).is_failed());
        assert!(inv.perform_extraction(1, 1).is_failed());
        assert!(inv.perform_extraction(7, 1).is_failed());

        let short = inv.perform_extraction(0, 8);
        assert!(short.is_partial());
        assert_eq!(short.payload(), Some(&ItemStack::new(OAK_LOG, 5)));
        assert!(inv.get(0).is_none());
    }

    #[test]
    fn full_extraction_hands_over_stack() {
        let mut inv = seeded(1, 0, ItemStack::new(OAK_LOG, 5));
        let result = inv.perform_extraction(0, 2);
        assert!(result.is_complete_success());
        assert_eq!(result.into_payload(), Some(ItemStack::new(OAK_LOG, 2)));
        assert_eq!(inv.count_of(OAK_LOG), 3);
    }

    #[test]
    fn add_stack_spreads_over_slots() {
        let mut inv = SlotInventory::new(2);
        assert_eq!(inv.add_stack(ItemStack::new(OAK_LOG, 100)), None);
        assert_eq!(inv.get(0).map(|s| s.count), Some(64));
        assert_eq!(inv.get(1).map(|s| s.count), Some(36));
        let rest = inv.add_stack(ItemStack::new(OAK_LOG, 40));
        assert_eq!(rest, Some(ItemStack::new(OAK_LOG, 12)));
    }

    #[test]
    fn take_item_collects_across_slots() {
        let mut inv = SlotInventory::new(3);
        inv.set_slot(0, Some(ItemStack::new(OAK_LOG, 3))).unwrap();
        inv.set_slot(2, Some(ItemStack::new(OAK_LOG, 4))).unwrap();
        assert_eq!(inv.take_item(OAK_LOG, 5), Some(ItemStack::new(OAK_LOG, 5)));
        assert_eq!(inv.count_of(OAK_LOG), 2);
        assert_eq!(inv.take_item(ItemKind::Dirt, 1), None);
    }

    #[test]
    fn set_slot_validates() {
        let mut inv = SlotInventory::new(1).with_slot_limit(8);
        assert!(matches!(
            inv.set_slot(3, None),
            Err(InventoryError::SlotOutOfRange { index: 3, slots: 1 })
        ));
        assert!(matches!(
            inv.set_slot(0, Some(ItemStack::new(OAK_LOG, 9))),
            Err(InventoryError::ExceedsSlotLimit { count: 9, limit: 8 })
        ));
    }

    #[test]
    fn serde_roundtrip_keeps_slot_order() {
        let inv = seeded(3, 2, ItemStack::new(OAK_LOG, 7));
        let json = serde_json::to_string(&inv).unwrap();
        let back: SlotInventory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inv);
        assert_eq!(back.first_slot_with(OAK_LOG), Some(2));
    }
}
