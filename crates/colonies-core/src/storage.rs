//! Moving items between inventories through transactions.
//!
//! Every item that changes hands in the colony goes through a
//! [`TransactionProcessor`], so a rejected or partial insertion is rolled
//! back into the source instead of losing items.

use tracing::{error, warn};

use colonies_transactions::conservation::{self, ConservationResult};
use colonies_transactions::{SlotInventory, TracingCallback, Transaction, TransactionProcessor};
use colonies_types::ItemKind;

use crate::error::CoreError;

/// Move up to `amount` units of `item` from `source` into `target`, one
/// slot-to-slot transaction at a time. Returns the number of units moved.
///
/// Stops early when `source` runs out, `target` has no slot left for the
/// item, or a transaction fails.
pub fn transfer(
    target: &mut SlotInventory,
    source: &mut SlotInventory,
    item: ItemKind,
    amount: u32,
) -> Result<u32, CoreError> {
    let mut moved = 0_u32;
    while moved < amount {
        let Some(from) = source.first_slot_with(item) else {
            break;
        };
        let Some(into) = target.first_slot_for(item) else {
            warn!(?item, remaining = amount.saturating_sub(moved), "no room left for items");
            break;
        };
        let before = target.count_of(item);

        let (result, stranded) = {
            let mut tx =
                Transaction::between(target, into, source, from, amount.saturating_sub(moved));
            let result = TransactionProcessor::new(&mut tx, TracingCallback).execute()?;
            if let ConservationResult::Anomaly(anomaly) = conservation::audit(&tx) {
                error!(?anomaly, ?item, "item transfer did not balance");
            }
            (result, tx.take_stranded())
        };

        for stack in stranded {
            if let Some(lost) = source.add_stack(stack) {
                error!(?lost, "stranded items could not be put back");
            }
        }

        let gained = target.count_of(item).saturating_sub(before);
        moved = moved.saturating_add(gained);
        if !result.is_successful() || gained == 0 {
            break;
        }
    }
    Ok(moved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use colonies_types::{ItemStack, TreeVariety};

    const LOG: ItemKind = ItemKind::Log(TreeVariety::Oak);

    #[test]
    fn moves_across_several_slots() {
        let mut source = SlotInventory::new(3);
        source.set_slot(0, Some(ItemStack::new(LOG, 40))).unwrap();
        source.set_slot(2, Some(ItemStack::new(LOG, 40))).unwrap();
        let mut target = SlotInventory::new(2);
        target.set_slot(0, Some(ItemStack::new(LOG, 60))).unwrap();

        let moved = transfer(&mut target, &mut source, LOG, u32::MAX).unwrap();
        assert_eq!(moved, 68);
        assert_eq!(target.count_of(LOG), 128);
        assert_eq!(source.count_of(LOG), 12);
    }

    #[test]
    fn respects_the_requested_amount() {
        let mut source = SlotInventory::new(1);
        source.set_slot(0, Some(ItemStack::new(LOG, 10))).unwrap();
        let mut target = SlotInventory::new(1);

        assert_eq!(transfer(&mut target, &mut source, LOG, 4).unwrap(), 4);
        assert_eq!(source.count_of(LOG), 6);
    }

    #[test]
    fn full_target_moves_nothing() {
        let mut source = SlotInventory::new(1);
        source.set_slot(0, Some(ItemStack::new(LOG, 10))).unwrap();
        let mut target = SlotInventory::new(1);
        target.set_slot(0, Some(ItemStack::new(ItemKind::Dirt, 1))).unwrap();

        assert_eq!(transfer(&mut target, &mut source, LOG, 10).unwrap(), 0);
        assert_eq!(source.count_of(LOG), 10);
    }
}
