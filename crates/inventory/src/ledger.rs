//! Stock recomputation from the append-only entry/exit ledger.

use std::collections::BTreeMap;

use almox_core::ItemId;

use crate::consumption::QUANTITY_EPSILON;
use crate::item::Item;
use crate::movement::{Entry, Exit};

/// Fold the ledger into a per-item stock total.
pub fn recompute_stock<'a, E, X>(entries: E, exits: X) -> BTreeMap<ItemId, f64>
where
    E: IntoIterator<Item = &'a Entry>,
    X: IntoIterator<Item = &'a Exit>,
{
    let mut totals: BTreeMap<ItemId, f64> = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.item_id.clone()).or_default() += entry.quantidade;
    }
    for exit in exits {
        *totals.entry(exit.item_id.clone()).or_default() -= exit.quantidade;
    }
    totals
}

/// Stored stock of one item compared against its batches and the ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockAudit {
    pub stored: f64,
    pub batches: f64,
    pub ledger: f64,
}

impl StockAudit {
    pub fn is_consistent(&self) -> bool {
        (self.stored - self.batches).abs() < QUANTITY_EPSILON
            && (self.stored - self.ledger).abs() < QUANTITY_EPSILON
    }
}

pub fn audit_item<'a, E, X>(item_id: &ItemId, item: &Item, entries: E, exits: X) -> StockAudit
where
    E: IntoIterator<Item = &'a Entry>,
    X: IntoIterator<Item = &'a Exit>,
{
    let ledger = entries
        .into_iter()
        .filter(|e| &e.item_id == item_id)
        .map(|e| e.quantidade)
        .sum::<f64>()
        - exits
            .into_iter()
            .filter(|x| &x.item_id == item_id)
            .map(|x| x.quantidade)
            .sum::<f64>();

    StockAudit {
        stored: item.quantidade(),
        batches: item.batch_total(),
        ledger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use crate::movement::{NewEntry, NewExit};
    use chrono::Utc;

    fn item() -> Item {
        Item::create(
            NewItem {
                nome: "Copo descartável".to_string(),
                ..NewItem::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn entry(item_id: &ItemId, item: &Item, q: f64) -> Entry {
        Entry::record(item_id.clone(), item, &NewEntry::default(), q, None, Utc::now())
    }

    fn exit(item_id: &ItemId, item: &Item, q: f64) -> Exit {
        Exit::record(
            item_id.clone(),
            item,
            &NewExit::default(),
            q,
            Vec::new(),
            None,
            Utc::now(),
        )
    }

    #[test]
    fn recompute_nets_entries_and_exits_per_item() {
        let a = ItemId::generate();
        let b = ItemId::generate();
        let it = item();

        let entries = vec![entry(&a, &it, 10.0), entry(&b, &it, 4.0), entry(&a, &it, 2.5)];
        let exits = vec![exit(&a, &it, 3.0)];

        let totals = recompute_stock(&entries, &exits);
        assert_eq!(totals.get(&a), Some(&9.5));
        assert_eq!(totals.get(&b), Some(&4.0));
    }

    #[test]
    fn audit_flags_drift_between_stored_and_ledger() {
        let id = ItemId::generate();
        let mut it = item();
        it.receive(10.0, None, Utc::now()).unwrap();
        it.consume(4.0, Utc::now()).unwrap();

        let entries = vec![entry(&id, &it, 10.0)];
        let exits = vec![exit(&id, &it, 4.0)];
        assert!(audit_item(&id, &it, &entries, &exits).is_consistent());

        let missing_exit: Vec<Exit> = Vec::new();
        let audit = audit_item(&id, &it, &entries, &missing_exit);
        assert!(!audit.is_consistent());
        assert_eq!(audit.ledger, 10.0);
        assert_eq!(audit.stored, 6.0);
    }
}
