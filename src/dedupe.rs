use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::model::{ClientRecord, ControlId};

/// Keeps one record per `ControlId` among those matching `predicate`.
///
/// The survivor of each group has the best [`PopulationType::rank`], then the
/// smallest `source_order`. Survivors are returned in ascending
/// `source_order`, i.e. the order they appear in the sheet.
///
/// [`PopulationType::rank`]: crate::model::PopulationType::rank
pub fn dedupe_by_priority<'a, F>(records: &'a [ClientRecord], predicate: F) -> Vec<&'a ClientRecord>
where
    F: Fn(&ClientRecord) -> bool,
{
    let mut best: HashMap<&'a ControlId, &'a ClientRecord> = HashMap::new();

    for record in records.iter().filter(|record| predicate(*record)) {
        match best.entry(&record.control_id) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if priority_key(record) < priority_key(slot.get()) {
                    slot.insert(record);
                }
            }
        }
    }

    let mut kept: Vec<&ClientRecord> = best.into_values().collect();
    kept.sort_by_key(|record| record.source_order);
    kept
}

fn priority_key(record: &ClientRecord) -> (u8, usize) {
    (record.population_type.rank(), record.source_order)
}
