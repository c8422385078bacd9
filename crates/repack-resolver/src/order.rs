use std::collections::{HashMap, HashSet};

use repack_core::{PackageRecord, UpdateError};

pub fn dependency_order(records: Vec<PackageRecord>) -> Result<Vec<PackageRecord>, UpdateError> {
    let mut collapsed: Vec<PackageRecord> = Vec::with_capacity(records.len());
    let mut position: HashMap<String, usize> = HashMap::new();
    for record in records {
        match position.get(record.id()) {
            Some(&index) => collapsed[index] = record,
            None => {
                position.insert(record.id().to_string(), collapsed.len());
                collapsed.push(record);
            }
        }
    }

    let in_set: HashSet<&str> = collapsed.iter().map(|record| record.id()).collect();
    let mut in_degree: Vec<usize> = collapsed
        .iter()
        .map(|record| {
            record
                .manifest
                .dependency_ids()
                .filter(|id| in_set.contains(id))
                .count()
        })
        .collect();

    let mut emitted = vec![false; collapsed.len()];
    let mut order: Vec<usize> = Vec::with_capacity(collapsed.len());
    loop {
        let Some(next) = (0..collapsed.len()).find(|&index| !emitted[index] && in_degree[index] == 0)
        else {
            break;
        };
        emitted[next] = true;
        order.push(next);

        let id = collapsed[next].id().to_string();
        for (index, record) in collapsed.iter().enumerate() {
            if !emitted[index] && record.manifest.dependencies.contains_key(&id) {
                in_degree[index] = in_degree[index].saturating_sub(1);
            }
        }
    }

    if order.len() != collapsed.len() {
        let mut members: Vec<String> = collapsed
            .iter()
            .enumerate()
            .filter(|(index, _)| !emitted[*index])
            .map(|(_, record)| record.id().to_string())
            .collect();
        members.sort();
        return Err(UpdateError::DependencyCycle { members });
    }

    let mut by_order: Vec<Option<PackageRecord>> = collapsed.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|index| by_order[index].take())
        .collect())
}
