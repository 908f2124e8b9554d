//! Validates a user-supplied [`SchemaDoc`] and
//! synthesizes the companion [`TableSchema`] for each secondary index,
//! producing the [`EnrichedSchema`] the rest of the core consumes.

use std::collections::{BTreeMap, BTreeSet};

use latticestore_types::{
    EnrichedSchema, IndexDescriptor, LogicalType, SchemaDoc, SecondaryIndexDescriptor, SortOrder,
    StoreError, StoreResult, TableSchema,
};

const CONSISTENT_UP_TO: &str = "__consistentUpTo";
const TOMBSTONE: &str = "__tombstone";
const IMPLICIT_TID: &str = "_tid";

/// Checks that every name referenced by `index` and every secondary-index
/// descriptor actually names an attribute, before any synthesis runs.
pub fn validate(doc: &SchemaDoc) -> StoreResult<()> {
    require_attribute(doc, &doc.index.hash)?;
    for name in &doc.index.range {
        require_attribute(doc, name)?;
    }
    for name in &doc.index.static_columns {
        require_attribute(doc, name)?;
    }
    for (index_name, descriptor) in &doc.secondary_indexes {
        require_attribute(doc, &descriptor.index.hash).map_err(|_| {
            StoreError::schema(format!(
                "secondary index '{index_name}' hash '{}' is not an attribute",
                descriptor.index.hash
            ))
        })?;
        for name in &descriptor.index.range {
            require_attribute(doc, name).map_err(|_| {
                StoreError::schema(format!(
                    "secondary index '{index_name}' range column '{name}' is not an attribute"
                ))
            })?;
        }
        for name in &descriptor.proj {
            require_attribute(doc, name).map_err(|_| {
                StoreError::schema(format!(
                    "secondary index '{index_name}' proj column '{name}' is not an attribute"
                ))
            })?;
        }
    }
    Ok(())
}

fn require_attribute(doc: &SchemaDoc, name: &str) -> StoreResult<()> {
    if doc.attributes.contains_key(name) {
        Ok(())
    } else {
        Err(StoreError::schema(format!("'{name}' is not a declared attribute")))
    }
}

fn order_map(range: &[String], order: &[SortOrder]) -> BTreeMap<String, SortOrder> {
    range.iter().cloned().zip(order.iter().copied()).collect()
}

fn primary_schema(doc: &SchemaDoc) -> TableSchema {
    let mut attributes = BTreeMap::new();
    attributes.insert(doc.index.hash.clone(), doc.attributes[&doc.index.hash].clone());
    for col in &doc.index.range {
        attributes.insert(col.clone(), doc.attributes[col].clone());
    }
    for col in &doc.index.static_columns {
        attributes.insert(col.clone(), doc.attributes[col].clone());
    }

    let mut index_attributes = BTreeSet::new();
    index_attributes.insert(doc.index.hash.clone());
    index_attributes.extend(doc.index.range.iter().cloned());

    TableSchema {
        attributes,
        hash: doc.index.hash.clone(),
        range: doc.index.range.clone(),
        order: order_map(&doc.index.range, &doc.index.order),
        static_columns: doc.index.static_columns.iter().cloned().collect(),
        index_attributes,
    }
}

/// Synthesize one companion schema following 's eight steps.
fn companion_schema(
    parent_attributes: &BTreeMap<String, LogicalType>,
    primary: &TableSchema,
    descriptor: &SecondaryIndexDescriptor,
) -> TableSchema {
    let IndexDescriptor { hash, range, order, static_columns: _ } = &descriptor.index;

    // Step 1.
    let mut attributes = BTreeMap::new();
    attributes.insert(CONSISTENT_UP_TO.to_string(), LogicalType::TimeUuid);
    attributes.insert(TOMBSTONE.to_string(), LogicalType::Boolean);
    attributes.insert(hash.clone(), parent_attributes[hash].clone());
    let static_cols: BTreeSet<String> = BTreeSet::from([CONSISTENT_UP_TO.to_string()]);

    // Step 2.
    let mut companion_range: Vec<String> = range.clone();

    // Step 3: append primary hash if not already present anywhere.
    if !attributes.contains_key(&primary.hash) && !companion_range.contains(&primary.hash) {
        companion_range.push(primary.hash.clone());
    }

    // Step 4: close over every primary range column.
    for col in &primary.range {
        if !attributes.contains_key(col) && !companion_range.contains(col) {
            companion_range.push(col.clone());
        }
    }

    // Step 5: pull each range entry's type from the parent.
    for col in &companion_range {
        attributes.entry(col.clone()).or_insert_with(|| parent_attributes[col].clone());
    }

    // Step 6: guarantee at least one timeuuid *clustering* column. Checked
    // only over `companion_range`, not all of `attributes` — the latter
    // already carries the synthesized static `__consistentUpTo: timeuuid`
    // from step 1, which would otherwise always satisfy this check and the
    // implicit `_tid` clustering column would never get appended.
    if !companion_range.iter().any(|c| attributes[c].is_time_uuid()) {
        attributes.insert(IMPLICIT_TID.to_string(), LogicalType::TimeUuid);
        companion_range.push(IMPLICIT_TID.to_string());
    }

    // Step 7: extra projected attributes, copied but not part of the key.
    for col in &descriptor.proj {
        attributes.entry(col.clone()).or_insert_with(|| parent_attributes[col].clone());
    }

    // Step 8.
    let mut index_attributes = BTreeSet::new();
    index_attributes.insert(hash.clone());
    index_attributes.extend(companion_range.iter().cloned());

    TableSchema {
        attributes,
        hash: hash.clone(),
        order: order_map(&companion_range, order),
        range: companion_range,
        static_columns: static_cols,
        index_attributes,
    }
}

/// Validate `doc` and synthesize every companion, producing the enriched
/// schema cached by the Schema Manager and consumed by the planners.
pub fn enrich(doc: &SchemaDoc) -> StoreResult<EnrichedSchema> {
    validate(doc)?;
    let primary = primary_schema(doc);
    let companions = doc
        .secondary_indexes
        .iter()
        .map(|(name, descriptor)| {
            (name.clone(), companion_schema(&doc.attributes, &primary, descriptor))
        })
        .collect();
    Ok(EnrichedSchema { primary, companions })
}
