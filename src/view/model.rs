//! The list view-model
//!
//! [`ListViewModel`] owns the canonical collection for one screen and keeps
//! a derived view of it: the records passing every active predicate, in
//! collection order unless an explicit sort is set. The derived view is
//! rebuilt synchronously after every change and is never edited directly.

use crate::core::error::{ConfigError, NotFoundError};
use crate::core::query::{Page, PageRequest, PaginationMeta, SortSpec};
use crate::core::record::{Patch, Record};
use crate::view::filters::{FilterKind, Predicate, ViewSchema};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// Canonical collection plus filters, sort and the derived view
#[derive(Debug, Clone)]
pub struct ListViewModel {
    schema: ViewSchema,
    records: Vec<Record>,
    positions: HashMap<String, usize>,
    filters: BTreeMap<FilterKind, Predicate>,
    sort: Option<SortSpec>,
    visible: Vec<usize>,
    revision: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl ListViewModel {
    /// Create an empty view-model
    pub fn new(schema: ViewSchema) -> Self {
        Self {
            schema,
            records: Vec::new(),
            positions: HashMap::new(),
            filters: BTreeMap::new(),
            sort: None,
            visible: Vec::new(),
            revision: 0,
            loaded_at: None,
        }
    }

    pub fn schema(&self) -> &ViewSchema {
        &self.schema
    }

    /// Replace the canonical collection with a freshly fetched one
    ///
    /// Identifiers are kept unique: when the same `_id` occurs twice the
    /// later record replaces the earlier one in place.
    pub fn load(&mut self, records: Vec<Record>) {
        let fetched = records.len();
        self.records = Vec::with_capacity(fetched);
        self.positions.clear();

        for record in records {
            match self.positions.get(record.id()) {
                Some(&pos) => {
                    tracing::warn!(
                        entity = %self.schema.entity,
                        id = %record.id(),
                        "duplicate id in fetched collection, keeping the last copy"
                    );
                    self.records[pos] = record;
                }
                None => {
                    self.positions
                        .insert(record.id().to_string(), self.records.len());
                    self.records.push(record);
                }
            }
        }

        self.loaded_at = Some(Utc::now());
        self.recompute();
        tracing::debug!(
            entity = %self.schema.entity,
            fetched,
            kept = self.records.len(),
            visible = self.visible.len(),
            "collection loaded"
        );
    }

    /// Replace the fields named in `patch` on the record with this id
    ///
    /// Fails without touching anything when the id is unknown.
    pub fn update_field(&mut self, id: &str, patch: &Patch) -> Result<(), NotFoundError> {
        let pos = self.position(id)?;
        self.records[pos].apply_patch(patch);
        self.recompute();
        Ok(())
    }

    /// Remove the record with this id and return it
    pub fn remove(&mut self, id: &str) -> Result<Record, NotFoundError> {
        let pos = self.position(id)?;
        let removed = self.records.remove(pos);
        self.reindex();
        self.recompute();
        Ok(removed)
    }

    /// Install, replace or clear one predicate
    ///
    /// An empty value clears the slot, as does `all` for status and
    /// foreign key.
    pub fn set_filter(&mut self, kind: FilterKind, value: &str) {
        match Predicate::build(kind, value, &self.schema) {
            Some(predicate) => {
                self.filters.insert(kind, predicate);
            }
            None => {
                self.filters.remove(&kind);
            }
        }
        self.recompute();
    }

    /// [`set_filter`](Self::set_filter) addressed by name
    /// (`status`, `search`, `foreignKey`)
    pub fn set_filter_named(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let kind = name.parse::<FilterKind>()?;
        self.set_filter(kind, value);
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.recompute();
    }

    /// Active predicates in a stable order
    pub fn active_filters(&self) -> impl Iterator<Item = &Predicate> {
        self.filters.values()
    }

    /// Current value of one filter slot
    pub fn filter_value(&self, kind: FilterKind) -> Option<&str> {
        self.filters.get(&kind).map(Predicate::value)
    }

    /// Set or clear the explicit presentation sort
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
        self.recompute();
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// The derived view
    pub fn view(&self) -> Vec<&Record> {
        self.visible.iter().map(|&pos| &self.records[pos]).collect()
    }

    /// Identifiers of the derived view, in view order
    pub fn view_ids(&self) -> Vec<&str> {
        self.visible
            .iter()
            .map(|&pos| self.records[pos].id())
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// One page of the derived view
    pub fn page(&self, request: PageRequest) -> Page<&Record> {
        let page = request.page();
        let limit = request.limit();
        let data = self
            .visible
            .iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(|&pos| &self.records[pos])
            .collect();
        Page {
            data,
            pagination: PaginationMeta::new(page, limit, self.visible.len()),
        }
    }

    /// The whole canonical collection, unfiltered
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bumped on every recompute; renderers can skip work when unchanged
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Record count per effective status over the whole collection
    pub fn status_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts
                .entry(self.schema.status_of(record).to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    fn position(&self, id: &str) -> Result<usize, NotFoundError> {
        self.positions
            .get(id)
            .copied()
            .ok_or_else(|| NotFoundError {
                entity: self.schema.entity.clone(),
                id: id.to_string(),
            })
    }

    fn reindex(&mut self) {
        self.positions = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id().to_string(), pos))
            .collect();
    }

    fn recompute(&mut self) {
        let mut visible: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.filters.values().all(|p| p.matches(record)))
            .map(|(pos, _)| pos)
            .collect();

        if let Some(sort) = &self.sort {
            // stable: ties keep collection order
            visible.sort_by(|&a, &b| {
                sort.compare(
                    self.records[a].get(&sort.field),
                    self.records[b].get(&sort.field),
                )
            });
        }

        self.visible = visible;
        self.revision += 1;
    }
}
