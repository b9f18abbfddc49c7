use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::{consts::consts::EntityId, model::participant::normalize_email};

/// Normalized email -> row id. Backs the uniqueness constraint on `Participant::email`
#[derive(Debug, Default)]
pub struct UniqueEmailIndex {
    index: HashMap<String, EntityId>,
}

impl UniqueEmailIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.index.contains_key(&normalize_email(email))
    }

    pub fn get(&self, email: &str) -> Option<&EntityId> {
        self.index.get(&normalize_email(email))
    }

    /// Callers must check `contains` first, an existing entry is overwritten
    pub fn save_to_index(&mut self, email: &str, id: EntityId) {
        self.index.insert(normalize_email(email), id);
    }

    pub fn remove_from_index(&mut self, email: &str) {
        self.index.remove(&normalize_email(email));
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// (created_at, insertion sequence) -> row id. The sequence keeps rows with equal
/// timestamps in insertion order
#[derive(Debug, Default)]
pub struct CreatedAtIndex {
    index: BTreeMap<(DateTime<Utc>, u64), EntityId>,
}

impl CreatedAtIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_to_index(&mut self, created_at: DateTime<Utc>, sequence: u64, id: EntityId) {
        self.index.insert((created_at, sequence), id);
    }

    pub fn remove_from_index(&mut self, created_at: DateTime<Utc>, sequence: u64) {
        self.index.remove(&(created_at, sequence));
    }

    /// Most recent first, for equal timestamps the later insertion comes first
    pub fn iter_descending(&self) -> impl Iterator<Item = &EntityId> {
        self.index.values().rev()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn unique_email_index_ignores_case_and_whitespace() {
        let mut index = UniqueEmailIndex::new();
        let id = EntityId::new();

        index.save_to_index("Ana@Example.com", id.clone());

        assert!(index.contains("ana@example.com "));
        assert_eq!(index.get(" ANA@EXAMPLE.COM"), Some(&id));

        index.remove_from_index("ana@example.com");

        assert!(index.is_empty());
    }

    #[test]
    fn created_at_index_orders_descending_with_insertion_tiebreak() {
        let mut index = CreatedAtIndex::new();
        let t1 = Utc::now();
        let t2 = t1 + Duration::seconds(1);

        let first = EntityId("first".to_string());
        let second = EntityId("second".to_string());
        let third = EntityId("third".to_string());

        index.save_to_index(t2, 0, first.clone());
        index.save_to_index(t1, 1, second.clone());
        index.save_to_index(t1, 2, third.clone());

        let ordered: Vec<&EntityId> = index.iter_descending().collect();

        assert_eq!(ordered, vec![&first, &third, &second]);
    }
}
