use chrono::Utc;
use database::store::{ParticipantStore, StoreError};
use rand::thread_rng;

use crate::generator::ParticipantGenerator;

#[derive(Debug, PartialEq)]
pub enum SeedOutcome {
    Seeded(usize),
    /// The store already held this many participants
    Skipped(usize),
}

/// Fills an empty store with `count` generated participants in a single batch
pub fn seed_participants<S: ParticipantStore>(
    store: &S,
    count: usize,
) -> Result<SeedOutcome, StoreError> {
    log::info!("🌱 Seeding participants...");

    let existing = store.count()?;

    if existing > 0 {
        log::warn!("{} participants already exist, skipping seed", existing);
        return Ok(SeedOutcome::Skipped(existing));
    }

    let participants = ParticipantGenerator::new(thread_rng(), Utc::now()).generate(count);

    log::info!("Creating {} participants...", participants.len());

    let inserted = store.insert_many(participants)?;

    log::info!("✅ Participant seed completed");

    Ok(SeedOutcome::Seeded(inserted.len()))
}

pub fn clear_participants<S: ParticipantStore>(store: &S) -> Result<usize, StoreError> {
    log::info!("🧹 Clearing participants...");

    let removed = store.delete_all()?;

    log::info!("✅ Removed {} participants", removed);

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use database::{
        database::database::test_utils::start_test_database, model::participant::NewParticipant,
    };

    use super::*;

    #[test_log::test]
    fn seeds_an_empty_store() {
        let store = start_test_database();

        assert_eq!(seed_participants(&store, 300), Ok(SeedOutcome::Seeded(300)));
        assert_eq!(store.count(), Ok(300));

        let listed = store.list_all().unwrap();

        assert!(listed
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn skips_a_store_with_participants() {
        let store = start_test_database();

        store
            .insert(NewParticipant::new("ana@example.com", "Ana Garcia", None))
            .unwrap();

        assert_eq!(seed_participants(&store, 300), Ok(SeedOutcome::Skipped(1)));
        assert_eq!(store.count(), Ok(1));
    }

    #[test]
    fn clear_then_seed_again() {
        let store = start_test_database();

        seed_participants(&store, 25).unwrap();

        assert_eq!(clear_participants(&store), Ok(25));
        assert_eq!(store.count(), Ok(0));
        assert_eq!(seed_participants(&store, 10), Ok(SeedOutcome::Seeded(10)));
    }
}
