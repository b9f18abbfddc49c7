use database::store::{ParticipantStore, StoreError};
use thiserror::Error;

use crate::dto::{CreateParticipantRequest, ParticipantResponse, ParticipantsListResponse};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("This email is already registered in the raffle")]
    AlreadyRegistered,
    #[error("Participant store failed: {0}")]
    Infrastructure(StoreError),
}

/// Registration rules on top of a participant store
pub struct RegistrationService<S: ParticipantStore> {
    store: S,
}

impl<S: ParticipantStore> RegistrationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn register(
        &self,
        request: CreateParticipantRequest,
    ) -> Result<ParticipantResponse, RegistrationError> {
        let new_participant = request.into_new_participant();

        log::info!(
            "Registering participant with email: {}",
            new_participant.email
        );

        // Advisory only, the store's unique constraint decides races
        if self
            .store
            .find_by_email(&new_participant.email)
            .map_err(infrastructure)?
            .is_some()
        {
            log::warn!("Email already registered: {}", new_participant.email);
            return Err(RegistrationError::AlreadyRegistered);
        }

        match self.store.insert(new_participant) {
            Ok(participant) => {
                log::info!("Participant registered: {}", participant.email);
                Ok(participant.into())
            }
            Err(StoreError::DuplicateKey(email)) => {
                log::warn!("Email registered concurrently: {}", email);
                Err(RegistrationError::AlreadyRegistered)
            }
            Err(err) => Err(infrastructure(err)),
        }
    }

    pub fn list_all(&self) -> Result<ParticipantsListResponse, RegistrationError> {
        let participants = self.store.list_all().map_err(infrastructure)?;
        let total = participants.len();

        log::info!("Found {} participants", total);

        Ok(ParticipantsListResponse {
            participants: participants.into_iter().map(Into::into).collect(),
            total,
            message: format!("Found {} registered participants", total),
        })
    }

    pub fn get_count(&self) -> Result<usize, RegistrationError> {
        self.store.count().map_err(infrastructure)
    }

    pub fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ParticipantResponse>, RegistrationError> {
        Ok(self
            .store
            .find_by_email(email)
            .map_err(infrastructure)?
            .map(Into::into))
    }
}

fn infrastructure(err: StoreError) -> RegistrationError {
    log::error!("Participant store failed: {}", err);
    RegistrationError::Infrastructure(err)
}


#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use database::{
        database::{database::test_utils::start_test_database, request_manager::RequestManager},
        model::participant::NewParticipant,
    };

    use super::{
        test_stores::{RacingStore, UnavailableStore},
        *,
    };

    fn request(email: &str, full_name: &str, phone: Option<&str>) -> CreateParticipantRequest {
        CreateParticipantRequest {
            email: email.to_string(),
            full_name: full_name.to_string(),
            phone: phone.map(str::to_string),
        }
    }

    fn service() -> RegistrationService<RequestManager> {
        RegistrationService::new(start_test_database())
    }

    #[test_log::test]
    fn register_returns_the_formatted_participant() {
        let service = service();

        let registered = service
            .register(request("Ana@Example.com", " Ana García ", Some(" 987654321 ")))
            .unwrap();

        assert_eq!(registered.email, "ana@example.com");
        assert_eq!(registered.full_name, "Ana García");
        assert_eq!(registered.phone.as_deref(), Some("987654321"));
        assert_eq!(registered.created_at, registered.updated_at);
        assert!(!registered.id.is_empty());
    }

    #[test]
    fn second_registration_of_an_email_is_rejected() {
        let service = service();

        service
            .register(request("ana@example.com", "Ana Garcia", None))
            .unwrap();

        assert_eq!(
            service.register(request("ANA@example.com ", "Someone Else", None)),
            Err(RegistrationError::AlreadyRegistered)
        );
        assert_eq!(service.get_count(), Ok(1));
    }

    #[test]
    fn repeated_reads_without_writes_agree() {
        let service = service();

        for (email, name) in [
            ("ana@example.com", "Ana Garcia"),
            ("luis@example.com", "Luis Perez"),
            ("rosa@example.com", "Rosa Diaz"),
        ] {
            service.register(request(email, name, None)).unwrap();
        }

        let first_list = service.list_all().unwrap();
        let second_list = service.list_all().unwrap();

        assert_eq!(first_list.total, 3);
        assert_eq!(first_list, second_list);

        assert_eq!(service.get_count(), Ok(3));
        assert_eq!(service.get_count(), Ok(3));
    }

    #[test]
    fn duplicate_key_after_passing_pre_check_is_already_registered() {
        let service = RegistrationService::new(RacingStore);

        assert_eq!(
            service.register(request("ana@example.com", "Ana Garcia", None)),
            Err(RegistrationError::AlreadyRegistered)
        );
    }

    #[test]
    fn concurrent_registrations_admit_exactly_one() {
        let service = Arc::new(service());

        let handles: Vec<_> = (0..12)
            .map(|i| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    service.register(request("race@example.com", &format!("Racer {}", i), None))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| r == &Err(RegistrationError::AlreadyRegistered)));
        assert_eq!(service.get_count(), Ok(1));
    }

    #[test]
    fn list_all_is_newest_first_with_message() {
        let store = start_test_database();
        let now = chrono::Utc::now();

        store
            .send_add_many(vec![
                NewParticipant::new("old@example.com", "Old One", None)
                    .set_created_at(now - chrono::Duration::hours(1)),
                NewParticipant::new("new@example.com", "New One", None).set_created_at(now),
            ])
            .unwrap();

        let listed = RegistrationService::new(store).list_all().unwrap();

        assert_eq!(listed.total, 2);
        assert_eq!(listed.message, "Found 2 registered participants");
        assert_eq!(listed.participants[0].email, "new@example.com");
        assert_eq!(listed.participants[1].email, "old@example.com");
    }

    #[test]
    fn empty_store_lists_nothing() {
        let listed = service().list_all().unwrap();

        assert_eq!(listed.total, 0);
        assert_eq!(listed.participants, vec![]);
        assert_eq!(listed.message, "Found 0 registered participants");
    }

    #[test]
    fn find_by_email_normalizes_lookup() {
        let service = service();

        service
            .register(request("ana@example.com", "Ana Garcia", None))
            .unwrap();

        assert!(service.find_by_email(" ANA@example.com").unwrap().is_some());
        assert!(service.find_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn store_failures_are_infrastructure_errors() {
        let service = RegistrationService::new(UnavailableStore::default());

        let expected = Err(RegistrationError::Infrastructure(StoreError::Unavailable(
            "Database is not running".to_string(),
        )));

        assert_eq!(
            service.register(request("ana@example.com", "Ana Garcia", None)),
            expected
        );
        assert_eq!(service.get_count(), Err(RegistrationError::Infrastructure(
            StoreError::Unavailable("Database is not running".to_string())
        )));
        // The pre-check failure stops registration before any insert
        assert_eq!(*service.store.calls.lock().unwrap(), 2);
    }
}
