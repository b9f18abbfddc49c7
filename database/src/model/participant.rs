use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::consts::consts::EntityId;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?-u:\w)+([.-]?(?-u:\w)+)*@(?-u:\w)+([.-]?(?-u:\w)+)*(\.(?-u:\w){2,3})+$")
        .expect("valid email regex")
});

/// Shape check applied to registrations and generated seed data
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Emails are compared and stored trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Participant {
    pub id: EntityId,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A participant that has not been stored yet, the store assigns the id and timestamps
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewParticipant {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Seeding back-dates records, everything else lets the store stamp `now`
    pub created_at: Option<DateTime<Utc>>,
}

impl NewParticipant {
    pub fn new(email: &str, full_name: &str, phone: Option<&str>) -> Self {
        Self {
            email: normalize_email(email),
            full_name: full_name.trim().to_string(),
            phone: phone
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            created_at: None,
        }
    }

    pub fn set_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Assigns the id and timestamps, `updated_at` starts equal to `created_at`
    pub fn into_participant(self) -> Participant {
        let created_at = self.created_at.unwrap_or_else(Utc::now);

        Participant {
            id: EntityId::new(),
            email: normalize_email(&self.email),
            full_name: self.full_name,
            phone: self.phone,
            created_at,
            updated_at: created_at,
        }
    }
}

impl Participant {
    pub fn new_test() -> Self {
        NewParticipant::new("ana@example.com", "Ana Garcia", None).into_participant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Ana@Example.com", "ana@example.com")]
    #[case("  ana@example.com ", "ana@example.com")]
    #[case("\tANA@EXAMPLE.COM\n", "ana@example.com")]
    fn normalizes_email(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_email(input), expected);
    }

    #[rstest]
    #[case("ana@example.com", true)]
    #[case("ana.garcia@mail.example.pe", true)]
    #[case("ana-garcia@example.info", false)]
    #[case("ana@example", false)]
    #[case("ana..garcia@example.com", false)]
    #[case("not-an-email", false)]
    #[case("josé@example.com", false)]
    #[case("ana@exámple.com", false)]
    #[case("jose_99@example.com", true)]
    #[case("", false)]
    fn validates_email_shape(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(input), expected);
    }

    #[test]
    fn blank_phone_is_absent() {
        let candidate = NewParticipant::new("a@b.com", "Al", Some("   "));

        assert_eq!(candidate.phone, None);
    }

    #[test]
    fn into_participant_stamps_equal_timestamps() {
        let participant = NewParticipant::new("a@b.com", " Al ", Some(" 987654321 ")).into_participant();

        assert_eq!(participant.full_name, "Al");
        assert_eq!(participant.phone.as_deref(), Some("987654321"));
        assert_eq!(participant.created_at, participant.updated_at);
    }
}
