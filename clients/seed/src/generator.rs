use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use database::model::participant::{is_valid_email, NewParticipant};
use rand::{seq::SliceRandom, Rng};

/// ASCII only, these end up in email addresses
const FIRST_NAMES: [&str; 56] = [
    "Maria", "Jose", "Ana", "Carlos", "Luis", "Carmen", "Antonio", "Francisca", "Manuel",
    "Isabel", "Jesus", "Pilar", "Alejandro", "Dolores", "David", "Teresa", "Pedro", "Rosa",
    "Javier", "Antonia", "Miguel", "Mercedes", "Fernando", "Josefa", "Rafael", "Elena",
    "Francisco", "Concepcion", "Jorge", "Manuela", "Juan", "Margarita", "Sergio", "Cristina",
    "Pablo", "Andrea", "Ricardo", "Lucia", "Alberto", "Monica", "Roberto", "Sandra", "Enrique",
    "Patricia", "Raul", "Laura", "Adrian", "Beatriz", "Angel", "Nuria", "Ivan", "Silvia",
    "Ruben", "Alicia", "Oscar", "Natalia",
];

const LAST_NAMES: [&str; 54] = [
    "Garcia", "Rodriguez", "Gonzalez", "Fernandez", "Lopez", "Martinez", "Sanchez", "Perez",
    "Gomez", "Martin", "Jimenez", "Ruiz", "Hernandez", "Diaz", "Moreno", "Munoz", "Alvarez",
    "Romero", "Alonso", "Gutierrez", "Navarro", "Torres", "Dominguez", "Vazquez", "Ramos", "Gil",
    "Ramirez", "Serrano", "Blanco", "Suarez", "Molina", "Morales", "Ortega", "Delgado", "Castro",
    "Ortiz", "Rubio", "Marin", "Sanz", "Iglesias", "Medina", "Garrido", "Cortes", "Castillo",
    "Santos", "Lozano", "Guerrero", "Cano", "Prieto", "Mendez", "Cruz", "Calvo", "Gallego",
    "Vidal",
];

const DISPLAY_FIRST_NAMES: [&str; 56] = [
    "María", "José", "Ana", "Carlos", "Luis", "Carmen", "Antonio", "Francisca", "Manuel",
    "Isabel", "Jesús", "Pilar", "Alejandro", "Dolores", "David", "Teresa", "Pedro", "Rosa",
    "Javier", "Antonia", "Miguel", "Mercedes", "Fernando", "Josefa", "Rafael", "Elena",
    "Francisco", "Concepción", "Jorge", "Manuela", "Juan", "Margarita", "Sergio", "Cristina",
    "Pablo", "Andrea", "Ricardo", "Lucía", "Alberto", "Mónica", "Roberto", "Sandra", "Enrique",
    "Patricia", "Raúl", "Laura", "Adrián", "Beatriz", "Ángel", "Nuria", "Iván", "Silvia",
    "Rubén", "Alicia", "Óscar", "Natalia",
];

const DISPLAY_LAST_NAMES: [&str; 54] = [
    "García", "Rodríguez", "González", "Fernández", "López", "Martínez", "Sánchez", "Pérez",
    "Gómez", "Martín", "Jiménez", "Ruiz", "Hernández", "Díaz", "Moreno", "Muñoz", "Álvarez",
    "Romero", "Alonso", "Gutiérrez", "Navarro", "Torres", "Domínguez", "Vázquez", "Ramos", "Gil",
    "Ramírez", "Serrano", "Blanco", "Suárez", "Molina", "Morales", "Ortega", "Delgado", "Castro",
    "Ortiz", "Rubio", "Marín", "Sanz", "Iglesias", "Medina", "Garrido", "Cortés", "Castillo",
    "Santos", "Lozano", "Guerrero", "Cano", "Prieto", "Méndez", "Cruz", "Calvo", "Gallego",
    "Vidal",
];

const EMAIL_DOMAINS: [&str; 8] = [
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "email.com",
    "live.com",
    "icloud.com",
    "protonmail.com",
];

const MAX_EMAIL_ATTEMPTS: usize = 10;
const PHONE_PROBABILITY: f64 = 0.7;
const CREATED_WITHIN_DAYS: i64 = 30;

/// Builds synthetic participants with unique, well formed emails
pub struct ParticipantGenerator<R: Rng> {
    rng: R,
    now: DateTime<Utc>,
    used_emails: HashSet<String>,
}

impl<R: Rng> ParticipantGenerator<R> {
    pub fn new(rng: R, now: DateTime<Utc>) -> Self {
        Self {
            rng,
            now,
            used_emails: HashSet::new(),
        }
    }

    pub fn generate(&mut self, count: usize) -> Vec<NewParticipant> {
        (0..count).map(|i| self.next_participant(i)).collect()
    }

    fn next_participant(&mut self, index: usize) -> NewParticipant {
        let email = self.unique_email(index);
        let full_name = self.full_name();
        let phone = self.phone();
        let created_at = self.created_at();

        NewParticipant::new(&email, &full_name, phone.as_deref()).set_created_at(created_at)
    }

    fn unique_email(&mut self, index: usize) -> String {
        let mut attempts = 0;

        let email = loop {
            let candidate = self.candidate_email();
            attempts += 1;

            if !self.used_emails.contains(&candidate) {
                break candidate;
            }

            if attempts > MAX_EMAIL_ATTEMPTS {
                let domain = self.pick(&EMAIL_DOMAINS);
                break self.fallback_email(index, domain);
            }
        };

        let email = if is_valid_email(&email) {
            email
        } else {
            log::warn!("Generated an invalid email: {}, using fallback", email);
            self.fallback_email(index, "gmail.com")
        };

        self.used_emails.insert(email.clone());

        email
    }

    fn candidate_email(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES).to_lowercase();
        let last = self.pick(&LAST_NAMES).to_lowercase();
        let domain = self.pick(&EMAIL_DOMAINS);
        let number: u32 = self.rng.gen_range(1..=9999);

        match self.rng.gen_range(0..5) {
            0 => format!("{}.{}@{}", first, last, domain),
            1 => format!("{}{}@{}", first, last, domain),
            2 => format!("{}{}@{}", first, number, domain),
            3 => format!("{}.{}{}@{}", first, last, number, domain),
            _ => format!("{}_{}@{}", first, last, domain),
        }
    }

    fn fallback_email(&self, index: usize, domain: &str) -> String {
        format!("user{}{}@{}", index, self.now.timestamp_millis(), domain)
    }

    fn full_name(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(&DISPLAY_FIRST_NAMES),
            self.pick(&DISPLAY_LAST_NAMES),
            self.pick(&DISPLAY_LAST_NAMES)
        )
    }

    /// Peruvian mobile, mobile with country code, or Lima landline
    fn phone(&mut self) -> Option<String> {
        if !self.rng.gen_bool(PHONE_PROBABILITY) {
            return None;
        }

        let phone = match self.rng.gen_range(0..3) {
            0 => format!("9{}", self.rng.gen_range(10_000_000..=99_999_999)),
            1 => format!("+51 9{}", self.rng.gen_range(10_000_000..=99_999_999)),
            _ => format!("(01) {}", self.rng.gen_range(1_000_000..=9_999_999)),
        };

        Some(phone)
    }

    fn created_at(&mut self) -> DateTime<Utc> {
        let window_ms = Duration::days(CREATED_WITHIN_DAYS).num_milliseconds();

        self.now - Duration::milliseconds(self.rng.gen_range(0..=window_ms))
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    fn generate(seed: u64, count: usize) -> (DateTime<Utc>, Vec<NewParticipant>) {
        let now = Utc::now();
        let participants =
            ParticipantGenerator::new(StdRng::seed_from_u64(seed), now).generate(count);

        (now, participants)
    }

    #[rstest]
    #[case(1)]
    #[case(42)]
    #[case(2024)]
    fn emails_are_unique_and_valid(#[case] seed: u64) {
        let (_, participants) = generate(seed, 300);

        let emails: HashSet<&str> = participants.iter().map(|p| p.email.as_str()).collect();

        assert_eq!(emails.len(), 300);
        assert!(participants.iter().all(|p| is_valid_email(&p.email)));
    }

    #[test]
    fn large_batches_stay_unique() {
        let (_, participants) = generate(7, 5_000);

        let emails: HashSet<&str> = participants.iter().map(|p| p.email.as_str()).collect();

        assert_eq!(emails.len(), 5_000);
    }

    #[test]
    fn fallback_email_is_indexed_and_valid() {
        let now = Utc::now();
        let generator = ParticipantGenerator::new(StdRng::seed_from_u64(0), now);

        let email = generator.fallback_email(12, "gmail.com");

        assert_eq!(email, format!("user12{}@gmail.com", now.timestamp_millis()));
        assert!(is_valid_email(&email));
    }

    #[test]
    fn phones_follow_known_formats() {
        let (_, participants) = generate(3, 1_000);

        let phones: Vec<&str> = participants.iter().filter_map(|p| p.phone.as_deref()).collect();

        // Roughly seven in ten participants have a phone
        assert!(phones.len() > 600 && phones.len() < 800, "{}", phones.len());

        for phone in phones {
            let digits = |s: &str, len: usize| s.len() == len && s.chars().all(|c| c.is_ascii_digit());

            let well_formed = match phone {
                p if p.starts_with("+51 9") => digits(&p[5..], 8),
                p if p.starts_with("(01) ") => digits(&p[5..], 7),
                p if p.starts_with('9') => digits(&p[1..], 8),
                _ => false,
            };

            assert!(well_formed, "unexpected phone format: {}", phone);
        }
    }

    #[test]
    fn created_at_is_within_the_last_thirty_days() {
        let (now, participants) = generate(11, 500);

        for participant in participants {
            let created_at = participant.created_at.expect("seeded records are back-dated");

            assert!(created_at <= now);
            assert!(created_at >= now - Duration::days(30));
        }
    }

    #[test]
    fn full_names_have_three_parts() {
        let (_, participants) = generate(5, 50);

        assert!(participants
            .iter()
            .all(|p| p.full_name.split(' ').count() == 3));
    }
}
