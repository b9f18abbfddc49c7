use chrono::{DateTime, Utc};
use database::model::participant::{is_valid_email, normalize_email, NewParticipant, Participant};
use serde::Serialize;
use serde_json::{Map, Value};

const ALLOWED_FIELDS: [&str; 3] = ["email", "fullName", "phone"];

const FULL_NAME_MIN_CHARS: usize = 2;
const FULL_NAME_MAX_CHARS: usize = 100;

/// Validated body of `POST /participants`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateParticipantRequest {
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
}

impl CreateParticipantRequest {
    /// Normalizes and validates a request body, collecting every violated rule
    pub fn from_json(body: &Value) -> Result<Self, Vec<String>> {
        let object = match body.as_object() {
            Some(object) => object,
            None => return Err(vec!["request body must be a JSON object".to_string()]),
        };

        let mut violations: Vec<String> = object
            .keys()
            .filter(|key| !ALLOWED_FIELDS.contains(&key.as_str()))
            .map(|key| format!("property {} should not exist", key))
            .collect();

        let email = validate_email(object, &mut violations);
        let full_name = validate_full_name(object, &mut violations);
        let phone = validate_phone(object, &mut violations);

        match (email, full_name) {
            (Some(email), Some(full_name)) if violations.is_empty() => Ok(Self {
                email,
                full_name,
                phone,
            }),
            _ => Err(violations),
        }
    }

    pub fn into_new_participant(self) -> NewParticipant {
        NewParticipant::new(&self.email, &self.full_name, self.phone.as_deref())
    }
}

fn validate_email(object: &Map<String, Value>, violations: &mut Vec<String>) -> Option<String> {
    match object.get("email") {
        None | Some(Value::Null) => {
            violations.push("email is required".to_string());
            None
        }
        Some(Value::String(email)) => {
            let email = normalize_email(email);

            if is_valid_email(&email) {
                Some(email)
            } else {
                violations.push("email must be a valid email address".to_string());
                None
            }
        }
        Some(_) => {
            violations.push("email must be a string".to_string());
            None
        }
    }
}

fn validate_full_name(
    object: &Map<String, Value>,
    violations: &mut Vec<String>,
) -> Option<String> {
    match object.get("fullName") {
        None | Some(Value::Null) => {
            violations.push("fullName is required".to_string());
            None
        }
        Some(Value::String(full_name)) => {
            let full_name = full_name.trim();
            let chars = full_name.chars().count();

            if chars < FULL_NAME_MIN_CHARS {
                violations.push(format!(
                    "fullName must be at least {} characters",
                    FULL_NAME_MIN_CHARS
                ));
                None
            } else if chars > FULL_NAME_MAX_CHARS {
                violations.push(format!(
                    "fullName must not exceed {} characters",
                    FULL_NAME_MAX_CHARS
                ));
                None
            } else {
                Some(full_name.to_string())
            }
        }
        Some(_) => {
            violations.push("fullName must be a string".to_string());
            None
        }
    }
}

fn validate_phone(object: &Map<String, Value>, violations: &mut Vec<String>) -> Option<String> {
    match object.get("phone") {
        None | Some(Value::Null) => None,
        Some(Value::String(phone)) => Some(phone.trim())
            .filter(|phone| !phone.is_empty())
            .map(str::to_string),
        Some(_) => {
            violations.push("phone must be a string".to_string());
            None
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id.0,
            email: participant.email,
            full_name: participant.full_name,
            phone: participant.phone.filter(|phone| !phone.is_empty()),
            created_at: participant.created_at,
            updated_at: participant.updated_at,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ParticipantsListResponse {
    pub participants: Vec<ParticipantResponse>,
    pub total: usize,
    pub message: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CountResponse {
    pub total: usize,
}

/// Every successful response is wrapped in this envelope
#[derive(Serialize, Debug)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}
