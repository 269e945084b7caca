use serde::{Deserialize, Serialize};

/// Person record as exchanged with both API surfaces
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub birth_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    pub cpf: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    // Server-assigned; never sent back
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

/// Unvalidated form input for a person record
///
/// Every field is raw text as typed. `Default` gives the empty form used when
/// registering a new person.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDraft {
    pub id: Option<i64>,
    pub name: String,
    pub gender: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub place_of_birth: Option<String>,
    pub nationality: Option<String>,
    pub cpf: String,
    pub address: Option<String>,
}

impl PersonDraft {
    /// Hydrate the edit form from a fetched record
    pub fn from_person(person: &Person) -> Self {
        // The form works with the date part only
        let birth_date = person
            .birth_date
            .split('T')
            .next()
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Self {
            id: person.id,
            name: person.name.clone(),
            gender: person.gender.clone(),
            email: person.email.clone(),
            birth_date,
            place_of_birth: person.place_of_birth.clone(),
            nationality: person.nationality.clone(),
            cpf: person.cpf.clone(),
            address: person.address.clone(),
        }
    }
}

/// Gender options offered by the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
    Undisclosed,
}

impl Gender {
    pub const ALL: [Gender; 4] = [Gender::Male, Gender::Female, Gender::Other, Gender::Undisclosed];

    /// Label stored on the record
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Masculino",
            Gender::Female => "Feminino",
            Gender::Other => "Outro",
            Gender::Undisclosed => "Prefiro não informar",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.label() == label.trim())
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Authenticated user identity
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

impl AuthResponse {
    pub fn principal(&self) -> Principal {
        Principal {
            username: self.username.clone(),
            role: self.role.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
