use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::SessionStore;
use crate::backend::{ApiSurface, PersonApi};
use crate::error::{AppError, AppResult};
use crate::models::{Person, PersonDraft};
use crate::schema::identifier;
use crate::schema::{validate_person, ValidationOptions};

/// List, create, edit and delete use cases
///
/// The surface is chosen from the session state at call time, and the same
/// state decides whether an address is mandatory.
pub struct PersonWorkflow {
    api: Arc<dyn PersonApi>,
    session: Arc<SessionStore>,
}

impl PersonWorkflow {
    pub fn new(api: Arc<dyn PersonApi>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    fn surface(&self) -> ApiSurface {
        self.session.current_surface()
    }

    fn validation_options(surface: ApiSurface) -> ValidationOptions {
        ValidationOptions {
            require_address: surface == ApiSurface::Authenticated,
        }
    }

    /// Fetch every record, optionally narrowed by a search term
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Person>> {
        let people = self.api.list(self.surface()).await?;
        Ok(match search {
            Some(term) => filter_people(people, term),
            None => people,
        })
    }

    /// Load a record for editing
    pub async fn load(&self, id: i64) -> AppResult<Option<Person>> {
        self.api.get(self.surface(), id).await
    }

    /// Form pre-filled from the stored record; `None` when nothing came back
    pub async fn load_draft(&self, id: i64) -> AppResult<Option<PersonDraft>> {
        Ok(self.load(id).await?.as_ref().map(PersonDraft::from_person))
    }

    pub async fn create(&self, draft: &PersonDraft) -> AppResult<Option<Person>> {
        let surface = self.surface();
        let person = validate_person(draft, Self::validation_options(surface))
            .map_err(AppError::Validation)?;

        debug!("Creating person on {} surface", surface);
        let created = self.api.create(surface, &person).await?;
        info!("Registered {}", person.name);
        Ok(created)
    }

    pub async fn update(&self, id: i64, draft: &PersonDraft) -> AppResult<Option<Person>> {
        let surface = self.surface();
        let person = validate_person(draft, Self::validation_options(surface))
            .map_err(AppError::Validation)?;

        debug!("Updating person {} on {} surface", id, surface);
        let updated = self.api.update(surface, id, &person).await?;
        info!("Updated {}", person.name);
        Ok(updated)
    }

    /// Delete a record and return the refreshed list
    pub async fn delete(&self, id: i64) -> AppResult<Vec<Person>> {
        let surface = self.surface();
        self.api.delete(surface, id).await?;
        info!("Removed person {}", id);
        self.api.list(surface).await
    }
}

/// Dashboard search: name, email or place of birth contain the term
/// (case-insensitive), or the CPF contains the term's digits
pub fn filter_people(people: Vec<Person>, term: &str) -> Vec<Person> {
    let term = term.trim();
    if term.is_empty() {
        return people;
    }

    let needle = term.to_lowercase();
    let digits = identifier::normalize(term);
    let contains = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    };

    people
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || (!digits.is_empty() && p.cpf.contains(&digits))
                || contains(&p.email)
                || contains(&p.place_of_birth)
        })
        .collect()
}
