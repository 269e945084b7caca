use chrono::{Local, Months, NaiveDate};
use email_address::EmailAddress;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::identifier;
use super::normalization::{midnight_timestamp, trimmed_or_none};
use crate::models::{Person, PersonDraft};

/// Oldest plausible age, in years, for a birth date
pub const MAX_AGE_YEARS: u32 = 130;

/// Form fields that carry validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Cpf,
    BirthDate,
    Email,
    Address,
}

impl Field {
    /// Wire name of the field
    pub fn key(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Cpf => "cpf",
            Field::BirthDate => "birthDate",
            Field::Email => "email",
            Field::Address => "address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Empty,
    InvalidChecksum,
    InvalidDate,
    InvalidEmail,
}

impl FieldErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            FieldErrorKind::Empty => "EMPTY",
            FieldErrorKind::InvalidChecksum => "INVALID_CHECKSUM",
            FieldErrorKind::InvalidDate => "INVALID_DATE",
            FieldErrorKind::InvalidEmail => "INVALID_EMAIL",
        }
    }
}

/// Field-keyed validation failures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<Field, FieldErrorKind>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, kind: FieldErrorKind) {
        self.0.insert(field, kind);
    }

    pub fn get(&self, field: Field) -> Option<FieldErrorKind> {
        self.0.get(&field).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldErrorKind)> + '_ {
        self.0.iter().map(|(f, k)| (*f, *k))
    }

    /// Form label for a failure, as shown next to the input
    pub fn message(field: Field, kind: FieldErrorKind) -> &'static str {
        match (field, kind) {
            (Field::Name, FieldErrorKind::Empty) => "Nome é obrigatório",
            (Field::Cpf, FieldErrorKind::Empty) => "CPF é obrigatório",
            (Field::Cpf, _) => "CPF inválido",
            (Field::BirthDate, FieldErrorKind::Empty) => "Data de nascimento é obrigatória",
            (Field::BirthDate, _) => "Data de nascimento inválida",
            (Field::Email, _) => "Email inválido",
            (Field::Address, _) => "Endereço é obrigatório",
            (_, _) => "Valor inválido",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Authenticated submissions must carry an address
    pub require_address: bool,
}

/// Validates email shape: a well-formed address with a dotted domain
pub fn validate_email(email: &str) -> bool {
    match EmailAddress::from_str(email.trim()) {
        Ok(address) => {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}

/// Birth date check against the local calendar day
pub fn is_valid_birth_date(date: &str) -> bool {
    is_valid_birth_date_at(date, Local::now().date_naive())
}

/// Accepts an ISO `YYYY-MM-DD` date no later than `today` whose age in whole
/// years is at most 130
pub fn is_valid_birth_date_at(date: &str, today: NaiveDate) -> bool {
    parse_birth_date_at(date, today).is_some()
}

/// Parse a birth date, returning it only when it is in range
pub fn parse_birth_date_at(date: &str, today: NaiveDate) -> Option<NaiveDate> {
    let birth = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;

    // Age reaches MAX_AGE_YEARS + 1 on this day
    let too_old = today.checked_sub_months(Months::new((MAX_AGE_YEARS + 1) * 12))?;

    (birth <= today && birth > too_old).then_some(birth)
}

/// Validate a draft and produce the record to submit
///
/// Every rule runs; all failures are reported together.
pub fn validate_person(
    draft: &PersonDraft,
    options: ValidationOptions,
) -> Result<Person, FieldErrors> {
    validate_person_at(draft, options, Local::now().date_naive())
}

pub fn validate_person_at(
    draft: &PersonDraft,
    options: ValidationOptions,
    today: NaiveDate,
) -> Result<Person, FieldErrors> {
    let mut errors = FieldErrors::new();

    if draft.name.trim().is_empty() {
        errors.insert(Field::Name, FieldErrorKind::Empty);
    }

    let cpf = identifier::normalize(&draft.cpf);
    if draft.cpf.trim().is_empty() {
        errors.insert(Field::Cpf, FieldErrorKind::Empty);
    } else if !identifier::is_valid(&cpf) {
        errors.insert(Field::Cpf, FieldErrorKind::InvalidChecksum);
    }

    let birth = match trimmed_or_none(draft.birth_date.as_deref()) {
        None => {
            errors.insert(Field::BirthDate, FieldErrorKind::Empty);
            None
        }
        Some(date) => {
            let parsed = parse_birth_date_at(&date, today);
            if parsed.is_none() {
                errors.insert(Field::BirthDate, FieldErrorKind::InvalidDate);
            }
            parsed
        }
    };

    let email = trimmed_or_none(draft.email.as_deref());
    if let Some(email) = &email {
        if !validate_email(email) {
            errors.insert(Field::Email, FieldErrorKind::InvalidEmail);
        }
    }

    let address = trimmed_or_none(draft.address.as_deref());
    if options.require_address && address.is_none() {
        errors.insert(Field::Address, FieldErrorKind::Empty);
    }

    let birth = match birth {
        Some(birth) if errors.is_empty() => birth,
        _ => return Err(errors),
    };

    Ok(Person {
        id: draft.id,
        name: draft.name.trim().to_string(),
        gender: trimmed_or_none(draft.gender.as_deref()),
        email,
        birth_date: midnight_timestamp(birth),
        place_of_birth: trimmed_or_none(draft.place_of_birth.as_deref()),
        nationality: trimmed_or_none(draft.nationality.as_deref()),
        cpf,
        address,
        created_at: None,
        updated_at: None,
    })
}
