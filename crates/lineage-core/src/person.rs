//! Person: a member of the family.
//!
//! A [`Person`] can only be obtained through [`Person::new`], which normalises
//! and validates its [`PersonDetails`]. Invalid data therefore never reaches a
//! store.

use std::{cmp::Ordering, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{InvalidEntity, Result, query::Column};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// A unique, positive person identifier, assigned by the store's
/// auto-increment counter.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct PersonId(i64);

impl PersonId {
  pub fn new(id: i64) -> Result<Self, InvalidEntity> {
    if id > 0 { Ok(Self(id)) } else { Err(InvalidEntity::NonPositiveId(id)) }
  }

  pub fn get(self) -> i64 { self.0 }
}

impl TryFrom<i64> for PersonId {
  type Error = InvalidEntity;

  fn try_from(id: i64) -> Result<Self, InvalidEntity> { Self::new(id) }
}

impl From<PersonId> for i64 {
  fn from(id: PersonId) -> Self { id.0 }
}

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Gender ──────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  /// Integer code stored in the `gender_id` column. 0 = male; 1 = female.
  pub fn id(self) -> i64 {
    match self {
      Self::Male => 0,
      Self::Female => 1,
    }
  }

  pub fn from_id(id: i64) -> Result<Self, InvalidEntity> {
    match id {
      0 => Ok(Self::Male),
      1 => Ok(Self::Female),
      other => Err(InvalidEntity::UnknownGender(other)),
    }
  }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Columns of the `persons` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PersonColumn {
  Id,
  Forename,
  Surname,
  GenderId,
  DateOfBirth,
  PlaceOfBirth,
  DateOfDeath,
  PlaceOfDeath,
}

impl Column for PersonColumn {
  fn name(self) -> &'static str { self.into() }
}

// ─── Details ─────────────────────────────────────────────────────────────────

/// The mutable attributes of a person, as supplied by a caller.
///
/// Nothing here is validated until it is turned into a [`Person`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetails {
  pub forename:       String,
  pub surname:        String,
  pub gender:         Gender,
  pub date_of_birth:  NaiveDate,
  #[serde(default)]
  pub place_of_birth: Option<String>,
  #[serde(default)]
  pub date_of_death:  Option<NaiveDate>,
  #[serde(default)]
  pub place_of_death: Option<String>,
}

impl PersonDetails {
  /// Trim names and places, dropping places that are left blank.
  fn normalized(self) -> Self {
    Self {
      forename: self.forename.trim().to_owned(),
      surname: self.surname.trim().to_owned(),
      place_of_birth: normalize_place(self.place_of_birth),
      place_of_death: normalize_place(self.place_of_death),
      ..self
    }
  }

  fn validate(&self) -> Result<(), InvalidEntity> {
    if self.forename.is_empty() || self.surname.is_empty() {
      return Err(InvalidEntity::BlankName);
    }
    if let Some(death) = self.date_of_death
      && death < self.date_of_birth
    {
      return Err(InvalidEntity::DeathBeforeBirth);
    }
    Ok(())
  }
}

pub(crate) fn normalize_place(place: Option<String>) -> Option<String> {
  place
    .map(|p| p.trim().to_owned())
    .filter(|p| !p.is_empty())
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A validated member of the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersonRecord")]
pub struct Person {
  id:      PersonId,
  #[serde(flatten)]
  details: PersonDetails,
}

/// Wire shape used to deserialise a [`Person`] through validation.
#[derive(Deserialize)]
struct PersonRecord {
  id:      i64,
  #[serde(flatten)]
  details: PersonDetails,
}

impl TryFrom<PersonRecord> for Person {
  type Error = InvalidEntity;

  fn try_from(record: PersonRecord) -> Result<Self, InvalidEntity> {
    Person::new(PersonId::new(record.id)?, record.details)
  }
}

impl Person {
  pub fn new(id: PersonId, details: PersonDetails) -> Result<Self, InvalidEntity> {
    let details = details.normalized();
    details.validate()?;
    Ok(Self { id, details })
  }

  /// Replace the mutable attributes, keeping the identifier.
  pub fn with_details(&self, details: PersonDetails) -> Result<Self, InvalidEntity> {
    Self::new(self.id, details)
  }

  pub fn id(&self) -> PersonId { self.id }

  pub fn details(&self) -> &PersonDetails { &self.details }

  pub fn forename(&self) -> &str { &self.details.forename }

  pub fn surname(&self) -> &str { &self.details.surname }

  pub fn gender(&self) -> Gender { self.details.gender }

  pub fn date_of_birth(&self) -> NaiveDate { self.details.date_of_birth }

  pub fn place_of_birth(&self) -> Option<&str> { self.details.place_of_birth.as_deref() }

  pub fn date_of_death(&self) -> Option<NaiveDate> { self.details.date_of_death }

  pub fn place_of_death(&self) -> Option<&str> { self.details.place_of_death.as_deref() }

  pub fn full_name(&self) -> String {
    format!("{} {}", self.details.forename, self.details.surname)
  }

  pub fn is_alive(&self) -> bool { self.details.date_of_death.is_none() }

  /// Ordering used wherever a list of people must be deterministic: date of
  /// birth, then full name, then id.
  pub fn cmp_by_birth(&self, other: &Self) -> Ordering {
    self
      .date_of_birth()
      .cmp(&other.date_of_birth())
      .then_with(|| self.full_name().cmp(&other.full_name()))
      .then_with(|| self.id.cmp(&other.id))
  }
}
