//! Marriage: an unordered pair of people.
//!
//! The two ids are kept in the order they were given, but that order carries
//! no meaning: "the marriage between A and B" is the same record as "the
//! marriage between B and A". See [`Marriage::key`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
  InvalidEntity, PersonId, Result,
  event::Event,
  person::normalize_place,
  query::Column,
};

/// Columns of the `marriages` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum MarriageColumn {
  #[strum(serialize = "person1_id")]
  Person1Id,
  #[strum(serialize = "person2_id")]
  Person2Id,
  #[strum(serialize = "start_date")]
  StartDate,
  #[strum(serialize = "end_date")]
  EndDate,
  #[strum(serialize = "place_of_marriage")]
  PlaceOfMarriage,
}

impl Column for MarriageColumn {
  fn name(self) -> &'static str { self.into() }
}

/// Order-independent identity of a pair of people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(PersonId, PersonId);

impl PairKey {
  pub fn new(a: PersonId, b: PersonId) -> Self {
    if a <= b { Self(a, b) } else { Self(b, a) }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MarriageRecord")]
pub struct Marriage {
  person1_id:        PersonId,
  person2_id:        PersonId,
  start_date:        NaiveDate,
  end_date:          Option<NaiveDate>,
  place_of_marriage: Option<String>,
}

/// Unvalidated input shape for a [`Marriage`].
#[derive(Debug, Clone, Deserialize)]
pub struct MarriageRecord {
  pub person1_id:        i64,
  pub person2_id:        i64,
  pub start_date:        NaiveDate,
  #[serde(default)]
  pub end_date:          Option<NaiveDate>,
  #[serde(default)]
  pub place_of_marriage: Option<String>,
}

impl TryFrom<MarriageRecord> for Marriage {
  type Error = InvalidEntity;

  fn try_from(r: MarriageRecord) -> Result<Self, InvalidEntity> {
    Marriage::new(PersonId::new(r.person1_id)?, PersonId::new(r.person2_id)?, r.start_date)?
      .with_end_date(r.end_date)
      .map(|m| m.with_place(r.place_of_marriage))
  }
}

impl Marriage {
  pub fn new(
    person1_id: PersonId,
    person2_id: PersonId,
    start_date: NaiveDate,
  ) -> Result<Self, InvalidEntity> {
    if person1_id == person2_id {
      return Err(InvalidEntity::SelfMarriage(person1_id));
    }
    Ok(Self {
      person1_id,
      person2_id,
      start_date,
      end_date: None,
      place_of_marriage: None,
    })
  }

  pub fn with_end_date(mut self, end_date: Option<NaiveDate>) -> Result<Self, InvalidEntity> {
    if let Some(end) = end_date
      && end < self.start_date
    {
      return Err(InvalidEntity::MarriageEndsBeforeStart);
    }
    self.end_date = end_date;
    Ok(self)
  }

  pub fn with_place(mut self, place: Option<String>) -> Self {
    self.place_of_marriage = normalize_place(place);
    self
  }

  pub fn person1_id(&self) -> PersonId { self.person1_id }

  pub fn person2_id(&self) -> PersonId { self.person2_id }

  pub fn ids(&self) -> (PersonId, PersonId) { (self.person1_id, self.person2_id) }

  pub fn key(&self) -> PairKey { PairKey::new(self.person1_id, self.person2_id) }

  pub fn start_date(&self) -> NaiveDate { self.start_date }

  pub fn end_date(&self) -> Option<NaiveDate> { self.end_date }

  pub fn place_of_marriage(&self) -> Option<&str> { self.place_of_marriage.as_deref() }

  pub fn is_ongoing(&self) -> bool { self.end_date.is_none() }

  pub fn involves(&self, id: PersonId) -> bool {
    self.person1_id == id || self.person2_id == id
  }

  /// The id of the person on the other side of the marriage from `id`.
  ///
  /// If `id` is not part of the marriage, the first spouse is returned.
  pub fn other_spouse_id(&self, id: PersonId) -> PersonId {
    if id == self.person1_id { self.person2_id } else { self.person1_id }
  }

  pub fn anniversary(&self) -> Event {
    Event::Anniversary {
      person_ids: self.ids(),
      date:       self.start_date,
      place:      self.place_of_marriage.clone(),
    }
  }
}
