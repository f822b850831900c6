//! Mapping between entities and SQLite rows.
//!
//! Each entity implements [`Table`]: a row → raw-values reader that runs on
//! the database thread, a raw-values → entity decoder that validates, and an
//! entity → column-values encoder used for inserts and updates. Dates are
//! stored as ISO 8601 text (`YYYY-MM-DD`).

use chrono::NaiveDate;
use lineage_core::{
  PersonId,
  child::{ChildColumn, ChildRelationship},
  marriage::{Marriage, MarriageColumn},
  person::{Gender, Person, PersonColumn, PersonDetails},
  store::Entity,
};
use rusqlite::{Row, types::Value as SqlValue};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn opt_date(d: Option<NaiveDate>) -> SqlValue {
  d.map_or(SqlValue::Null, |d| SqlValue::Text(encode_date(d)))
}

fn opt_text(s: Option<&str>) -> SqlValue {
  s.map_or(SqlValue::Null, |s| SqlValue::Text(s.to_owned()))
}

// ─── Table mapping ───────────────────────────────────────────────────────────

pub trait Table: Entity {
  const TABLE: &'static str;

  /// Every column, in the order rows are selected and values are encoded.
  const COLUMNS: &'static [Self::Column];

  /// Plain values read from one row on the database thread.
  type Raw: Send + 'static;

  fn read_row(row: &Row<'_>) -> rusqlite::Result<Self::Raw>;

  fn decode(raw: Self::Raw) -> Result<Self>;

  /// One value per entry of [`Table::COLUMNS`].
  fn encode(&self) -> Vec<SqlValue>;
}

// ─── Person ──────────────────────────────────────────────────────────────────

pub struct RawPerson {
  pub id:             i64,
  pub forename:       String,
  pub surname:        String,
  pub gender_id:      i64,
  pub date_of_birth:  String,
  pub place_of_birth: Option<String>,
  pub date_of_death:  Option<String>,
  pub place_of_death: Option<String>,
}

impl Table for Person {
  const TABLE: &'static str = "persons";
  const COLUMNS: &'static [PersonColumn] = &[
    PersonColumn::Id,
    PersonColumn::Forename,
    PersonColumn::Surname,
    PersonColumn::GenderId,
    PersonColumn::DateOfBirth,
    PersonColumn::PlaceOfBirth,
    PersonColumn::DateOfDeath,
    PersonColumn::PlaceOfDeath,
  ];

  type Raw = RawPerson;

  fn read_row(row: &Row<'_>) -> rusqlite::Result<RawPerson> {
    Ok(RawPerson {
      id:             row.get(0)?,
      forename:       row.get(1)?,
      surname:        row.get(2)?,
      gender_id:      row.get(3)?,
      date_of_birth:  row.get(4)?,
      place_of_birth: row.get(5)?,
      date_of_death:  row.get(6)?,
      place_of_death: row.get(7)?,
    })
  }

  fn decode(raw: RawPerson) -> Result<Person> {
    let details = PersonDetails {
      forename:       raw.forename,
      surname:        raw.surname,
      gender:         Gender::from_id(raw.gender_id)?,
      date_of_birth:  decode_date(&raw.date_of_birth)?,
      place_of_birth: raw.place_of_birth,
      date_of_death:  raw.date_of_death.as_deref().map(decode_date).transpose()?,
      place_of_death: raw.place_of_death,
    };
    Ok(Person::new(PersonId::new(raw.id)?, details)?)
  }

  fn encode(&self) -> Vec<SqlValue> {
    vec![
      SqlValue::Integer(self.id().get()),
      SqlValue::Text(self.forename().to_owned()),
      SqlValue::Text(self.surname().to_owned()),
      SqlValue::Integer(self.gender().id()),
      SqlValue::Text(encode_date(self.date_of_birth())),
      opt_text(self.place_of_birth()),
      opt_date(self.date_of_death()),
      opt_text(self.place_of_death()),
    ]
  }
}

// ─── Marriage ────────────────────────────────────────────────────────────────

pub struct RawMarriage {
  pub person1_id:        i64,
  pub person2_id:        i64,
  pub start_date:        String,
  pub end_date:          Option<String>,
  pub place_of_marriage: Option<String>,
}

impl Table for Marriage {
  const TABLE: &'static str = "marriages";
  const COLUMNS: &'static [MarriageColumn] = &[
    MarriageColumn::Person1Id,
    MarriageColumn::Person2Id,
    MarriageColumn::StartDate,
    MarriageColumn::EndDate,
    MarriageColumn::PlaceOfMarriage,
  ];

  type Raw = RawMarriage;

  fn read_row(row: &Row<'_>) -> rusqlite::Result<RawMarriage> {
    Ok(RawMarriage {
      person1_id:        row.get(0)?,
      person2_id:        row.get(1)?,
      start_date:        row.get(2)?,
      end_date:          row.get(3)?,
      place_of_marriage: row.get(4)?,
    })
  }

  fn decode(raw: RawMarriage) -> Result<Marriage> {
    let marriage = Marriage::new(
      PersonId::new(raw.person1_id)?,
      PersonId::new(raw.person2_id)?,
      decode_date(&raw.start_date)?,
    )?
    .with_end_date(raw.end_date.as_deref().map(decode_date).transpose()?)?
    .with_place(raw.place_of_marriage);
    Ok(marriage)
  }

  fn encode(&self) -> Vec<SqlValue> {
    vec![
      SqlValue::Integer(self.person1_id().get()),
      SqlValue::Integer(self.person2_id().get()),
      SqlValue::Text(encode_date(self.start_date())),
      opt_date(self.end_date()),
      opt_text(self.place_of_marriage()),
    ]
  }
}

// ─── ChildRelationship ───────────────────────────────────────────────────────

impl Table for ChildRelationship {
  const TABLE: &'static str = "children";
  const COLUMNS: &'static [ChildColumn] = &[ChildColumn::ParentId, ChildColumn::ChildId];

  type Raw = (i64, i64);

  fn read_row(row: &Row<'_>) -> rusqlite::Result<(i64, i64)> { Ok((row.get(0)?, row.get(1)?)) }

  fn decode((parent_id, child_id): (i64, i64)) -> Result<ChildRelationship> {
    Ok(ChildRelationship::new(PersonId::new(parent_id)?, PersonId::new(child_id)?)?)
  }

  fn encode(&self) -> Vec<SqlValue> {
    vec![
      SqlValue::Integer(self.parent_id().get()),
      SqlValue::Integer(self.child_id().get()),
    ]
  }
}
