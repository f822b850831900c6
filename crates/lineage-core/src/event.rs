//! Yearly events derived from people and marriages.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{PersonId, marriage::Marriage, person::Person};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
  Birthday {
    person_id: PersonId,
    date:      NaiveDate,
    place:     Option<String>,
  },
  Anniversary {
    person_ids: (PersonId, PersonId),
    date:       NaiveDate,
    place:      Option<String>,
  },
}

impl Event {
  pub fn date(&self) -> NaiveDate {
    match self {
      Self::Birthday { date, .. } | Self::Anniversary { date, .. } => *date,
    }
  }
}

impl Person {
  pub fn birthday(&self) -> Event {
    Event::Birthday {
      person_id: self.id(),
      date:      self.date_of_birth(),
      place:     self.place_of_birth().map(str::to_owned),
    }
  }
}

/// Every birthday and anniversary, in calendar order (month, day, then year).
pub fn collect_events(people: &[Person], marriages: &[Marriage]) -> Vec<Event> {
  let mut events: Vec<Event> = marriages
    .iter()
    .map(Marriage::anniversary)
    .chain(people.iter().map(Person::birthday))
    .collect();
  events.sort_by_key(|e| {
    let d = e.date();
    (d.month(), d.day(), d.year())
  });
  events
}
