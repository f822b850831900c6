//! Compile [`Query`] trees into SQL `WHERE` clauses with bound parameters.

use lineage_core::query::{Column, Predicate, Query, Value};
use rusqlite::types::Value as SqlValue;

/// A `WHERE` clause body and the parameters it binds, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
  pub clause: String,
  pub params: Vec<SqlValue>,
}

pub fn compile<C: Column>(query: &Query<C>) -> Compiled {
  let mut params = Vec::new();
  let clause = clause(query, &mut params);
  Compiled { clause, params }
}

fn clause<C: Column>(query: &Query<C>, params: &mut Vec<SqlValue>) -> String {
  // An empty filter set matches every row.
  if query.is_empty() {
    return "1".to_owned();
  }

  let parts: Vec<String> = query
    .predicates()
    .iter()
    .map(|p| match p {
      Predicate::Filter(f) => {
        params.push(to_sql(&f.value));
        format!("{} = ?", f.column.name())
      }
      Predicate::Query(q) => format!("({})", clause(q, params)),
    })
    .collect();
  parts.join(&format!(" {} ", query.join().keyword()))
}

pub fn to_sql(value: &Value) -> SqlValue {
  match value {
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Text(s) => SqlValue::Text(s.clone()),
  }
}
