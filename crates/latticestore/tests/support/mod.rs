//! Hand-rolled in-memory `Driver` double for the store-facade integration
//! tests. Good enough to exercise planner-generated
//! statements end to end; not a SQL engine.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use latticestore::{BoundStatement, Driver, DriverError, ExecuteOptions, Row, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static QUALIFIED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)"\."([^"]+)""#).unwrap());
static COLUMN_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^()]*)\)").unwrap());
static CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([A-Za-z0-9_\[\]]+)"\s*(=|!=|<=|>=|<|>)\s*\?"#).unwrap());

#[derive(Default)]
pub struct MockDriver {
    families: Mutex<HashMap<(String, String), Vec<Row>>>,
    pub executed: Mutex<Vec<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, keyspace: &str, family: &str) -> Vec<Row> {
        self.families
            .lock()
            .unwrap()
            .get(&(keyspace.to_string(), family.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn family_mut<'a>(
        families: &'a mut HashMap<(String, String), Vec<Row>>,
        ks: &str,
        fam: &str,
    ) -> &'a mut Vec<Row> {
        families.entry((ks.to_string(), fam.to_string())).or_default()
    }
}

fn qualified(query: &str) -> (String, String) {
    let caps = QUALIFIED.captures(query).expect("query must reference a qualified table");
    (caps[1].to_string(), caps[2].to_string())
}

fn column_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().trim_matches('"').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn values_match(existing: &Value, bound: &Value) -> bool {
    existing == bound
}

fn cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Varint(x), Value::Varint(y)) => x.partial_cmp(y),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.partial_cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.partial_cmp(y),
        _ => None,
    }
}

/// Evaluates a ` AND `-joined run of `"col" op ?` clauses against `row`,
/// consuming bound params from `params` left to right.
fn eval_clauses(row: Option<&Row>, clause_text: &str, params: &[Value]) -> bool {
    let mut idx = 0;
    for caps in CLAUSE.captures_iter(clause_text) {
        let col = &caps[1];
        let op = &caps[2];
        let Some(bound) = params.get(idx) else { return false };
        idx += 1;

        let Some(row) = row else { return false };
        let Some(actual) = row.get(col) else { return false };

        let ok = match op {
            "=" => values_match(actual, bound),
            "!=" => !values_match(actual, bound),
            "<" => cmp_values(actual, bound) == Some(Ordering::Less),
            ">" => cmp_values(actual, bound) == Some(Ordering::Greater),
            "<=" => matches!(cmp_values(actual, bound), Some(Ordering::Less | Ordering::Equal)),
            ">=" => matches!(cmp_values(actual, bound), Some(Ordering::Greater | Ordering::Equal)),
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    true
}

fn applied_row(applied: bool) -> Vec<Row> {
    let mut row = Row::new();
    row.insert("[applied]".to_string(), Value::Bool(applied));
    vec![row]
}

#[async_trait]
impl Driver for MockDriver {
    async fn execute(
        &self,
        statement: BoundStatement,
        _options: ExecuteOptions,
    ) -> Result<Vec<Row>, DriverError> {
        self.executed.lock().unwrap().push(statement.query.clone());
        let query = statement.query.as_str();
        let params = statement.params.as_slice();

        if query.starts_with("CREATE KEYSPACE") || query.starts_with("CREATE TABLE") {
            return Ok(Vec::new());
        }

        if let Some(rest) = query.strip_prefix("DROP KEYSPACE ") {
            let ks = rest.trim_matches('"');
            self.families.lock().unwrap().retain(|(k, _), _| k != ks);
            return Ok(Vec::new());
        }

        if query.starts_with("INSERT INTO") {
            let (ks, fam) = qualified(query);
            let paren = COLUMN_LIST.captures(query).expect("INSERT must name columns");
            let columns = column_names(&paren[1]);
            let not_exists = query.ends_with("IF NOT EXISTS");

            let mut row = Row::new();
            for (col, value) in columns.iter().zip(params.iter()) {
                row.insert(col.clone(), value.clone());
            }

            let mut families = self.families.lock().unwrap();
            let existing = Self::family_mut(&mut families, &ks, &fam);
            let duplicate = existing.iter().any(|r| r == &row);

            if not_exists {
                if duplicate {
                    return Ok(applied_row(false));
                }
                existing.push(row);
                return Ok(applied_row(true));
            }

            existing.push(row);
            Ok(Vec::new())
        } else if query.starts_with("UPDATE") {
            let (ks, fam) = qualified(query);
            let set_part = query.split(" SET ").nth(1).unwrap_or("");
            let set_part = set_part.split(" WHERE ").next().unwrap_or("");
            let set_cols: Vec<String> =
                set_part.split(',').filter_map(|c| c.split('=').next()).map(|c| c.trim().trim_matches('"').to_string()).collect();

            let rest = query.split(" WHERE ").nth(1).unwrap_or("");
            let (where_clause, if_clause) = match rest.split_once(" IF ") {
                Some((w, i)) => (w, Some(i)),
                None => (rest, None),
            };

            let set_count = set_cols.len();
            let set_values = &params[..set_count];
            let mut cursor = set_count;
            let where_clause_matches = CLAUSE.find_iter(where_clause).count();
            let where_params = &params[cursor..cursor + where_clause_matches];
            cursor += where_clause_matches;
            let if_params = &params[cursor..];

            let mut families = self.families.lock().unwrap();
            let rows = Self::family_mut(&mut families, &ks, &fam);
            let position = rows.iter().position(|r| eval_clauses(Some(r), where_clause, where_params));

            if let Some(clause) = if_clause {
                let applied = eval_clauses(position.map(|i| &rows[i]), clause, if_params);
                if !applied {
                    return Ok(applied_row(false));
                }
            }

            match position {
                Some(i) => {
                    for (col, value) in set_cols.iter().zip(set_values.iter()) {
                        rows[i].insert(col.clone(), value.clone());
                    }
                }
                None => {
                    let mut row = Row::new();
                    for (col, value) in set_cols.iter().zip(set_values.iter()) {
                        row.insert(col.clone(), value.clone());
                    }
                    for (caps, value) in CLAUSE.captures_iter(where_clause).zip(where_params.iter()) {
                        row.insert(caps[1].to_string(), value.clone());
                    }
                    rows.push(row);
                }
            }

            if if_clause.is_some() {
                Ok(applied_row(true))
            } else {
                Ok(Vec::new())
            }
        } else if query.starts_with("SELECT") {
            let (ks, fam) = qualified(query);
            let projection = query
                .strip_prefix("SELECT ")
                .unwrap()
                .split(" FROM")
                .next()
                .unwrap()
                .trim();
            let distinct = projection.starts_with("distinct ");
            let projection = projection.strip_prefix("distinct ").unwrap_or(projection);

            let where_clause = query.split(" WHERE ").nth(1).map(|rest| {
                rest.split(" ORDER BY ").next().unwrap().split(" LIMIT ").next().unwrap()
            });

            let rows = self.rows(&ks, &fam);
            let mut matched: Vec<Row> = match where_clause {
                Some(clause) => {
                    rows.into_iter().filter(|row| eval_clauses(Some(row), clause, params)).collect()
                }
                None => rows,
            };

            if let Some(order_part) = query.split(" ORDER BY ").nth(1) {
                let order_part = order_part.split(" LIMIT ").next().unwrap().trim();
                if let Some((col, dir)) = order_part.rsplit_once(' ') {
                    let col = col.trim_matches('"').to_string();
                    matched.sort_by(|a, b| {
                        let ord = match (a.get(&col), b.get(&col)) {
                            (Some(x), Some(y)) => cmp_values(x, y).unwrap_or(Ordering::Equal),
                            _ => Ordering::Equal,
                        };
                        if dir.eq_ignore_ascii_case("desc") {
                            ord.reverse()
                        } else {
                            ord
                        }
                    });
                }
            }

            if let Some(limit_part) = query.split(" LIMIT ").nth(1) {
                if let Ok(n) = limit_part.trim().parse::<usize>() {
                    matched.truncate(n);
                }
            }

            if distinct {
                matched.dedup();
            }

            if projection != "*" {
                let cols = column_names(projection);
                matched = matched
                    .into_iter()
                    .map(|row| {
                        cols.iter()
                            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                            .collect()
                    })
                    .collect();
            }

            Ok(matched)
        } else if query.starts_with("DELETE FROM") {
            let (ks, fam) = qualified(query);
            let where_clause = query.split(" WHERE ").nth(1);

            let mut families = self.families.lock().unwrap();
            let rows = Self::family_mut(&mut families, &ks, &fam);
            match where_clause {
                Some(clause) => rows.retain(|row| !eval_clauses(Some(row), clause, params)),
                None => rows.clear(),
            }
            Ok(Vec::new())
        } else {
            Err(DriverError::new(format!("MockDriver cannot interpret: {query}")))
        }
    }

    async fn batch(
        &self,
        statements: Vec<BoundStatement>,
        options: ExecuteOptions,
    ) -> Result<(), DriverError> {
        for statement in statements {
            self.execute(statement, options.clone()).await?;
        }
        Ok(())
    }
}
