// Minimal structured SELECT builder for catalog queries.
//
// Identifiers passed here are fixed catalog names chosen by the drivers; every
// caller-supplied value (table, schema) goes through a bound parameter.
use crate::services::database::Platform;

#[derive(Debug, Clone)]
enum Condition {
    /// `column = <param>`
    Eq(String, String),
    /// `column = <raw expression>`
    EqExpr(String, String),
    /// `column NOT LIKE <param>`
    NotLike(String, String),
    /// `column IN (<params>)`
    In(String, Vec<String>),
}

#[derive(Debug, Clone)]
struct Join {
    table: String,
    on: Vec<(String, String)>,
}

/// SELECT statement under construction
#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    order_by: Vec<String>,
}

impl Select {
    pub fn from(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            joins: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn column_as(mut self, expr: &str, alias: &str) -> Self {
        self.columns.push(format!("{} AS {}", expr, alias));
        self
    }

    pub fn join(mut self, table: &str, on: &[(&str, &str)]) -> Self {
        self.joins.push(Join {
            table: table.to_string(),
            on: on
                .iter()
                .map(|(l, r)| (l.to_string(), r.to_string()))
                .collect(),
        });
        self
    }

    pub fn filter_eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    /// Compare against a raw SQL expression such as `DATABASE()`
    pub fn filter_eq_expr(mut self, column: &str, expr: &str) -> Self {
        self.conditions
            .push(Condition::EqExpr(column.to_string(), expr.to_string()));
        self
    }

    pub fn filter_not_like(mut self, column: &str, pattern: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::NotLike(column.to_string(), pattern.into()));
        self
    }

    pub fn filter_in(mut self, column: &str, values: &[&str]) -> Self {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn order_by(mut self, column: &str) -> Self {
        self.order_by.push(column.to_string());
        self
    }

    /// Render SQL text with placeholders in the platform's style, plus the
    /// positional parameters in order.
    pub fn build(&self, platform: Platform) -> (String, Vec<String>) {
        let mut params: Vec<String> = Vec::new();
        let bind = |value: &str, params: &mut Vec<String>| {
            params.push(value.to_string());
            platform.placeholder(params.len())
        };

        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {} FROM {}", columns, self.table);

        for join in &self.joins {
            let on: Vec<String> = join
                .on
                .iter()
                .map(|(l, r)| format!("{} = {}", l, r))
                .collect();
            sql.push_str(&format!(" JOIN {} ON {}", join.table, on.join(" AND ")));
        }

        let mut clauses = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let clause = match condition {
                Condition::Eq(column, value) => {
                    format!("{} = {}", column, bind(value, &mut params))
                }
                Condition::EqExpr(column, expr) => format!("{} = {}", column, expr),
                Condition::NotLike(column, pattern) => {
                    format!("{} NOT LIKE {}", column, bind(pattern, &mut params))
                }
                Condition::In(column, values) => {
                    let placeholders: Vec<String> =
                        values.iter().map(|v| bind(v, &mut params)).collect();
                    format!("{} IN ({})", column, placeholders.join(", "))
                }
            };
            clauses.push(clause);
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }

        (sql, params)
    }
}
