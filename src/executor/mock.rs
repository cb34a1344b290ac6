// Canned-response executor for driver and dispatcher tests
use super::{CatalogExecutor, CatalogRow};
use crate::error::{SchemaError, SchemaResult};
use serde_json::Value;
use std::sync::Mutex;

/// Executed statement with its bound parameters
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub sql: String,
    pub params: Vec<String>,
}

/// Returns the rows of the first registered fragment contained in the SQL
/// text, or no rows when nothing matches.
#[derive(Default)]
pub(crate) struct MockExecutor {
    responses: Vec<(String, Vec<CatalogRow>)>,
    failure: Option<(String, String)>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, fragment: &str, rows: Vec<Value>) -> Self {
        self.responses.push((
            fragment.to_string(),
            rows.into_iter().map(CatalogRow::from).collect(),
        ));
        self
    }

    /// Fail any statement containing `fragment`
    pub fn fail_on(mut self, fragment: &str, message: &str) -> Self {
        self.failure = Some((fragment.to_string(), message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait::async_trait]
impl CatalogExecutor for MockExecutor {
    async fn fetch_all(&self, sql: &str, params: &[String]) -> SchemaResult<Vec<CatalogRow>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        }

        if let Some((fragment, message)) = &self.failure {
            if sql.contains(fragment.as_str()) {
                return Err(SchemaError::query(message.clone()));
            }
        }

        Ok(self
            .responses
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}
