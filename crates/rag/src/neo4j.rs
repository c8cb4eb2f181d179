//! Neo4j knowledge graph over the transactional HTTP endpoint
//!
//! Each query is one auto-commit transaction:
//! `POST {endpoint}/db/{database}/tx/commit` with the rendered statement and
//! its parameters. Rows are zipped with the returned column names and read
//! as [`RetrievalCandidate`]s.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use wallet_support_config::RetrievalConfig;
use wallet_support_core::{GraphQuery, KnowledgeGraph, RetrievalCandidate};

use crate::RagError;

/// Connection settings
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub endpoint: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl From<&RetrievalConfig> for Neo4jConfig {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

/// Read candidates out of a transactional endpoint response body
fn parse_response(response: TxResponse) -> Result<Vec<RetrievalCandidate>, RagError> {
    if let Some(error) = response.errors.first() {
        return Err(RagError::Query(format!("{}: {}", error.code, error.message)));
    }

    let mut candidates = Vec::new();
    for result in response.results {
        for data in result.data {
            let object: Map<String, Value> = result
                .columns
                .iter()
                .cloned()
                .zip(data.row)
                .collect();
            let candidate: RetrievalCandidate = serde_json::from_value(Value::Object(object))
                .map_err(|e| RagError::Parse(format!("Unexpected row shape: {}", e)))?;
            candidates.push(candidate);
        }
    }
    Ok(candidates)
}

/// Knowledge graph backed by a Neo4j server
pub struct Neo4jGraph {
    client: reqwest::Client,
    config: Neo4jConfig,
}

impl Neo4jGraph {
    pub fn new(config: Neo4jConfig) -> Result<Self, RagError> {
        if config.endpoint.trim().is_empty() {
            return Err(RagError::Configuration("Neo4j endpoint is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Connection(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Neo4jConfig {
        &self.config
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/db/{}/tx/commit",
            self.config.endpoint.trim_end_matches('/'),
            self.config.database
        )
    }

    /// Run one statement in an auto-commit transaction
    pub async fn execute(&self, query: &GraphQuery) -> Result<Vec<RetrievalCandidate>, RagError> {
        let body = json!({
            "statements": [{
                "statement": query.statement,
                "parameters": query.parameters,
            }]
        });

        let mut request = self.client.post(self.commit_url()).json(&body);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RagError::Timeout(timeout_ms)
            } else {
                RagError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RagError::Connection(format!("HTTP {}: {}", status, text)));
        }

        let parsed: TxResponse = response.json().await?;
        parse_response(parsed)
    }
}

#[async_trait]
impl KnowledgeGraph for Neo4jGraph {
    async fn query(&self, query: &GraphQuery) -> wallet_support_core::Result<Vec<RetrievalCandidate>> {
        Ok(self.execute(query).await?)
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: Value) -> TxResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_commit_url() {
        let graph = Neo4jGraph::new(Neo4jConfig {
            endpoint: "http://localhost:7474/".into(),
            database: "neo4j".into(),
            username: None,
            password: None,
            timeout: Duration::from_millis(500),
        })
        .unwrap();
        assert_eq!(graph.commit_url(), "http://localhost:7474/db/neo4j/tx/commit");
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let config = Neo4jConfig {
            endpoint: " ".into(),
            ..Neo4jConfig::from(&RetrievalConfig::default())
        };
        assert!(matches!(Neo4jGraph::new(config), Err(RagError::Configuration(_))));
    }

    #[test]
    fn test_parse_rows() {
        let parsed = parse_response(response(json!({
            "results": [{
                "columns": ["id", "title", "content", "bank_id", "matched_service", "matched_problem",
                            "matched_state", "matched_outcome", "tier", "score"],
                "data": [
                    {"row": ["q1", "Nạp tiền lỗi", "Liên hệ", null, "nap_tien", "tra_soat", "failed", null, 4, 125.0],
                     "meta": []},
                    {"row": ["q2", "Nạp tiền", "", "VCB", "nap_tien", null, null, null, 2, 40]}
                ]
            }],
            "errors": []
        })))
        .unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].base_score, 125.0);
        assert_eq!(parsed[0].matched_state.as_deref(), Some("failed"));
        assert_eq!(parsed[1].bank_id.as_deref(), Some("VCB"));
        assert_eq!(parsed[1].matched_problem, None);
    }

    #[test]
    fn test_parse_error_payload() {
        let err = parse_response(response(json!({
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        })))
        .unwrap_err();
        assert!(matches!(err, RagError::Query(m) if m.contains("SyntaxError")));
    }
}
