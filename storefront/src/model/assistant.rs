//! Shopping assistant and recommendations

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Natural language question about the catalog
#[derive(Debug, Clone, Serialize)]
pub struct Query<'a> {
    pub message: &'a str,
}

/// Assistant reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub response: String,
    /// Query the assistant ran against the catalog
    #[serde(default)]
    pub sql_query: Option<String>,
    /// Matching catalog rows, in whatever shape the assistant produced them
    #[serde(default)]
    pub products: Option<Vec<Value>>,
}

/// Example questions
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
}
