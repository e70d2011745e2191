// src/model/transformer.rs
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformerType {
    Bulk,
    Distribution,
}

impl TransformerType {
    pub const ALL: [TransformerType; 2] = [TransformerType::Bulk, TransformerType::Distribution];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransformerType::Bulk => "Bulk",
            TransformerType::Distribution => "Distribution",
        }
    }

    /// Backend rows predate the enum and may carry arbitrary casing.
    pub fn parse(s: &str) -> Option<TransformerType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => Some(TransformerType::Bulk),
            "distribution" => Some(TransformerType::Distribution),
            _ => None,
        }
    }
}

impl fmt::Display for TransformerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transformer {
    pub transformer_no: String,
    pub pole_no: String,
    pub region: String,
    pub transformer_type: Option<TransformerType>,
    pub location: String,
    pub capacity: Option<String>,
}

impl Transformer {
    pub fn type_label(&self) -> &str {
        self.transformer_type.map(|t| t.as_str()).unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_type_is_case_insensitive() {
        assert_eq!(TransformerType::parse("bulk"), Some(TransformerType::Bulk));
        assert_eq!(
            TransformerType::parse(" Distribution "),
            Some(TransformerType::Distribution)
        );
        assert_eq!(TransformerType::parse("solar"), None);
    }
}
