use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::pricing::{AnswerMap, Question, RulesSource, Valuation};

/// Full assessment submitted by the valuation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    pub product_id: String,
    #[serde(default)]
    pub answers: AnswerMap,
}

/// Priced assessment returned to the customer-facing flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationQuote {
    pub product: Product,
    pub rules_source: RulesSource,
    pub valuation: Valuation,
    pub quoted_at: DateTime<Utc>,
}

/// Request shape of the original `/api/calculate` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCalculateRequest {
    pub product_id: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub accessories: Vec<String>,
}

/// Overall cosmetic grades the legacy form offers.
pub const LEGACY_CONDITIONS: &[&str] = &["excellent", "good", "fair", "poor"];

impl LegacyCalculateRequest {
    /// Checks the legacy fields against the options the old form could send.
    pub fn validate(&self) -> Result<(), String> {
        if self.product_id.trim().is_empty() {
            return Err("productId is required".to_string());
        }

        if let Some(condition) = &self.condition {
            if !LEGACY_CONDITIONS.contains(&condition.as_str()) {
                return Err(format!(
                    "condition must be one of {}",
                    LEGACY_CONDITIONS.join(", ")
                ));
            }
        }

        if let Some(usage) = &self.usage {
            let ages = Question::Age.options();
            if !ages.contains(&usage.as_str()) {
                return Err(format!("usage must be one of {}", ages.join(", ")));
            }
        }

        if self.accessories.iter().any(|item| item.trim().is_empty()) {
            return Err("accessories must not contain empty values".to_string());
        }

        Ok(())
    }

    /// `condition` prices as body condition, `usage` as device age.
    pub fn to_answers(&self) -> AnswerMap {
        let mut answers = AnswerMap::new();
        if let Some(condition) = &self.condition {
            answers.insert(Question::BodyCondition.key(), condition.as_str());
        }
        if let Some(usage) = &self.usage {
            answers.insert(Question::Age.key(), usage.as_str());
        }
        if !self.accessories.is_empty() {
            answers.insert(
                Question::Accessories.key(),
                crate::pricing::Answer::multiple(self.accessories.iter().cloned()),
            );
        }
        answers
    }
}

/// Response shape of the original `/api/calculate` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCalculateResponse {
    pub product_id: String,
    pub base_price: i64,
    pub estimated_value: i64,
    pub condition: Option<String>,
    pub usage: Option<String>,
    pub accessories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::Answer;

    fn request() -> LegacyCalculateRequest {
        LegacyCalculateRequest {
            product_id: "eos-r6".to_string(),
            condition: Some("good".to_string()),
            usage: Some("fourToTwelveMonths".to_string()),
            accessories: vec!["box".to_string(), "charger".to_string()],
        }
    }

    #[test]
    fn legacy_fields_map_onto_answers() {
        let answers = request().to_answers();

        assert_eq!(answers.get("bodyCondition"), Some(&Answer::single("good")));
        assert_eq!(answers.get("age"), Some(&Answer::single("fourToTwelveMonths")));
        assert_eq!(
            answers.get("accessories"),
            Some(&Answer::multiple(["box", "charger"]))
        );
    }

    #[test]
    fn omitted_legacy_fields_produce_no_answers() {
        let request = LegacyCalculateRequest {
            product_id: "eos-r6".to_string(),
            condition: None,
            usage: None,
            accessories: Vec::new(),
        };

        assert!(request.validate().is_ok());
        assert!(request.to_answers().is_empty());
    }

    #[test]
    fn validation_rejects_unknown_legacy_values() {
        let mut bad_condition = request();
        bad_condition.condition = Some("mint".to_string());
        assert!(bad_condition.validate().unwrap_err().contains("condition"));

        let mut bad_usage = request();
        bad_usage.usage = Some("ancient".to_string());
        assert!(bad_usage.validate().unwrap_err().contains("usage"));

        let mut missing_id = request();
        missing_id.product_id = "  ".to_string();
        assert!(missing_id.validate().is_err());
    }
}
