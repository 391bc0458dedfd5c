use super::question::Question;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Option label to signed delta (smallest currency unit) for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentTable(BTreeMap<String, i64>);

impl AdjustmentTable {
    pub fn get(&self, option: &str) -> Option<i64> {
        self.0.get(option).copied()
    }

    pub fn insert(&mut self, option: impl Into<String>, delta: i64) {
        self.0.insert(option.into(), delta);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(option, delta)| (option.as_str(), *delta))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn zeroed(question: Question) -> Self {
        Self(
            question
                .options()
                .iter()
                .map(|option| (option.to_string(), 0))
                .collect(),
        )
    }
}

/// Price adjustments keyed by assessment question.
///
/// The table is sparse: a question or option without an entry prices at zero.
/// On the wire it is the flat document the admin UI stores,
/// `{ "<questionKey>": { "<option>": <int> } }`. Unknown question keys and
/// non-integer leaves are dropped with a warning rather than rejecting the
/// whole document, so rules that lag behind newly added questions still load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PricingRules {
    tables: BTreeMap<Question, AdjustmentTable>,
}

impl PricingRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known question and option present, every delta zero.
    ///
    /// Used when neither product nor global rules are configured.
    pub fn zero() -> Self {
        let tables = Question::ALL
            .iter()
            .map(|question| (*question, AdjustmentTable::zeroed(*question)))
            .collect();
        Self { tables }
    }

    pub fn with_adjustment(mut self, question: Question, option: &str, delta: i64) -> Self {
        self.set(question, option, delta);
        self
    }

    pub fn set(&mut self, question: Question, option: &str, delta: i64) {
        self.tables.entry(question).or_default().insert(option, delta);
    }

    pub fn adjustment(&self, question: Question, option: &str) -> Option<i64> {
        self.tables.get(&question).and_then(|table| table.get(option))
    }

    pub fn table(&self, question: Question) -> Option<&AdjustmentTable> {
        self.tables.get(&question)
    }

    pub fn questions(&self) -> impl Iterator<Item = Question> + '_ {
        self.tables.keys().copied()
    }

    /// True when no configured delta would move a price.
    pub fn is_zero(&self) -> bool {
        self.tables
            .values()
            .all(|table| table.iter().all(|(_, delta)| delta == 0))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn from_document(document: BTreeMap<String, Value>) -> Self {
        let mut rules = Self::new();

        for (key, group) in document {
            let Some(question) = Question::from_key(&key) else {
                warn!(question = %key, "skipping pricing rules for unknown question");
                continue;
            };

            let Value::Object(entries) = group else {
                warn!(%question, "skipping pricing rules group that is not an object");
                continue;
            };

            let table = rules.tables.entry(question).or_default();
            for (option, leaf) in entries {
                match integer_leaf(&leaf) {
                    Some(delta) => table.insert(option, delta),
                    None => {
                        warn!(%question, %option, value = %leaf, "skipping non-integer price adjustment");
                    }
                }
            }
        }

        rules
    }
}

fn integer_leaf(value: &Value) -> Option<i64> {
    if let Some(delta) = value.as_i64() {
        return Some(delta);
    }

    // Document stores hand integral numbers back as doubles.
    value
        .as_f64()
        .filter(|delta| delta.fract() == 0.0 && delta.abs() < i64::MAX as f64)
        .map(|delta| delta as i64)
}

impl Serialize for PricingRules {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let flat: BTreeMap<&str, &AdjustmentTable> = self
            .tables
            .iter()
            .map(|(question, table)| (question.key(), table))
            .collect();
        flat.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PricingRules {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let document = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_document(document))
    }
}
