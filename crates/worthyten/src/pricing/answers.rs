use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A customer's response to one assessment question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
    /// Anything else older clients send (booleans, numbers, null). Never priced.
    Other(Value),
}

impl Answer {
    pub fn single(value: impl Into<String>) -> Self {
        Answer::Single(value.into())
    }

    pub fn multiple<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Answer::Multiple(values.into_iter().map(Into::into).collect())
    }

    /// Selected labels, treating a scalar as a one-element selection.
    pub fn selections(&self) -> &[String] {
        match self {
            Answer::Single(value) => std::slice::from_ref(value),
            Answer::Multiple(values) => values,
            Answer::Other(_) => &[],
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::single(value)
    }
}

impl From<Vec<&str>> for Answer {
    fn from(values: Vec<&str>) -> Self {
        Answer::multiple(values)
    }
}

/// Answers for one assessment session keyed by question id.
///
/// Keys are not validated; the calculator ignores anything it does not price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, Answer>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, question: impl Into<String>, answer: impl Into<Answer>) -> Self {
        self.insert(question, answer);
        self
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<Answer>) {
        self.0.insert(question.into(), answer.into());
    }

    pub fn get(&self, question: &str) -> Option<&Answer> {
        self.0.get(question)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.0.iter().map(|(key, answer)| (key.as_str(), answer))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, A> FromIterator<(K, A)> for AnswerMap
where
    K: Into<String>,
    A: Into<Answer>,
{
    fn from_iter<T: IntoIterator<Item = (K, A)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, answer)| (key.into(), answer.into()))
                .collect(),
        )
    }
}
