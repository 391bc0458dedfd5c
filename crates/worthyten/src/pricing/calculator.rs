use super::answers::{Answer, AnswerMap};
use super::question::{Question, QuestionKind, NO_ISSUES};
use super::rules::PricingRules;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One delta that contributed to a valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub question: Question,
    pub option: String,
    pub delta: i64,
}

/// Why an answer did not move the price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IgnoredReason {
    UnknownQuestion,
    NoRule { option: String },
    UnsupportedAnswer,
    SuppressedByNoIssues { option: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredAnswer {
    pub question: String,
    #[serde(flatten)]
    pub reason: IgnoredReason,
}

/// Price plus the audit trail of how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub base_price: i64,
    pub total_adjustment: i64,
    pub final_price: i64,
    pub adjustments: Vec<Adjustment>,
    pub ignored: Vec<IgnoredAnswer>,
}

/// Final price for an assessment, never below zero.
///
/// `brand` is accepted for callers that already thread it through but no rule
/// category consults it; the result is identical for every brand.
pub fn calculate_price(
    base_price: i64,
    answers: &AnswerMap,
    rules: &PricingRules,
    brand: &str,
) -> i64 {
    price_breakdown(base_price, answers, rules, brand).final_price
}

/// Same as [`calculate_price`] but keeps every applied and ignored answer.
pub fn price_breakdown(
    base_price: i64,
    answers: &AnswerMap,
    rules: &PricingRules,
    brand: &str,
) -> Valuation {
    let mut ledger = Ledger::default();

    for (key, answer) in answers.iter() {
        let Some(question) = Question::from_key(key) else {
            ledger.ignore(key, IgnoredReason::UnknownQuestion);
            continue;
        };

        match question.kind() {
            QuestionKind::YesNo | QuestionKind::SingleSelect => match answer {
                Answer::Single(option) => ledger.apply(rules, question, option),
                _ => ledger.ignore(key, IgnoredReason::UnsupportedAnswer),
            },
            QuestionKind::MultiSelect => {
                if matches!(answer, Answer::Other(_)) {
                    ledger.ignore(key, IgnoredReason::UnsupportedAnswer);
                    continue;
                }
                for option in answer.selections() {
                    ledger.apply(rules, question, option);
                }
            }
            QuestionKind::FunctionalIssues => {
                if matches!(answer, Answer::Other(_)) {
                    ledger.ignore(key, IgnoredReason::UnsupportedAnswer);
                    continue;
                }
                let selected = answer.selections();
                if selected.iter().any(|option| option == NO_ISSUES) {
                    ledger.apply(rules, question, NO_ISSUES);
                    for option in selected.iter().filter(|option| *option != NO_ISSUES) {
                        ledger.ignore(
                            key,
                            IgnoredReason::SuppressedByNoIssues {
                                option: option.clone(),
                            },
                        );
                    }
                } else {
                    for option in selected {
                        ledger.apply(rules, question, option);
                    }
                }
            }
        }
    }

    let total_adjustment = clamp_to_i64(ledger.total);
    let final_price = clamp_to_i64((i128::from(base_price) + ledger.total).max(0));

    debug!(
        brand,
        base_price,
        total_adjustment,
        final_price,
        ignored = ledger.ignored.len(),
        "priced assessment"
    );

    Valuation {
        base_price,
        total_adjustment,
        final_price,
        adjustments: ledger.adjustments,
        ignored: ledger.ignored,
    }
}

fn clamp_to_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Running total kept in `i128`; exact for any answer order.
#[derive(Default)]
struct Ledger {
    total: i128,
    adjustments: Vec<Adjustment>,
    ignored: Vec<IgnoredAnswer>,
}

impl Ledger {
    fn apply(&mut self, rules: &PricingRules, question: Question, option: &str) {
        match rules.adjustment(question, option) {
            Some(delta) => {
                self.total += i128::from(delta);
                self.adjustments.push(Adjustment {
                    question,
                    option: option.to_string(),
                    delta,
                });
            }
            None => self.ignore(
                question.key(),
                IgnoredReason::NoRule {
                    option: option.to_string(),
                },
            ),
        }
    }

    fn ignore(&mut self, question: &str, reason: IgnoredReason) {
        debug!(question, ?reason, "answer does not adjust price");
        self.ignored.push(IgnoredAnswer {
            question: question.to_string(),
            reason,
        });
    }
}

/// Stateless evaluator holding one resolved rules table.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    rules: PricingRules,
}

impl ValuationEngine {
    pub fn new(rules: PricingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PricingRules {
        &self.rules
    }

    pub fn quote(&self, base_price: i64, answers: &AnswerMap, brand: &str) -> Valuation {
        price_breakdown(base_price, answers, &self.rules, brand)
    }

    pub fn price(&self, base_price: i64, answers: &AnswerMap, brand: &str) -> i64 {
        calculate_price(base_price, answers, &self.rules, brand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_rules() -> PricingRules {
        PricingRules::new()
            .with_adjustment(Question::PowerOn, "no", -8000)
            .with_adjustment(Question::LensCondition, "good", 500)
            .with_adjustment(Question::LensCondition, "fungus", -800)
            .with_adjustment(Question::FungusDustCondition, "lightDust", -300)
            .with_adjustment(Question::FungusDustCondition, "lightFungus", -700)
            .with_adjustment(Question::FunctionalIssues, "noIssues", 1000)
            .with_adjustment(Question::FunctionalIssues, "speakerIssue", -1200)
            .with_adjustment(Question::FunctionalIssues, "batteryIssue", -900)
    }

    #[test]
    fn yes_no_and_single_select_answers_apply_one_delta() {
        let answers = AnswerMap::new()
            .with("powerOn", "no")
            .with("lensCondition", "fungus");

        let valuation = price_breakdown(20_000, &answers, &camera_rules(), "Canon");

        assert_eq!(valuation.total_adjustment, -8800);
        assert_eq!(valuation.final_price, 11_200);
        assert_eq!(valuation.adjustments.len(), 2);
        assert!(valuation.ignored.is_empty());
    }

    #[test]
    fn multi_select_counts_duplicates() {
        let answers =
            AnswerMap::new().with("fungusDustCondition", vec!["lightDust", "lightDust", "lightFungus"]);

        let price = calculate_price(10_000, &answers, &camera_rules(), "Nikon");

        assert_eq!(price, 10_000 - 300 - 300 - 700);
    }

    #[test]
    fn multi_select_accepts_scalar_answer() {
        let answers = AnswerMap::new().with("fungusDustCondition", "lightFungus");

        assert_eq!(calculate_price(10_000, &answers, &camera_rules(), "Nikon"), 9_300);
    }

    #[test]
    fn functional_issues_add_each_issue_without_sentinel() {
        let answers =
            AnswerMap::new().with("functionalIssues", vec!["speakerIssue", "batteryIssue"]);

        assert_eq!(calculate_price(10_000, &answers, &camera_rules(), "Apple"), 7_900);
    }

    #[test]
    fn no_issues_suppresses_siblings() {
        let answers =
            AnswerMap::new().with("functionalIssues", vec!["speakerIssue", "noIssues", "noIssues"]);

        let valuation = price_breakdown(10_000, &answers, &camera_rules(), "Apple");

        assert_eq!(valuation.final_price, 11_000);
        assert_eq!(valuation.adjustments.len(), 1);
        assert_eq!(
            valuation.ignored,
            vec![IgnoredAnswer {
                question: "functionalIssues".to_string(),
                reason: IgnoredReason::SuppressedByNoIssues {
                    option: "speakerIssue".to_string()
                },
            }]
        );
    }

    #[test]
    fn gaps_and_malformed_answers_are_recorded_not_fatal() {
        let answers = AnswerMap::new()
            .with("screenSize", "large")
            .with("lensCondition", "scratches")
            .with("powerOn", vec!["yes", "no"])
            .with("accessories", Answer::Other(serde_json::json!(3)));

        let valuation = price_breakdown(5_000, &answers, &camera_rules(), "Sony");

        assert_eq!(valuation.final_price, 5_000);
        let reasons: Vec<_> = valuation
            .ignored
            .iter()
            .map(|ignored| (ignored.question.as_str(), ignored.reason.clone()))
            .collect();
        assert!(reasons.contains(&("screenSize", IgnoredReason::UnknownQuestion)));
        assert!(reasons.contains(&(
            "lensCondition",
            IgnoredReason::NoRule {
                option: "scratches".to_string()
            }
        )));
        assert!(reasons.contains(&("powerOn", IgnoredReason::UnsupportedAnswer)));
        assert!(reasons.contains(&("accessories", IgnoredReason::UnsupportedAnswer)));
    }

    #[test]
    fn result_is_clamped_at_zero() {
        let answers = AnswerMap::new().with("powerOn", "no");

        assert_eq!(calculate_price(1_000, &answers, &camera_rules(), "Canon"), 0);
        assert_eq!(calculate_price(i64::MIN, &AnswerMap::new(), &camera_rules(), ""), 0);
    }

    #[test]
    fn extreme_deltas_clamp_instead_of_overflowing() {
        let rules = PricingRules::new()
            .with_adjustment(Question::Accessories, "box", i64::MAX)
            .with_adjustment(Question::Accessories, "bag", i64::MAX);
        let answers = AnswerMap::new().with("accessories", vec!["box", "bag"]);

        assert_eq!(calculate_price(1, &answers, &rules, "Canon"), i64::MAX);
    }

    #[test]
    fn extreme_deltas_are_order_independent() {
        let rules = PricingRules::new()
            .with_adjustment(Question::Accessories, "box", i64::MAX)
            .with_adjustment(Question::Accessories, "charger", i64::MAX)
            .with_adjustment(Question::Accessories, "bag", -i64::MAX);

        let orders = [
            ["box", "charger", "bag"],
            ["box", "bag", "charger"],
            ["bag", "box", "charger"],
            ["charger", "bag", "box"],
        ];
        for order in orders {
            let answers = AnswerMap::new().with("accessories", order.to_vec());
            let valuation = price_breakdown(0, &answers, &rules, "Canon");

            assert_eq!(valuation.final_price, i64::MAX, "order {order:?}");
            assert_eq!(valuation.total_adjustment, i64::MAX, "order {order:?}");
        }
    }

    #[test]
    fn cancelling_extremes_leave_the_exact_price() {
        let rules = PricingRules::new()
            .with_adjustment(Question::Accessories, "box", i64::MAX)
            .with_adjustment(Question::Accessories, "charger", i64::MAX)
            .with_adjustment(Question::FunctionalIssues, "speakerIssue", i64::MIN + 1)
            .with_adjustment(Question::FunctionalIssues, "cameraIssue", i64::MIN + 1);
        let answers = AnswerMap::new()
            .with("accessories", vec!["box", "charger"])
            .with("functionalIssues", vec!["speakerIssue", "cameraIssue"]);

        let valuation = price_breakdown(100, &answers, &rules, "Sony");

        assert_eq!(valuation.total_adjustment, 0);
        assert_eq!(valuation.final_price, 100);
    }

    #[test]
    fn engine_delegates_to_calculator() {
        let engine = ValuationEngine::new(camera_rules());
        let answers = AnswerMap::new().with("lensCondition", "good");

        assert_eq!(engine.price(1_000, &answers, "Canon"), 1_500);
        assert_eq!(engine.quote(1_000, &answers, "Canon").adjustments[0].delta, 500);
    }
}
