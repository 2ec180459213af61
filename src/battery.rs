use serde::{Deserialize, Serialize};

/// One multiple-choice assessment item. `correct_answer` is a zero-based
/// index into `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestItem {
    pub id: String,
    pub passage: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub category: String,
    pub difficulty: String,
}

/// A named, ordered collection of assessment items. Batteries are
/// immutable reference data supplied from outside the core; the engine
/// only looks them up by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestBattery {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub items: Vec<TestItem>,
}

/// The set of batteries available to the assessment engine.
#[derive(Debug, Clone, Default)]
pub struct BatterySet {
    batteries: Vec<TestBattery>,
}

impl BatterySet {
    pub fn new(batteries: Vec<TestBattery>) -> Self {
        Self { batteries }
    }

    /// Parse a battery list from JSON in the external camelCase shape
    /// (`correctAnswer` etc).
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        let batteries: Vec<TestBattery> = serde_json::from_str(json)?;
        Ok(Self { batteries })
    }

    pub fn get(&self, id: &str) -> Option<&TestBattery> {
        self.batteries.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestBattery> {
        self.batteries.iter()
    }

    pub fn len(&self) -> usize {
        self.batteries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batteries.is_empty()
    }

    /// The built-in batteries shipped with the trainer.
    pub fn builtin() -> Self {
        fn item(
            id: &str,
            passage: &str,
            question: &str,
            options: &[&str],
            correct_answer: usize,
            category: &str,
            difficulty: &str,
        ) -> TestItem {
            TestItem {
                id: id.into(),
                passage: passage.into(),
                question: question.into(),
                options: options.iter().map(|o| o.to_string()).collect(),
                correct_answer,
                category: category.into(),
                difficulty: difficulty.into(),
            }
        }

        let basic = TestBattery {
            id: "basic-comprehension".into(),
            name: "Basic Reading Assessment".into(),
            description: "Fundamental reading comprehension skills".into(),
            category: "beginner".into(),
            items: vec![
                item(
                    "basic-1",
                    "The lighthouse keeper climbed the spiral stairs every evening at dusk. \
                     For forty years he had lit the lamp that guided ships past the rocky coast.",
                    "How long has the keeper been lighting the lamp?",
                    &["Ten years", "Forty years", "Four years", "A lifetime"],
                    1,
                    "comprehension",
                    "basic",
                ),
                item(
                    "basic-2",
                    "Maria planted tomatoes in early spring. By midsummer the vines were heavy \
                     with fruit, and she shared baskets of them with her neighbors.",
                    "What did Maria do with the extra tomatoes?",
                    &[
                        "Sold them at a market",
                        "Canned them for winter",
                        "Shared them with neighbors",
                        "Let them spoil",
                    ],
                    2,
                    "comprehension",
                    "basic",
                ),
                item(
                    "basic-3",
                    "The library opens at nine, but on Thursdays it opens an hour later so the \
                     staff can restock the shelves.",
                    "When does the library open on Thursdays?",
                    &["Eight", "Nine", "Ten", "Eleven"],
                    2,
                    "comprehension",
                    "basic",
                ),
            ],
        };

        let intermediate = TestBattery {
            id: "intermediate-analysis".into(),
            name: "Text Analysis Skills".into(),
            description: "Analytical reading and inference abilities".into(),
            category: "intermediate".into(),
            items: vec![
                item(
                    "inter-1",
                    "Sales rose sharply in the first quarter, yet the warehouse reported record \
                     levels of unsold stock by June. Management scheduled an urgent review of \
                     its forecasting methods.",
                    "What can be inferred about the company's forecasts?",
                    &[
                        "They were accurate",
                        "They overestimated demand",
                        "They underestimated demand",
                        "They were never produced",
                    ],
                    1,
                    "analysis",
                    "intermediate",
                ),
                item(
                    "inter-2",
                    "Although the glacier has retreated for decades, this winter's snowfall was \
                     the heaviest on record. Scientists caution that a single season does not \
                     reverse a long-term trend.",
                    "What is the scientists' main point?",
                    &[
                        "The glacier is growing again",
                        "Records are unreliable",
                        "One season does not change the trend",
                        "Snowfall causes retreat",
                    ],
                    2,
                    "analysis",
                    "intermediate",
                ),
                item(
                    "inter-3",
                    "The committee praised the proposal's ambition but questioned its budget, \
                     sending it back for revision rather than rejecting it outright.",
                    "What was the committee's attitude toward the proposal?",
                    &[
                        "Outright rejection",
                        "Unqualified approval",
                        "Cautious interest",
                        "Complete indifference",
                    ],
                    2,
                    "inference",
                    "intermediate",
                ),
            ],
        };

        let advanced = TestBattery {
            id: "advanced-critical".into(),
            name: "Critical Reading".into(),
            description: "Advanced comprehension and critical thinking".into(),
            category: "advanced".into(),
            items: vec![
                item(
                    "adv-1",
                    "The historian argues that the treaty failed not because its terms were \
                     harsh, but because no institution existed to enforce them. Critics reply \
                     that harsh terms made any enforcement politically impossible.",
                    "On what point do the historian and the critics disagree?",
                    &[
                        "Whether the treaty failed",
                        "The primary cause of the failure",
                        "Whether institutions existed",
                        "The wording of the terms",
                    ],
                    1,
                    "analysis",
                    "advanced",
                ),
                item(
                    "adv-2",
                    "The novel's narrator insists on his own reliability so frequently that \
                     attentive readers begin to doubt every account he gives.",
                    "What effect does the narrator's insistence produce?",
                    &[
                        "It reassures the reader",
                        "It undermines his credibility",
                        "It shortens the novel",
                        "It clarifies the plot",
                    ],
                    1,
                    "inference",
                    "advanced",
                ),
                item(
                    "adv-3",
                    "Correlation between the two measurements was strong, but the authors note \
                     that both rise with population growth, which alone may explain the link.",
                    "Why do the authors hesitate to claim causation?",
                    &[
                        "The correlation was weak",
                        "A third factor may drive both measurements",
                        "The sample was too large",
                        "The measurements disagree",
                    ],
                    1,
                    "analysis",
                    "advanced",
                ),
            ],
        };

        Self::new(vec![basic, intermediate, advanced])
    }
}
