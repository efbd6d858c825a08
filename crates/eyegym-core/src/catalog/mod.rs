//! Exercise catalog: the ordered script a session walks through.

mod exercise;

pub use exercise::{ExerciseKind, ExerciseStep};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, SessionError};

const BLINK_TEXT: &str = "Поморгайте вільно протягом десяти секунд.";

/// Ordered sequence of exercise steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub steps: Vec<ExerciseStep>,
}

impl Catalog {
    pub fn new(steps: Vec<ExerciseStep>) -> Self {
        Self { steps }
    }

    /// The built-in eye gym routine.
    pub fn eye_gym() -> Self {
        let blink = || ExerciseStep::fixed("blink", "Моргання", BLINK_TEXT, 5);
        Self {
            steps: vec![
                ExerciseStep::dynamic(
                    "up-down-left-right-1",
                    "Вгору-вниз, вліво-вправо",
                    "Рухайте очима вгору вниз, а потім вліво вправо. По десять разів у кожному напрямку.",
                    20,
                ),
                ExerciseStep::dynamic(
                    "circle-both-directions-1",
                    "Коло в обидва боки",
                    "Рухайте очима по колу проти годинникової стрілки, а потім за годинниковою стрілкою. По десять разів у кожен бік.",
                    20,
                ),
                ExerciseStep::fixed(
                    "repeat-with-closed-eyes",
                    "Повтор з заплющеними очима",
                    "Закрийте очі й повторіть попередні вправи руху очима стільки ж разів. Робіть повільно й акуратно.",
                    60,
                ),
                ExerciseStep::fixed(
                    "palming-1",
                    "Долоні на очі",
                    "Розітріть долоні до тепла й покладіть їх на закриті очі, не тиснучи. Розслабтеся на тридцять секунд. Наступні вправи робитимемо з закритими очима.",
                    35,
                ),
                ExerciseStep::dynamic(
                    "up-down-3",
                    "Вгору-вниз, 3 рази",
                    "Рухайте очима вгору-вниз три рази. Почали.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "left-right-3",
                    "Вліво-вправо, 3 рази",
                    "Рухайте очима вліво-вправо три рази. Почали.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "diagonal-1-3",
                    "Діагональ, 3 рази",
                    "Рухайте очима по діагоналі зліва вгору, вправо вниз і назад. Три рази.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "diagonal-2-3",
                    "Зворотна діагональ, 3 рази",
                    "Рухайте очима по іншій діагоналі: справа вгору, вліво вниз і назад. Три рази.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "triangle-clockwise-3",
                    "Трикутник за годинниковою, 3 рази",
                    "Уявіть трикутник і переводьте погляд по його вершинах за годинниковою стрілкою. Три повних кола.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "triangle-counter-3",
                    "Трикутник проти годинникової, 3 рази",
                    "Тепер той самий трикутник, але проти годинникової стрілки. Три повних кола.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "circle-clockwise-3",
                    "Коло за годинниковою, 3 рази",
                    "Рухайте очима по колу за годинниковою стрілкою. Три повних кола.",
                    6,
                ),
                blink(),
                ExerciseStep::dynamic(
                    "blink-open-3",
                    "Заплющити-відкрити, 3 рази",
                    "Три рази: щільно заплющіть очі, потім широко відкрийте. Робіть повільно.",
                    6,
                ),
                ExerciseStep::fixed(
                    "open-palms-2",
                    "Розкрити долоні",
                    "Розслабте руки, опустіть долоні й кілька секунд спокійно поморгайте.",
                    5,
                ),
                ExerciseStep::fixed(
                    "blink-30s",
                    "Моргання 30 секунд",
                    "Вільно, без напруження моргайте протягом тридцяти секунд.",
                    35,
                ),
                ExerciseStep::dynamic(
                    "blink-30-reps",
                    "Зажмурити-відкрити, 30 разів",
                    "Тридцять разів: щільно закрийте очі і відкрийте.",
                    60,
                ),
                ExerciseStep::dynamic(
                    "up-down-20",
                    "Вгору-вниз, 20 разів",
                    "Рухайте очима вгору-вниз двадцять разів.",
                    40,
                ),
                ExerciseStep::dynamic(
                    "left-right-20",
                    "Вліво-вправо, 20 разів",
                    "Рухайте очима вліво-вправо двадцять разів.",
                    20,
                ),
                ExerciseStep::dynamic(
                    "circle-both-directions-20",
                    "Коло в обидва боки, по 20",
                    "Рухайте очима по колу за годинниковою стрілкою та проти годинникової стрілки по двадцять разів у кожен бік.",
                    40,
                ),
                ExerciseStep::fixed(
                    "pencil-focus",
                    "Фокус на олівці",
                    "Візьміть олівець або палець, тримайте перед очима. Переводьте фокус з олівця на віддалену точку і назад протягом однієї хвилини.",
                    60,
                ),
            ],
        }
    }

    /// Load a custom script from a JSON array of steps.
    pub fn from_json_file(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step targets. Steps without a target count as zero.
    pub fn total_target_ms(&self, ms_per_rep: u64) -> u64 {
        self.steps
            .iter()
            .filter_map(|s| s.target_ms(ms_per_rep))
            .sum()
    }

    /// Check that the script can be run.
    ///
    /// # Errors
    /// `InvalidScript` if the script is empty or a step lacks the positive
    /// amount its kind is paced by.
    pub fn validate(&self, ms_per_rep: u64) -> Result<(), SessionError> {
        if self.steps.is_empty() {
            return Err(SessionError::InvalidScript {
                reason: "script has no steps".into(),
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.target_ms(ms_per_rep).is_none() {
                let needed = match step.kind {
                    ExerciseKind::Dynamic => "reps",
                    ExerciseKind::Static => "seconds",
                };
                return Err(SessionError::InvalidScript {
                    reason: format!(
                        "step {index} ('{}') is {:?} but has no positive {needed}",
                        step.id, step.kind
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::eye_gym()
    }
}
