use crate::core::models::{answer::OptionCount, option::Opt, question::Question};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
pub struct OptionResult {
    pub id: i32,
    pub text: String,
    pub answers: i64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResult {
    pub id: i32,
    pub prompt: String,
    pub total_answers: i64,
    pub options: Vec<OptionResult>,
}

pub fn percent(answers: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * answers as f64 / total as f64
}

/// Share of each option among the answers recorded for its question.
pub fn tally(questions: &[Question], options: Vec<Opt>, counts: &[OptionCount]) -> Vec<QuestionResult> {
    let counts: HashMap<i32, i64> = counts.iter().map(|c| (c.option_id, c.answers)).collect();
    let mut by_question: HashMap<i32, Vec<Opt>> = options.into_iter().into_group_map_by(|o| o.question_id);
    questions
        .iter()
        .map(|q| {
            let opts = by_question.remove(&q.id).unwrap_or_default();
            let total: i64 = opts.iter().map(|o| counts.get(&o.id).copied().unwrap_or(0)).sum();
            QuestionResult {
                id: q.id,
                prompt: q.prompt.clone(),
                total_answers: total,
                options: opts
                    .into_iter()
                    .map(|o| {
                        let answers = counts.get(&o.id).copied().unwrap_or(0);
                        OptionResult {
                            id: o.id,
                            text: o.text,
                            answers,
                            percent: percent(answers, total),
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}
