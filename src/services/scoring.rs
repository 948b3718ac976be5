use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::models::quiz::{QuestionDetails, QuizQuestion, SubmittedAnswer};

pub struct ScoringService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub score: i32,
    pub correct_count: usize,
    pub total_questions: usize,
}

impl ScoringService {
    /// Scores a submission against the server-held question set. Answers are
    /// positional: `answers[i]` answers `questions[i]`, and each answer
    /// variant must match its question's type.
    pub fn score_submission(
        questions: &[QuizQuestion],
        answers: &[SubmittedAnswer],
    ) -> Result<ScoreBreakdown> {
        if questions.is_empty() {
            return Err(Error::BadRequest("Quiz has no questions".to_string()));
        }
        if answers.len() != questions.len() {
            return Err(Error::BadRequest(format!(
                "Expected {} answers, got {}",
                questions.len(),
                answers.len()
            )));
        }

        let mut correct_count = 0usize;
        for (idx, (question, answer)) in questions.iter().zip(answers.iter()).enumerate() {
            match (&question.details, answer) {
                (
                    QuestionDetails::SingleChoice(details),
                    SubmittedAnswer::SingleChoice { selected },
                ) => {
                    check_option_index(idx, *selected, details.options.len())?;
                    if *selected == details.correct_answer {
                        correct_count += 1;
                    }
                }
                (
                    QuestionDetails::MultiSelect(details),
                    SubmittedAnswer::MultiSelect { selected },
                ) => {
                    for s in selected {
                        check_option_index(idx, *s, details.options.len())?;
                    }
                    let chosen: BTreeSet<i32> = selected.iter().copied().collect();
                    let expected: BTreeSet<i32> = details.correct_answers.iter().copied().collect();
                    if chosen == expected {
                        correct_count += 1;
                    }
                }
                _ => {
                    return Err(Error::BadRequest(format!(
                        "Answer {} does not match the question type",
                        idx + 1
                    )));
                }
            }
        }

        let total_questions = questions.len();
        let score = ((correct_count as f64 / total_questions as f64) * 100.0).round() as i32;
        Ok(ScoreBreakdown {
            score,
            correct_count,
            total_questions,
        })
    }
}

fn check_option_index(question_idx: usize, selected: i32, option_count: usize) -> Result<()> {
    if selected < 0 || selected as usize >= option_count {
        return Err(Error::BadRequest(format!(
            "Selected option {} is out of range for question {}",
            selected,
            question_idx + 1
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{MultiSelectDetails, QuestionKind, SingleChoiceDetails};

    fn single(correct: i32) -> QuizQuestion {
        QuizQuestion {
            id: 0,
            kind: QuestionKind::SingleChoice,
            prompt: "q".to_string(),
            details: QuestionDetails::SingleChoice(SingleChoiceDetails {
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: correct,
                explanation: None,
            }),
        }
    }

    fn multi(correct: Vec<i32>) -> QuizQuestion {
        QuizQuestion {
            id: 0,
            kind: QuestionKind::MultiSelect,
            prompt: "q".to_string(),
            details: QuestionDetails::MultiSelect(MultiSelectDetails {
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answers: correct,
            }),
        }
    }

    fn pick(selected: i32) -> SubmittedAnswer {
        SubmittedAnswer::SingleChoice { selected }
    }

    #[test]
    fn three_of_four_correct_scores_75() {
        let questions = vec![single(0), single(1), single(2), single(3)];
        let answers = vec![pick(0), pick(1), pick(2), pick(0)];
        let breakdown = ScoringService::score_submission(&questions, &answers).unwrap();
        assert_eq!(breakdown.score, 75);
        assert_eq!(breakdown.correct_count, 3);
        assert_eq!(breakdown.total_questions, 4);
    }

    #[test]
    fn score_is_rounded_to_nearest_integer() {
        let questions = vec![single(0), single(0), single(0)];
        // 1/3 = 33.33 -> 33, 2/3 = 66.67 -> 67
        let one = ScoringService::score_submission(&questions, &[pick(0), pick(1), pick(1)])
            .unwrap();
        assert_eq!(one.score, 33);
        let two = ScoringService::score_submission(&questions, &[pick(0), pick(0), pick(1)])
            .unwrap();
        assert_eq!(two.score, 67);
    }

    #[test]
    fn all_wrong_and_all_right_bound_the_range() {
        let questions = vec![single(0), single(1)];
        let zero = ScoringService::score_submission(&questions, &[pick(1), pick(0)]).unwrap();
        assert_eq!(zero.score, 0);
        let full = ScoringService::score_submission(&questions, &[pick(0), pick(1)]).unwrap();
        assert_eq!(full.score, 100);
    }

    #[test]
    fn multi_select_requires_exact_set_any_order() {
        let questions = vec![multi(vec![1, 3])];
        let right = ScoringService::score_submission(
            &questions,
            &[SubmittedAnswer::MultiSelect {
                selected: vec![3, 1],
            }],
        )
        .unwrap();
        assert_eq!(right.score, 100);

        let partial = ScoringService::score_submission(
            &questions,
            &[SubmittedAnswer::MultiSelect { selected: vec![1] }],
        )
        .unwrap();
        assert_eq!(partial.score, 0);
    }

    #[test]
    fn answer_variant_must_match_question_type() {
        let questions = vec![multi(vec![0])];
        let err = ScoringService::score_submission(&questions, &[pick(0)]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let questions = vec![single(0)];
        let err = ScoringService::score_submission(&questions, &[pick(9)]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        let err = ScoringService::score_submission(&questions, &[pick(-1)]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn answer_count_must_match_question_count() {
        let questions = vec![single(0), single(1)];
        let err = ScoringService::score_submission(&questions, &[pick(0)]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
