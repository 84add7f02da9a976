//! UseCase: クイズの自動回答
//!
//! 監視対象のクイズボットの発言を分類し、
//!
//! - ラウンド終了: 保留中の問題番号を解除
//! - ヒント: 解けたら絶対値を回答、解けなければ何もしない
//! - 新しい問題: 重複を除外し、単純な式なら解いて回答、そうでなければヒントを要求
//!
//! を行います。問題番号の重複判定はクイズブックのロック内で check-and-set するため、
//! 同じ問題がほぼ同時に 2 回届いても処理されるのは 1 回だけです。

use std::sync::Arc;

use crate::domain::{QuestionId, QuizEvent, RoomMessage, classify, looks_solvable_directly, solve};

use super::{answer::AnswerDispatcher, context::BotContext};

/// What the quiz handler did with one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    Ignored,
    RoundEnded,
    Duplicate(QuestionId),
    /// A question arrived without an extractable problem
    MissingProblem(QuestionId),
    AnswerScheduled(i64),
    HintRequested,
    HintUnsolved,
}

pub struct QuizUseCase {
    ctx: Arc<BotContext>,
    dispatcher: AnswerDispatcher,
}

impl QuizUseCase {
    pub fn new(ctx: Arc<BotContext>, dispatcher: AnswerDispatcher) -> Self {
        Self { ctx, dispatcher }
    }

    pub async fn handle_message(&self, message: &RoomMessage) -> QuizOutcome {
        let room_id = &message.room_id;
        let watched_bot = self
            .ctx
            .quiz
            .lock()
            .await
            .watched_bot(room_id)
            .map(str::to_string);

        let event = classify(&message.text, &message.sender_name, watched_bot.as_deref());
        match event {
            QuizEvent::Ignore => QuizOutcome::Ignored,
            QuizEvent::EndOfRound => {
                if self.ctx.quiz.lock().await.clear_question(room_id) {
                    tracing::info!("End of round detected, unlocking question in room {}", room_id);
                }
                QuizOutcome::RoundEnded
            }
            QuizEvent::Hint { problem } => match solve(&problem) {
                Ok(answer) => {
                    let answer = answer.abs();
                    tracing::info!("Solved hint '{}' -> {}", problem, answer);
                    self.dispatcher.dispatch(room_id.clone(), answer.to_string());
                    QuizOutcome::AnswerScheduled(answer)
                }
                Err(e) => {
                    tracing::info!("Could not solve hint '{}': {}", problem, e);
                    QuizOutcome::HintUnsolved
                }
            },
            QuizEvent::NewQuestion { id, problem } => {
                if !self.ctx.quiz.lock().await.lock_question(room_id, id) {
                    tracing::debug!("Question {} already handled in room {}", id, room_id);
                    return QuizOutcome::Duplicate(id);
                }
                tracing::info!("New question locked ({}) in room {}", id, room_id);

                let Some(problem) = problem else {
                    tracing::error!("Could not extract problem from text: {}", message.text);
                    return QuizOutcome::MissingProblem(id);
                };
                self.answer_question(message, &problem).await
            }
        }
    }

    async fn answer_question(&self, message: &RoomMessage, problem: &str) -> QuizOutcome {
        if !looks_solvable_directly(problem) {
            tracing::info!("Sequence puzzle detected '{}', requesting hint", problem);
            return self.request_hint(message).await;
        }

        match solve(problem) {
            Ok(answer) => {
                tracing::info!("Solved '{}' -> {}", problem, answer);
                self.dispatcher
                    .dispatch(message.room_id.clone(), answer.to_string());
                QuizOutcome::AnswerScheduled(answer)
            }
            Err(e) => {
                tracing::info!("Failed to solve '{}' ({}), requesting hint", problem, e);
                self.request_hint(message).await
            }
        }
    }

    async fn request_hint(&self, message: &RoomMessage) -> QuizOutcome {
        self.ctx
            .reply(&message.room_id, self.ctx.config.quiz.hint_command.clone())
            .await;
        QuizOutcome::HintRequested
    }
}
