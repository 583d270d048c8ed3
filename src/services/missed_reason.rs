//! Missed-reason classifier and AI-rewrite eligibility gate.
//!
//! Reflection questions are picked deterministically from the todo id and
//! reason, so the same todo shows the same questions across refreshes.
//!
//! Selection algorithm:
//! 1. seed = `"{todo_id}:{reason_code}"`, hashed with 32-bit FNV-1a
//! 2. count = `2 + hash % 3` (2 to 4 questions)
//! 3. Fisher–Yates shuffle of the reason's pool, indices drawn from a
//!    xorshift32 generator seeded with the hash
//! 4. the first `count` questions of the shuffled pool

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{MissedReason, Todo};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
/// xorshift32 is stuck at zero; substitute a fixed seed.
const ZERO_SEED_REPLACEMENT: u32 = 0x9e37_79b9;

const MIN_QUESTIONS: usize = 2;
const MAX_QUESTIONS: usize = 4;

const COMPLETED_UNCHECKED_QUESTIONS: &[&str] = &[
    "When did you actually finish it?",
    "What reminded you that it was done?",
    "Is there a moment in your day when checking off would be easy?",
    "Did finishing it feel different from what you expected?",
    "Would a smaller checklist make it easier to track?",
];

const HARD_TO_START_QUESTIONS: &[&str] = &[
    "What is the very first physical step?",
    "Which part feels the heaviest?",
    "Could you do it for just two minutes?",
    "What would make starting feel safer?",
    "Is anything missing before you can begin?",
    "Who or what could help you get going?",
];

const NOT_ENOUGH_TIME_QUESTIONS: &[&str] = &[
    "How long did you expect it to take?",
    "Which part could be cut without losing the point?",
    "Is there a shorter version you could finish today?",
    "What took the time you had planned for this?",
    "When in the day do you usually have a free block?",
    "Could it be split across two days?",
];

const WANT_TO_REST_QUESTIONS: &[&str] = &[
    "What would real rest look like today?",
    "How is your energy compared to earlier this week?",
    "Is this a one-off or has it been building up?",
    "What would make tomorrow lighter?",
];

/// What the UI should offer after a reason is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedFollowUp {
    /// One-click "mark complete"
    MarkComplete,
    /// AI rewrite may be requested
    OfferRewrite,
    /// Acknowledge only, no action
    Acknowledge,
}

pub fn follow_up(reason: MissedReason) -> MissedFollowUp {
    match reason {
        MissedReason::CompletedButUnchecked => MissedFollowUp::MarkComplete,
        MissedReason::HardToStart | MissedReason::NotEnoughTime => MissedFollowUp::OfferRewrite,
        MissedReason::WantToRest => MissedFollowUp::Acknowledge,
    }
}

/// Not done and due strictly in the past.
pub fn is_overdue(todo: &Todo, now: DateTime<Utc>) -> bool {
    todo.is_overdue(now)
}

/// Overdue and missed because it was hard to start or there was no time.
pub fn is_ai_eligible(todo: &Todo, now: DateTime<Utc>) -> bool {
    is_overdue(todo, now)
        && matches!(
            todo.missed_reason,
            Some(MissedReason::HardToStart | MissedReason::NotEnoughTime)
        )
}

/// Attach a reason to an overdue todo.
pub fn classify(todo: &mut Todo, reason: MissedReason, now: DateTime<Utc>) -> DomainResult<MissedFollowUp> {
    if !is_overdue(todo, now) {
        return Err(DomainError::ValidationFailed(format!(
            "Todo {} is not overdue; a missed reason does not apply",
            todo.id
        )));
    }
    todo.missed_reason = Some(reason);
    Ok(follow_up(reason))
}

fn question_pool(reason: MissedReason) -> &'static [&'static str] {
    match reason {
        MissedReason::CompletedButUnchecked => COMPLETED_UNCHECKED_QUESTIONS,
        MissedReason::HardToStart => HARD_TO_START_QUESTIONS,
        MissedReason::NotEnoughTime => NOT_ENOUGH_TIME_QUESTIONS,
        MissedReason::WantToRest => WANT_TO_REST_QUESTIONS,
    }
}

/// 32-bit FNV-1a over the UTF-8 bytes of `input`.
pub fn fnv1a32(input: &str) -> u32 {
    input.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

struct XorShift32(u32);

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self(if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed })
    }

    fn next(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

/// Pick 2 to 4 reflection questions for a todo, stable for a given seed.
pub fn pick_reflection_questions(todo_id: &str, reason: MissedReason) -> Vec<String> {
    let hash = fnv1a32(&format!("{todo_id}:{}", reason.as_str()));
    let span = (MAX_QUESTIONS - MIN_QUESTIONS + 1) as u32;
    let pool = question_pool(reason);
    let count = (MIN_QUESTIONS + (hash % span) as usize).min(pool.len());

    let mut order: Vec<usize> = (0..pool.len()).collect();
    let mut rng = XorShift32::new(hash);
    for i in (1..order.len()).rev() {
        let j = (rng.next() % (i as u32 + 1)) as usize;
        order.swap(i, j);
    }

    order.into_iter().take(count).map(|i| pool[i].to_string()).collect()
}
