//! Two-phase confirmation for destructive actions.
//!
//! A caller first asks the registry for an [`Intent`], shows its prompt, and
//! resolves it with the user's [`Decision`]. Only a confirmed intent yields
//! the [`Confirmed`] token the mutating call requires.

use shared::{
    error::{AppError, ErrorCode},
    snapshot::Snapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Cancelled,
}

impl Decision {
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "ya" => Decision::Confirmed,
            _ => Decision::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPlan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub(crate) snapshot: Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent<A> {
    action: A,
    prompt: String,
}

impl<A> Intent<A> {
    pub(crate) fn new(action: A, prompt: impl Into<String>) -> Self {
        Self {
            action,
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn resolve(self, decision: Decision) -> Result<Confirmed<A>, AppError> {
        match decision {
            Decision::Confirmed => Ok(Confirmed(self.action)),
            Decision::Cancelled => Err(AppError::new(ErrorCode::Cancelled, "cancelled by user")),
        }
    }
}

/// Proof that the user agreed to an action. Only [`Intent::resolve`] builds one.
#[derive(Debug)]
pub struct Confirmed<A>(A);

impl<A> Confirmed<A> {
    pub(crate) fn into_inner(self) -> A {
        self.0
    }
}

impl ImportPlan {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_answers_confirm() {
        assert_eq!(Decision::from_answer(" Y "), Decision::Confirmed);
        assert_eq!(Decision::from_answer("ya"), Decision::Confirmed);
        assert_eq!(Decision::from_answer(""), Decision::Cancelled);
        assert_eq!(Decision::from_answer("nope"), Decision::Cancelled);
    }

    #[test]
    fn cancelled_intent_yields_no_token() {
        let intent = Intent::new(ResetPlan, "reset?");
        let err = intent.resolve(Decision::Cancelled).expect_err("cancelled");
        assert_eq!(err.code, ErrorCode::Cancelled);
    }
}
