use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Med,
    Low,
}

/// A planner quest. Completing it pays out once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Goal {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_priority")]
    pub priority: Priority,
}

fn default_priority() -> Priority {
    Priority::Med
}

impl Goal {
    fn new(text: &str, priority: Priority) -> Self {
        Self::with_id(Uuid::now_v7().as_simple().to_string(), text, priority)
    }

    fn with_id(id: impl Into<String>, text: &str, priority: Priority) -> Self {
        Self {
            id: id.into(),
            text: text.to_string(),
            completed: false,
            priority,
        }
    }
}

/// The quest log of goals alongside the rating sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Planner {
    goals: Vec<Goal>,
}

impl Planner {
    pub fn empty() -> Self {
        Self { goals: Vec::new() }
    }

    /// First-run goals. Their ids are fixed so a fresh start and a reload of
    /// an empty record agree.
    pub fn starter() -> Self {
        Self {
            goals: vec![
                Goal::with_id("1", "Morning routine", Priority::High),
                Goal::with_id("2", "Deep work session", Priority::Med),
            ],
        }
    }

    pub fn from_goals(goals: Vec<Goal>) -> Self {
        Self { goals }
    }

    /// Add a goal with medium priority. Blank text is rejected.
    pub fn add(&mut self, text: &str) -> Result<&Goal, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::InvalidGoal("goal text is empty".into()));
        }
        self.goals.push(Goal::new(text, Priority::Med));
        Ok(&self.goals[self.goals.len() - 1])
    }

    /// Mark a goal completed. Returns `true` only on the transition from open
    /// to completed, which is when the caller pays out XP.
    pub fn complete(&mut self, id: &str) -> Result<bool, CoreError> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| CoreError::GoalNotFound { id: id.to_string() })?;
        if goal.completed {
            return Ok(false);
        }
        goal.completed = true;
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<Goal, CoreError> {
        let idx = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| CoreError::GoalNotFound { id: id.to_string() })?;
        Ok(self.goals.remove(idx))
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn open_goals(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter().filter(|g| !g.completed)
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::starter()
    }
}
