//! Task checklist editing.
//!
//! Text uniqueness is checked when an entry is added; editing an entry's
//! text later is not re-validated.

use super::{Task, TimeSlot};
use crate::error::{CoreError, ValidationError};

impl TimeSlot {
    /// Append a new checklist entry.
    pub fn add_task(&mut self, text: &str) -> Result<&Task, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::BlankTask);
        }
        if self.tasks.iter().any(|t| t.text == text) {
            return Err(ValidationError::DuplicateTask(text.to_string()));
        }
        self.tasks.push(Task::new(text));
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn remove_task(&mut self, task_id: &str) -> Result<Task, CoreError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "task",
                id: task_id.to_string(),
            })?;
        Ok(self.tasks.remove(index))
    }

    /// Flip one entry's completion. Returns `false` when no entry has `task_id`.
    pub fn toggle_task(&mut self, task_id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::slot::fixtures;

    #[test]
    fn toggle_flips_only_the_target() {
        let mut slot = fixtures::slot();
        assert!(slot.toggle_task("t1"));
        assert!(slot.tasks[0].completed);
        assert!(slot.tasks[1].completed);

        assert!(slot.toggle_task("t2"));
        assert!(!slot.tasks[1].completed);
        assert!(slot.tasks[0].completed);
    }

    #[test]
    fn toggle_unknown_id_changes_nothing() {
        let mut slot = fixtures::slot();
        let before = slot.tasks.clone();
        assert!(!slot.toggle_task("nope"));
        assert_eq!(slot.tasks, before);
    }

    #[test]
    fn add_and_remove() {
        let mut slot = fixtures::slot();
        let id = slot.add_task("review").unwrap().id.clone();
        assert_eq!(slot.tasks.len(), 3);
        assert!(slot.add_task("review").is_err());
        assert!(slot.add_task("  ").is_err());

        let removed = slot.remove_task(&id).unwrap();
        assert_eq!(removed.text, "review");
        assert!(slot.remove_task(&id).is_err());
    }
}
