//! Checklist commands.

use clap::Subcommand;

use crate::common::{open_service, print_event, warn_unsaved, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a checklist entry to a slot
    Add {
        /// Slot ID
        slot_id: String,
        /// Task text (must be unique within the slot)
        text: String,
    },
    /// Remove a checklist entry
    Remove {
        /// Slot ID
        slot_id: String,
        /// Task ID
        task_id: String,
    },
    /// Flip a checklist entry between done and not done
    Toggle {
        /// Slot ID
        slot_id: String,
        /// Task ID
        task_id: String,
    },
}

pub fn run(action: TaskAction) -> CmdResult {
    let (config, service) = open_service()?;

    match action {
        TaskAction::Add { slot_id, text } => {
            let task = service.add_task(&slot_id, &text)?;
            println!("{}", task.id);
        }
        TaskAction::Remove { slot_id, task_id } => {
            let task = service.remove_task(&slot_id, &task_id)?;
            println!("removed {}", task.text);
        }
        TaskAction::Toggle { slot_id, task_id } => {
            let mut session = service.open_session(&slot_id, &config.countdown)?;
            let event = session.toggle_task(&task_id);
            warn_unsaved(&mut session);
            match event {
                Some(event) => print_event(&event),
                None => println!("no task {task_id} in this slot; nothing toggled"),
            }
        }
    }
    Ok(())
}
