//! Task management commands for CLI.

use clap::Subcommand;
use habitrail_core::{Database, DateKey, Priority, Task, TaskDraft, TaskFilter, TaskStatus, TimeOfDay};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD (default: today)
        #[arg(long)]
        due: Option<DateKey>,
        /// Start time, HH:MM
        #[arg(long)]
        start: Option<TimeOfDay>,
        /// Stop time, HH:MM
        #[arg(long)]
        stop: Option<TimeOfDay>,
        /// Low, Medium or High (default: Medium)
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// List tasks, newest first
    List {
        /// Only tasks due on this day
        #[arg(long)]
        due: Option<DateKey>,
        /// Pending or Completed
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Show task details
    Show {
        /// Task ID
        id: String,
    },
    /// Update a task
    Edit {
        /// Task ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<DateKey>,
        #[arg(long)]
        start: Option<TimeOfDay>,
        #[arg(long)]
        stop: Option<TimeOfDay>,
        #[arg(long)]
        priority: Option<Priority>,
    },
    /// Toggle a task between pending and completed
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CmdResult {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            title,
            description,
            due,
            start,
            stop,
            priority,
        } => {
            let mut draft = TaskDraft::new(title, due.unwrap_or_else(DateKey::today));
            draft.description = description.unwrap_or_default();
            draft.start_time = start;
            draft.stop_time = stop;
            draft.priority = priority.unwrap_or_default();
            let task = Task::new(draft)?;
            db.create_task(&task)?;
            print_json(&task)?;
        }
        TaskAction::List { due, status } => {
            let tasks = db.list_tasks(&TaskFilter {
                due_date: due,
                status,
            })?;
            print_json(&tasks)?;
        }
        TaskAction::Show { id } => {
            print_json(&db.require_task(&id)?)?;
        }
        TaskAction::Edit {
            id,
            title,
            description,
            due,
            start,
            stop,
            priority,
        } => {
            let mut task = db.require_task(&id)?;
            let mut draft = task.draft();
            if let Some(t) = title {
                draft.title = t;
            }
            if let Some(d) = description {
                draft.description = d;
            }
            if let Some(d) = due {
                draft.due_date = d;
            }
            if start.is_some() {
                draft.start_time = start;
            }
            if stop.is_some() {
                draft.stop_time = stop;
            }
            if let Some(p) = priority {
                draft.priority = p;
            }
            task.apply_update(draft)?;
            db.update_task(&task)?;
            print_json(&task)?;
        }
        TaskAction::Done { id } => {
            let mut task = db.require_task(&id)?;
            task.toggle_status();
            db.update_task(&task)?;
            print_json(&task)?;
        }
        TaskAction::Delete { id } => {
            if !db.delete_task(&id)? {
                return Err(format!("Task not found: {id}").into());
            }
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
