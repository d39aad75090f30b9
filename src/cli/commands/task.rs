use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, truncate_with_ellipsis};
use crate::db::{Database, Task, TaskRepository};
use tabled::{Table, Tabled};
use uuid::Uuid;

#[derive(Tabled)]
pub(crate) struct TaskDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Price")]
    pub(crate) price: String,
    #[tabled(rename = "Category")]
    pub(crate) category: i64,
}

impl From<&Task> for TaskDisplay {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: truncate_with_ellipsis(&task.name, 40),
            price: format!("{:.2}", task.price_per_single),
            category: task.category,
        }
    }
}

pub(crate) fn format_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let display: Vec<TaskDisplay> = tasks.iter().map(TaskDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

/// List tasks, optionally only those in one category
pub async fn list_tasks<D: Database>(
    db: &D,
    category: Option<i64>,
    format: &str,
) -> CliResult<String> {
    let tasks = match category {
        Some(category) => db.tasks().get_tasks_in_category(category).await?,
        None => db.tasks().list().await?,
    };

    match format {
        "json" => Ok(serde_json::to_string_pretty(&tasks)?),
        _ => Ok(format_table(&tasks)),
    }
}

/// Create a task with a fresh id
pub async fn create_task<D: Database>(
    db: &D,
    name: &str,
    price: f64,
    category: i64,
) -> CliResult<String> {
    let task = db
        .tasks()
        .create(&Task {
            id: Uuid::nil(),
            name: name.to_string(),
            price_per_single: price,
            category,
        })
        .await?;

    Ok(format!("✓ Created task: {} ({})", task.name, task.id))
}
