use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, parse_uuid, truncate_with_ellipsis};
use crate::db::{Database, Worker, WorkerRepository, worker_role};
use serde::Serialize;
use tabled::{Table, Tabled};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub(crate) struct PublicWorker {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) address: String,
    pub(crate) phone_number: String,
    pub(crate) email: String,
    pub(crate) role: i32,
}

impl From<&Worker> for PublicWorker {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id,
            name: worker.name.clone(),
            surname: worker.surname.clone(),
            address: worker.address.clone(),
            phone_number: worker.phone_number.clone(),
            email: worker.email.clone(),
            role: worker.role,
        }
    }
}

#[derive(Debug, Serialize)]
struct Rating {
    worker_id: Uuid,
    average: f64,
}

pub(crate) fn role_label(role: i32) -> String {
    match role {
        worker_role::MANAGER => "manager".to_string(),
        worker_role::MASTER => "master".to_string(),
        other => other.to_string(),
    }
}

#[derive(Tabled)]
pub(crate) struct WorkerDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Email")]
    pub(crate) email: String,
    #[tabled(rename = "Role")]
    pub(crate) role: String,
}

impl From<&Worker> for WorkerDisplay {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id.to_string(),
            name: truncate_with_ellipsis(&worker.full_name(), 30),
            email: worker.email.clone(),
            role: role_label(worker.role),
        }
    }
}

pub(crate) fn format_table(workers: &[Worker]) -> String {
    if workers.is_empty() {
        return "No workers found.".to_string();
    }

    let display: Vec<WorkerDisplay> = workers.iter().map(WorkerDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

/// List workers, optionally only those with one role
pub async fn list_workers<D: Database>(
    db: &D,
    role: Option<i32>,
    format: &str,
) -> CliResult<String> {
    let workers = match role {
        Some(role) => db.workers().get_workers_by_role(role).await?,
        None => db.workers().list().await?,
    };

    match format {
        "json" => {
            let public: Vec<PublicWorker> = workers.iter().map(PublicWorker::from).collect();
            Ok(serde_json::to_string_pretty(&public)?)
        }
        _ => Ok(format_table(&workers)),
    }
}

/// Show a worker's average rating over completed, rated orders
pub async fn worker_rating<D: Database>(db: &D, id: &str, format: &str) -> CliResult<String> {
    let workers = db.workers();
    let worker = workers.get_by_id(parse_uuid(id)?).await?;
    let average = workers.get_average_order_rate(&worker).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&Rating {
            worker_id: worker.id,
            average,
        })?),
        _ => Ok(format!(
            "Average rating for {}: {:.2}",
            worker.full_name(),
            average
        )),
    }
}
