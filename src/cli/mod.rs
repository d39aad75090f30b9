mod commands;
pub mod error;
pub mod utils;

#[cfg(test)]
mod mod_test;
#[cfg(test)]
mod utils_test;

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::error::CliResult;
use crate::config::{Backend, DbConfig};
use crate::db::{Database, SqliteDatabase, SurrealDatabase};

#[derive(Parser)]
#[command(name = "tm")]
#[command(author, version, about = "Task marketplace storage CLI", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub db: DbConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Category management commands
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// User commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Worker commands
    Worker {
        #[command(subcommand)]
        command: WorkerCommands,
    },
    /// Order commands
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories
    List {
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Create a category
    Create {
        /// Category name
        name: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        /// Only tasks in this category
        #[arg(long)]
        category: Option<i64>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Create a task
    Create {
        /// Task name
        name: String,
        /// Price of a single unit
        #[arg(long)]
        price: f64,
        /// Category id
        #[arg(long)]
        category: i64,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
enum WorkerCommands {
    /// List workers
    List {
        /// Only workers with this role (1 = manager, 2 = master)
        #[arg(long)]
        role: Option<i32>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show a worker's average order rating
    Rating {
        /// Worker ID
        id: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
enum OrderCommands {
    /// List orders matching filters
    Filter {
        /// Filter as key=value; repeatable. Values may be comma-separated
        /// lists, `null` or `not null` (e.g. --where status=1,2)
        #[arg(long = "where")]
        filters: Vec<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the tasks of an order
    Tasks {
        /// Order ID
        id: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete an order and its task links
    Delete {
        /// Order ID
        id: String,
    },
}

/// Initialize tracing subscriber with env filter, logging to stderr
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmarket=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // Show help when no command provided
        let _ = Cli::parse_from(["tm", "--help"]);
        return Ok(());
    };

    init_tracing();
    let output = open_and_execute(&cli.db, command).await?;
    println!("{}", output);
    Ok(())
}

/// Open the configured backend and run one command against it.
async fn open_and_execute(config: &DbConfig, command: Commands) -> CliResult<String> {
    let endpoint = config.resolved_endpoint();
    debug!(backend = ?config.backend, endpoint = %endpoint, "Opening backend");

    match config.backend {
        Backend::Sqlite => {
            if let Some(parent) = Path::new(&endpoint).parent() {
                std::fs::create_dir_all(parent)?;
            }
            let db = SqliteDatabase::open(&endpoint)
                .await?
                .with_timeout(config.operation_timeout());
            db.migrate().await?;
            execute(&db, command).await
        }
        Backend::Surreal => {
            if let Some(parent) = endpoint
                .strip_prefix("surrealkv://")
                .and_then(|path| Path::new(path).parent())
            {
                std::fs::create_dir_all(parent)?;
            }
            let credentials = config.credentials();
            let db = SurrealDatabase::connect(
                &endpoint,
                &config.namespace,
                &config.database,
                credentials.as_ref(),
            )
            .await?
            .with_timeout(config.operation_timeout());
            db.migrate().await?;
            execute(&db, command).await
        }
    }
}

async fn execute<D: Database>(db: &D, command: Commands) -> CliResult<String> {
    match command {
        Commands::Category { command } => match command {
            CategoryCommands::List { format } => {
                commands::category::list_categories(db, &format).await
            }
            CategoryCommands::Create { name } => {
                commands::category::create_category(db, &name).await
            }
        },
        Commands::Task { command } => match command {
            TaskCommands::List { category, format } => {
                commands::task::list_tasks(db, category, &format).await
            }
            TaskCommands::Create {
                name,
                price,
                category,
            } => commands::task::create_task(db, &name, price, category).await,
        },
        Commands::User { command } => match command {
            UserCommands::List { format } => commands::user::list_users(db, &format).await,
        },
        Commands::Worker { command } => match command {
            WorkerCommands::List { role, format } => {
                commands::worker::list_workers(db, role, &format).await
            }
            WorkerCommands::Rating { id, format } => {
                commands::worker::worker_rating(db, &id, &format).await
            }
        },
        Commands::Order { command } => match command {
            OrderCommands::Filter { filters, format } => {
                commands::order::filter_orders(db, &filters, &format).await
            }
            OrderCommands::Tasks { id, format } => {
                commands::order::order_tasks(db, &id, &format).await
            }
            OrderCommands::Delete { id } => commands::order::delete_order(db, &id).await,
        },
    }
}
