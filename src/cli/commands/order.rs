use crate::cli::error::CliResult;
use crate::cli::utils::{
    apply_table_style, format_optional_id, parse_key_values, parse_uuid, truncate_with_ellipsis,
};
use crate::db::{Database, Order, OrderRepository, Task, UNRATED, order_status};
use serde::Serialize;
use tabled::{Table, Tabled};

pub(crate) fn status_label(status: i32) -> String {
    match status {
        order_status::NO_STATUS => "none".to_string(),
        order_status::NEW => "new".to_string(),
        order_status::IN_PROGRESS => "in progress".to_string(),
        order_status::COMPLETED => "completed".to_string(),
        order_status::CANCELLED => "cancelled".to_string(),
        other => other.to_string(),
    }
}

#[derive(Tabled)]
pub(crate) struct OrderDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "User")]
    pub(crate) user_id: String,
    #[tabled(rename = "Worker")]
    pub(crate) worker_id: String,
    #[tabled(rename = "Status")]
    pub(crate) status: String,
    #[tabled(rename = "Address")]
    pub(crate) address: String,
    #[tabled(rename = "Created")]
    pub(crate) created: String,
    #[tabled(rename = "Deadline")]
    pub(crate) deadline: String,
    #[tabled(rename = "Rate")]
    pub(crate) rate: String,
}

impl From<&Order> for OrderDisplay {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            worker_id: format_optional_id(order.worker_id),
            status: status_label(order.status),
            address: truncate_with_ellipsis(&order.address, 30),
            created: order.creation_date.format("%Y-%m-%d %H:%M").to_string(),
            deadline: order.deadline.format("%Y-%m-%d %H:%M").to_string(),
            rate: match order.rate {
                UNRATED => "-".to_string(),
                rate => rate.to_string(),
            },
        }
    }
}

pub(crate) fn format_table(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders found.".to_string();
    }

    let display: Vec<OrderDisplay> = orders.iter().map(OrderDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

/// A task in an order together with its quantity.
#[derive(Debug, Serialize)]
pub(crate) struct OrderLine {
    #[serde(flatten)]
    pub(crate) task: Task,
    pub(crate) quantity: i32,
}

#[derive(Tabled)]
pub(crate) struct OrderLineDisplay {
    #[tabled(rename = "Task")]
    pub(crate) name: String,
    #[tabled(rename = "Price")]
    pub(crate) price: String,
    #[tabled(rename = "Qty")]
    pub(crate) quantity: i32,
    #[tabled(rename = "Subtotal")]
    pub(crate) subtotal: String,
}

impl From<&OrderLine> for OrderLineDisplay {
    fn from(line: &OrderLine) -> Self {
        Self {
            name: truncate_with_ellipsis(&line.task.name, 40),
            price: format!("{:.2}", line.task.price_per_single),
            quantity: line.quantity,
            subtotal: format!("{:.2}", line.task.price_per_single * f64::from(line.quantity)),
        }
    }
}

pub(crate) fn format_lines(lines: &[OrderLine]) -> String {
    if lines.is_empty() {
        return "No tasks in order.".to_string();
    }

    let total: f64 = lines
        .iter()
        .map(|l| l.task.price_per_single * f64::from(l.quantity))
        .sum();
    let display: Vec<OrderLineDisplay> = lines.iter().map(OrderLineDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    format!("{}\nTotal: {:.2}", table, total)
}

/// List orders matching `key=value` filters; no filters lists everything
pub async fn filter_orders<D: Database>(
    db: &D,
    filters: &[String],
    format: &str,
) -> CliResult<String> {
    let params = parse_key_values(filters)?;
    let orders = if params.is_empty() {
        db.orders().list().await?
    } else {
        db.orders().filter(&params).await?
    };

    match format {
        "json" => Ok(serde_json::to_string_pretty(&orders)?),
        _ => Ok(format_table(&orders)),
    }
}

/// Show the tasks of an order with quantities
pub async fn order_tasks<D: Database>(db: &D, id: &str, format: &str) -> CliResult<String> {
    let id = parse_uuid(id)?;
    let orders = db.orders();
    let tasks = orders.get_tasks_in_order(id).await?;
    let links = orders.get_ordered_tasks(id).await?;

    let lines: Vec<OrderLine> = tasks
        .into_iter()
        .map(|task| {
            let quantity = links
                .iter()
                .find(|l| l.task_id == task.id)
                .map(|l| l.quantity)
                .unwrap_or_default();
            OrderLine { task, quantity }
        })
        .collect();

    match format {
        "json" => Ok(serde_json::to_string_pretty(&lines)?),
        _ => Ok(format_lines(&lines)),
    }
}

/// Delete an order and its task links
pub async fn delete_order<D: Database>(db: &D, id: &str) -> CliResult<String> {
    let id = parse_uuid(id)?;
    db.orders().delete(id).await?;
    Ok(format!("✓ Deleted order: {}", id))
}
