use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, truncate_with_ellipsis};
use crate::db::{Database, User, UserRepository};
use serde::Serialize;
use tabled::{Table, Tabled};
use uuid::Uuid;

/// User as rendered by the CLI. The password hash is never printed.
#[derive(Debug, Serialize)]
pub(crate) struct PublicUser {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) surname: String,
    pub(crate) address: String,
    pub(crate) phone_number: String,
    pub(crate) email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            surname: user.surname.clone(),
            address: user.address.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Tabled)]
pub(crate) struct UserDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Email")]
    pub(crate) email: String,
    #[tabled(rename = "Phone")]
    pub(crate) phone: String,
}

impl From<&User> for UserDisplay {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: truncate_with_ellipsis(&format!("{} {}", user.name, user.surname), 30),
            email: user.email.clone(),
            phone: user.phone_number.clone(),
        }
    }
}

pub(crate) fn format_table(users: &[User]) -> String {
    if users.is_empty() {
        return "No users found.".to_string();
    }

    let display: Vec<UserDisplay> = users.iter().map(UserDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

/// List all users
pub async fn list_users<D: Database>(db: &D, format: &str) -> CliResult<String> {
    let users = db.users().list().await?;

    match format {
        "json" => {
            let public: Vec<PublicUser> = users.iter().map(PublicUser::from).collect();
            Ok(serde_json::to_string_pretty(&public)?)
        }
        _ => Ok(format_table(&users)),
    }
}
