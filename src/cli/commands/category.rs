use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, truncate_with_ellipsis};
use crate::db::{Category, CategoryRepository, Database};
use tabled::{Table, Tabled};

#[derive(Tabled)]
pub(crate) struct CategoryDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: i64,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
}

impl From<&Category> for CategoryDisplay {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: truncate_with_ellipsis(&category.name, 50),
        }
    }
}

pub(crate) fn format_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    let display: Vec<CategoryDisplay> = categories.iter().map(CategoryDisplay::from).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

/// List all categories
pub async fn list_categories<D: Database>(db: &D, format: &str) -> CliResult<String> {
    let categories = db.categories().list().await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&categories)?),
        _ => Ok(format_table(&categories)),
    }
}

/// Create a category; the backend assigns its id
pub async fn create_category<D: Database>(db: &D, name: &str) -> CliResult<String> {
    let category = db
        .categories()
        .create(&Category {
            id: 0,
            name: name.to_string(),
        })
        .await?;

    Ok(format!(
        "✓ Created category: {} ({})",
        category.name, category.id
    ))
}
