use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    taskmarket::cli::run().await
}
