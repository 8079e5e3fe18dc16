use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    teller_server::run().await
}
