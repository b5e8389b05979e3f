#[tokio::main]
async fn main() -> eyre::Result<()> {
    magic_matcher::run().await
}
