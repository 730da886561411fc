use top10_catalog::error::CatalogError;

#[tokio::main]
async fn main() -> Result<(), CatalogError> {
    top10_catalog::app::run().await
}
