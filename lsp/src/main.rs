#[tokio::main]
async fn main() {
    rotoscope_lsp::run().await;
}
