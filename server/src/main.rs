#[tokio::main]
async fn main() {
    pista_server::start_server().await;
}
