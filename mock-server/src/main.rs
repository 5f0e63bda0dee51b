use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let appcode = std::env::var("APPCODE").unwrap_or_else(|_| "test-appcode".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("listening on {addr}{}", mock_server::IDCARD_PATH);
    mock_server::run(listener, &appcode).await
}
