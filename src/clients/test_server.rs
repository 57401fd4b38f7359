use axum::Router;
use tokio::net::TcpListener;

/// Serves the router returned by `build` on an ephemeral local port and returns
/// its base URL. `build` gets the same URL so stub pages can link to each other.
pub(crate) async fn spawn(build: impl FnOnce(String) -> Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = build(base.clone());
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    base
}
