mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::Extension, routing::post, Router};

use crate::server::handlers::rides;
use crate::{api::API, auth::Authenticator};

type DynAPI = Arc<dyn API + Send + Sync>;
type DynAuthenticator = Arc<dyn Authenticator + Send + Sync>;

pub fn router<T, A>(api: T, authenticator: A) -> Router
where
    T: API + Send + Sync + 'static,
    A: Authenticator + Send + Sync + 'static,
{
    let api = Arc::new(api) as DynAPI;
    let authenticator = Arc::new(authenticator) as DynAuthenticator;

    Router::new()
        .route("/ride", post(rides::create).options(rides::preflight))
        .layer(Extension(api))
        .layer(Extension(authenticator))
}

pub async fn serve(app: Router, addr: SocketAddr) {
    tracing::info!("listening on {}", addr);

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server stopped: {}", err);
    }
}
