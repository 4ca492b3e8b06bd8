use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::{Html, IntoResponse, Response},
};

use crate::app::services::AppServices;
use crate::rpc::openapi::generate_with_source;

pub async fn document(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let servers = [services.api_server_url()];
    match generate_with_source(
        services.router.contract(),
        &services.openapi_info,
        &servers,
        services.auth.as_ref(),
    )
    .await
    {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Scalar viewer pointed at the generated document.
pub async fn reference() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
  <head>
    <title>API Reference</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body>
    <div id="api-reference"></div>
    <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
    <script>
      Scalar.createApiReference('#api-reference', { url: '/api/openapi' })
    </script>
  </body>
</html>
"#,
    )
}
