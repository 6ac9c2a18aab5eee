use actix_web::{
    error::JsonPayloadError, http::StatusCode, post, web, HttpRequest, HttpResponse,
    ResponseError,
};
use serde::Serialize;

use crate::{
    domain::SearchRequest,
    services::{ProfileSearch, SearchError},
};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::Validation(_) | SearchError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            SearchError::Upstream(_) | SearchError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Plugged into `web::JsonConfig` so unreadable bodies get the same error
/// shape as every other failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::info!("Rejected search request body: {}", err);
    SearchError::InvalidBody(err.to_string()).into()
}

#[post("/search-profiles")]
pub async fn search_profiles(
    profile_search: web::Data<ProfileSearch>,
    body: web::Json<SearchRequest>,
) -> Result<HttpResponse, SearchError> {
    let profile_search = profile_search.into_inner();
    let request = body.into_inner();

    // Runs detached from this handler so a client disconnect does not cancel
    // an agent that has already been launched.
    let result = tokio::spawn(async move { profile_search.handle(request).await })
        .await
        .map_err(|e| SearchError::Internal(e.to_string()))
        .and_then(|result| result);

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            if e.status_code().is_server_error() {
                log::error!("Error during LinkedIn search: {:?}", e);
            }
            Err(e)
        }
    }
}
