use axum::extract::{rejection::JsonRejection, Extension, Json};

use crate::api::RouteAPI;
use crate::entities::{RouteRequest, RouteSummary};
use crate::error::{invalid_input_error, Error};
use crate::server::DynAPI;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteSummary>, Error> {
    let Json(params) = payload.map_err(invalid_input_error)?;
    let summary = api.plan_route(params).await?;

    Ok(summary.into())
}
