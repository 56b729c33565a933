use axum::extract::{rejection::QueryRejection, Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::api::HistoryAPI;
use crate::entities::HistoryRecord;
use crate::error::{invalid_input_error, Error};
use crate::server::DynAPI;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Serialize, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<HistoryRecord>>, Error> {
    let Query(params) = params.map_err(invalid_input_error)?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let records = api.recent_history(limit).await?;

    Ok(records.into())
}
