use axum::extract::{rejection::PathRejection, Extension, Path};
use axum::response::Html;
use uuid::Uuid;

use crate::api::MapAPI;
use crate::error::{invalid_input_error, Error};
use crate::server::DynAPI;

pub async fn find(
    Extension(api): Extension<DynAPI>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Html<String>, Error> {
    let Path(id) = id.map_err(invalid_input_error)?;
    let document = api.find_map(id).await?;

    Ok(Html(document))
}

pub async fn latest(Extension(api): Extension<DynAPI>) -> Result<Html<String>, Error> {
    let document = api.latest_map().await?;

    Ok(Html(document))
}
