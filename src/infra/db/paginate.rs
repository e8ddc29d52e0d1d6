//! Generic count-then-window executor for [`ListQuery`] descriptors.

use sqlx::postgres::{PgPool, PgRow};
use sqlx::FromRow;

use crate::application::pagination::{PageRequest, PageResult};
use crate::application::query::ListQuery;
use crate::application::repos::RepoError;

use super::util::{convert_count, map_sqlx_error};

/// Execute one listing: a `COUNT(*)` over the filtered set, then the page
/// window with the same `WHERE` clause. Two statements, not a transaction;
/// a write landing between them can skew `total_count` against the window
/// by at most the write, which offset pagination already tolerates.
pub async fn paginate<T>(
    pool: &PgPool,
    query: &ListQuery,
    request: &PageRequest,
) -> Result<PageResult<T>, RepoError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let total: i64 = query
        .count_builder()
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(map_sqlx_error)?;
    let total_count = convert_count(total)?;

    let items = query
        .page_builder(request)?
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(map_sqlx_error)?;

    Ok(PageResult::assemble(items, total_count, request))
}
