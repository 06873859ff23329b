//! Query helpers shared by the sea-orm stores.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};

use crate::errors::{DbResultExt, RepoResult};
use crate::types::{Page, PaginationParams};

/// Run `query` one page at a time, returning the page rows and the total
/// row count of the unpaginated query.
pub(crate) async fn fetch_page<E>(
    query: Select<E>,
    db: &DatabaseConnection,
    params: &PaginationParams,
    operation: &'static str,
) -> RepoResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let paginator = query.paginate(db, params.limit());
    let total = paginator.num_items().await.context(operation)?;
    let items = paginator
        .fetch_page(params.page_index())
        .await
        .context(operation)?;

    Ok(Page::new(items, total))
}
