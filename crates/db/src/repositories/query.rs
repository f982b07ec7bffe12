//! Query helpers shared by the repositories.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
};

use forecourt_shared::types::{ArchiveScope, PageRequest, PageResponse};

use crate::entities::sea_orm_active_enums::RecordStatus;

/// Adds `FOR UPDATE` where the backend supports row locks.
///
/// SQLite serialises writers on the whole database, so the clause is dropped there.
pub(crate) fn for_update<E: EntityTrait>(select: Select<E>, backend: DbBackend) -> Select<E> {
    match backend {
        DbBackend::Sqlite => select,
        _ => select.lock_exclusive(),
    }
}

/// True when the database rejected a write on a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Restricts a listing to the requested lifecycle statuses.
pub(crate) fn scoped<E, C>(select: Select<E>, status: C, scope: ArchiveScope) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    match scope {
        ArchiveScope::ActiveOnly => select.filter(status.eq(RecordStatus::Active)),
        ArchiveScope::OnlyArchived => select.filter(status.eq(RecordStatus::Archived)),
        ArchiveScope::WithArchived => select,
    }
}

/// Sortable columns of a resource, keyed by their public name.
pub(crate) struct Sortable<C: 'static> {
    pub columns: &'static [(&'static str, C)],
    pub default: &'static str,
    pub tie_breaker: C,
}

impl<C: ColumnTrait> Sortable<C> {
    fn column(&self, name: &str) -> Option<C> {
        self.columns.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
    }
}

/// Sorts, counts and fetches one page of `select`.
pub(crate) async fn paginate<E, C, D>(
    db: &D,
    select: Select<E>,
    sortable: &Sortable<C>,
    page: &PageRequest,
) -> Result<PageResponse<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'static,
    C: ColumnTrait,
    D: ConnectionTrait,
{
    let names: Vec<&'static str> = sortable.columns.iter().map(|(n, _)| *n).collect();
    let sort_by = page.sort_column(&names, sortable.default);
    let order = match page.sort_direction {
        forecourt_shared::types::SortDirection::Asc => Order::Asc,
        forecourt_shared::types::SortDirection::Desc => Order::Desc,
    };

    let mut select = select;
    if let Some(column) = sortable.column(sort_by) {
        select = select.order_by(column, order.clone());
    }
    let select = select.order_by(sortable.tie_breaker, order);

    let paginator = select.paginate(db, page.per_page());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.page() - 1).await?;

    Ok(PageResponse::new(items, page, total))
}
