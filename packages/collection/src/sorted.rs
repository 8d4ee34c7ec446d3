//! Deferred, restartable view over one page of a collection.

use std::sync::Arc;

use futures_util::stream::{self, Stream, TryStreamExt};
use status_core::{
    DISPLAY_FIELDS, IndexError, IndexStore, Page, ProjectedRecord, SortOrder, SortQuery,
    UPDATE_TIME_FIELD,
};

/// One page of a collection ordered by `update_time`, most recent first.
///
/// Holds only the query parameters. Every call to [`stream`](Self::stream)
/// or [`to_vec`](Self::to_vec) runs the query again; nothing is cached.
///
/// Members whose status record is gone are still yielded, with empty
/// fields, and sort after every record that has an `update_time`.
pub struct SortedKeys<S> {
    store: Arc<S>,
    namespace: String,
    worker: String,
    page: Page,
}

impl<S> std::fmt::Debug for SortedKeys<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedKeys")
            .field("namespace", &self.namespace)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl<S> SortedKeys<S>
where
    S: IndexStore,
{
    pub(crate) fn new(store: Arc<S>, namespace: String, worker: String, page: Page) -> Self {
        Self {
            store,
            namespace,
            worker,
            page,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    fn query(&self) -> SortQuery {
        SortQuery {
            by: UPDATE_TIME_FIELD.to_string(),
            order: SortOrder::Desc,
            offset: self.page.offset(),
            limit: self.page.limit(),
            get: DISPLAY_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    async fn fetch(&self) -> Result<Vec<ProjectedRecord>, IndexError> {
        let rows = self.store.sort(&self.namespace, &self.query()).await?;
        Ok(rows
            .into_iter()
            .map(|row| ProjectedRecord::from_values(&row.member, &self.worker, row.values))
            .collect())
    }

    /// Stream the page. The store is queried on first poll.
    pub fn stream(&self) -> impl Stream<Item = Result<ProjectedRecord, IndexError>> + Send + '_ {
        stream::once(self.fetch())
            .map_ok(|records| stream::iter(records.into_iter().map(Ok::<_, IndexError>)))
            .try_flatten()
    }

    /// Read the whole page.
    pub async fn to_vec(&self) -> Result<Vec<ProjectedRecord>, IndexError> {
        self.fetch().await
    }
}
