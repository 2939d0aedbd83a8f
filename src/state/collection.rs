use super::async_op::{AsyncOp, OpToken};
use crate::api::ApiError;
use std::collections::HashSet;

/// Items cached from a server-owned list. The id must be unique within
/// one collection; the server assigns it.
pub trait RemoteItem {
    fn id(&self) -> &str;
}

impl RemoteItem for crate::api::Tweet {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Client-side cache of a server-owned list, refreshed wholesale.
///
/// Two policies govern every mutation:
/// - stale-read over data loss: a failed refresh records the failure but
///   never clears the previously fetched items;
/// - confirm-then-remove: deletes hit the server first and the item is
///   only dropped from the cache once the server acknowledged.
#[derive(Debug)]
pub struct RemoteCollection<T: RemoteItem> {
    items: Vec<T>,
    refresh: AsyncOp<()>,
    pending_deletes: HashSet<String>,
    last_delete_error: Option<ApiError>,
    loaded_once: bool,
}

impl<T: RemoteItem> RemoteCollection<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            refresh: AsyncOp::new(),
            pending_deletes: HashSet::new(),
            last_delete_error: None,
            loaded_once: false,
        }
    }

    /// Items in server-defined order. The store never re-sorts.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lifecycle of the last full-refresh call.
    pub fn refresh_op(&self) -> &AsyncOp<()> {
        &self.refresh
    }

    /// Whether any refresh has ever succeeded.
    pub fn loaded_once(&self) -> bool {
        self.loaded_once
    }

    pub fn begin_refresh(&mut self) -> OpToken {
        self.refresh.start()
    }

    /// Apply a refresh completion. A success replaces the items
    /// wholesale; a failure leaves them untouched. Stale completions
    /// (superseded by a later `begin_refresh`) are discarded entirely.
    pub fn finish_refresh(&mut self, token: OpToken, result: Result<Vec<T>, ApiError>) {
        match result {
            Ok(list) => {
                if self.refresh.complete(token, Ok(())) {
                    self.items = list;
                    self.loaded_once = true;
                    self.pending_deletes
                        .retain(|id| self.items.iter().any(|item| item.id() == id));
                }
            }
            Err(err) => {
                self.refresh.complete(token, Err(err));
            }
        }
    }

    pub fn dismiss_refresh_error(&mut self) {
        if self.refresh.error().is_some() {
            self.refresh.reset();
        }
    }

    /// Gate a delete request. Returns false when a delete for this id is
    /// already in flight, in which case the caller must not issue another
    /// request (a repeated click is a no-op, not a duplicate).
    pub fn begin_delete(&mut self, id: &str) -> bool {
        if self.pending_deletes.contains(id) {
            return false;
        }
        self.pending_deletes.insert(id.to_string());
        self.last_delete_error = None;
        true
    }

    /// Apply a delete completion. Only a confirmed success removes the
    /// item; a transport failure leaves the list unchanged. `NotFound`
    /// also drops the local copy (the server no longer has it) while
    /// still surfacing the error.
    pub fn finish_delete(&mut self, id: &str, result: Result<(), ApiError>) {
        self.pending_deletes.remove(id);
        match result {
            Ok(()) => {
                self.items.retain(|item| item.id() != id);
            }
            Err(ApiError::NotFound) => {
                self.items.retain(|item| item.id() != id);
                self.last_delete_error = Some(ApiError::NotFound);
            }
            Err(err) => {
                self.last_delete_error = Some(err);
            }
        }
    }

    pub fn is_delete_pending(&self, id: &str) -> bool {
        self.pending_deletes.contains(id)
    }

    pub fn delete_error(&self) -> Option<&ApiError> {
        self.last_delete_error.as_ref()
    }

    pub fn dismiss_delete_error(&mut self) {
        self.last_delete_error = None;
    }
}

impl<T: RemoteItem> Default for RemoteCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
    }

    impl RemoteItem for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str) -> Item {
        Item { id: id.to_string() }
    }

    fn net_err() -> ApiError {
        ApiError::Network("connection refused".to_string())
    }

    #[test]
    fn test_new_collection_is_empty_and_idle() {
        let coll: RemoteCollection<Item> = RemoteCollection::new();
        assert!(coll.is_empty());
        assert!(coll.refresh_op().is_idle());
        assert!(!coll.loaded_once());
    }

    #[test]
    fn test_successful_refresh_replaces_items() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1"), item("2")]));
        assert_eq!(coll.len(), 2);
        assert!(coll.loaded_once());

        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("3")]));
        assert_eq!(coll.items(), &[item("3")]);
    }

    #[test]
    fn test_failed_refresh_keeps_last_good_items() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1")]));

        let token = coll.begin_refresh();
        coll.finish_refresh(token, Err(net_err()));
        // stale-but-valid read: the list survives the failure
        assert_eq!(coll.items(), &[item("1")]);
        assert_eq!(coll.refresh_op().error(), Some(&net_err()));
    }

    #[test]
    fn test_visible_items_equal_last_successful_refresh() {
        let mut coll = RemoteCollection::new();
        let outcomes: Vec<Result<Vec<Item>, ApiError>> = vec![
            Ok(vec![item("a")]),
            Err(net_err()),
            Ok(vec![item("b"), item("c")]),
            Err(net_err()),
            Err(net_err()),
        ];
        for outcome in outcomes {
            let token = coll.begin_refresh();
            coll.finish_refresh(token, outcome);
        }
        assert_eq!(coll.items(), &[item("b"), item("c")]);
    }

    #[test]
    fn test_overlapping_refreshes_later_start_wins() {
        let mut coll = RemoteCollection::new();
        let first = coll.begin_refresh();
        let second = coll.begin_refresh();
        coll.finish_refresh(second, Ok(vec![item("new")]));
        // the earlier-started call resolving late is discarded wholesale
        coll.finish_refresh(first, Ok(vec![item("old")]));
        assert_eq!(coll.items(), &[item("new")]);

        let first = coll.begin_refresh();
        let second = coll.begin_refresh();
        coll.finish_refresh(second, Err(net_err()));
        coll.finish_refresh(first, Ok(vec![item("stale")]));
        assert_eq!(coll.items(), &[item("new")]);
        assert_eq!(coll.refresh_op().error(), Some(&net_err()));
    }

    #[test]
    fn test_confirmed_delete_removes_exactly_once() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1"), item("2")]));

        assert!(coll.begin_delete("1"));
        coll.finish_delete("1", Ok(()));
        assert_eq!(coll.items(), &[item("2")]);
        assert!(coll.delete_error().is_none());
    }

    #[test]
    fn test_failed_delete_leaves_items_unchanged() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1")]));

        assert!(coll.begin_delete("1"));
        coll.finish_delete("1", Err(net_err()));
        assert_eq!(coll.items(), &[item("1")]);
        assert_eq!(coll.delete_error(), Some(&net_err()));
        // the failure cleared the pending mark, so a retry is allowed
        assert!(coll.begin_delete("1"));
    }

    #[test]
    fn test_duplicate_delete_while_pending_is_noop() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1")]));

        assert!(coll.begin_delete("1"));
        // second click while the first request is in flight
        assert!(!coll.begin_delete("1"));
        assert!(coll.is_delete_pending("1"));
        coll.finish_delete("1", Ok(()));
        assert!(coll.is_empty());
        assert!(!coll.is_delete_pending("1"));
    }

    #[test]
    fn test_not_found_delete_drops_item_but_surfaces_error() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1")]));

        assert!(coll.begin_delete("1"));
        coll.finish_delete("1", Err(ApiError::NotFound));
        assert!(coll.is_empty());
        assert_eq!(coll.delete_error(), Some(&ApiError::NotFound));
    }

    #[test]
    fn test_refresh_prunes_stale_pending_deletes() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1"), item("2")]));
        assert!(coll.begin_delete("1"));

        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("2")]));
        // "1" vanished server-side; its pending mark must not linger
        assert!(!coll.is_delete_pending("1"));
    }

    #[test]
    fn test_single_item_fetch_then_delete_scenario() {
        let mut coll = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(
            token,
            Ok(vec![crate::api::Tweet {
                id: "1".to_string(),
                prompt: "p".to_string(),
                content: "c".to_string(),
                created_at: "2024-01-01T00:00:00Z".parse().unwrap(),
            }]),
        );
        assert_eq!(coll.len(), 1);
        assert!(coll.begin_delete("1"));
        coll.finish_delete("1", Ok(()));
        assert!(coll.is_empty());
    }

    #[test]
    fn test_dismiss_errors() {
        let mut coll: RemoteCollection<Item> = RemoteCollection::new();
        let token = coll.begin_refresh();
        coll.finish_refresh(token, Err(net_err()));
        coll.dismiss_refresh_error();
        assert!(coll.refresh_op().is_idle());

        let token = coll.begin_refresh();
        coll.finish_refresh(token, Ok(vec![item("1")]));
        coll.begin_delete("1");
        coll.finish_delete("1", Err(net_err()));
        coll.dismiss_delete_error();
        assert!(coll.delete_error().is_none());
    }
}
