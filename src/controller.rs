//! The page controller: authoritative filter state, sort/paging rules,
//! and URL synchronization through an injected adapter.

use crate::config::ClientConfig;
use crate::models::PageInfo;
use crate::query::{FilterState, SortField, SortOrder, StatusFilter, DEFAULT_PAGE};

/// The browser address bar (or any other query-string store) as an
/// explicit seam. `replace` must not push history entries, so
/// back/forward navigation is never polluted with intermediate states.
pub trait UrlState {
    fn read(&self) -> String;
    fn replace(&mut self, query: &str);
}

/// In-memory adapter, for tests and embedders without an address bar.
#[derive(Debug, Clone, Default)]
pub struct MemoryUrlState {
    query: String,
}

impl MemoryUrlState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl UrlState for MemoryUrlState {
    fn read(&self) -> String {
        self.query.clone()
    }

    fn replace(&mut self, query: &str) {
        self.query = query.to_string();
    }
}

/// Owns the filter state for the records page and the retry seed that
/// forces refetches after mutations.
#[derive(Debug)]
pub struct RecordsController<U: UrlState> {
    filters: FilterState,
    retry_seed: u64,
    url: U,
}

impl<U: UrlState> RecordsController<U> {
    /// Restore filter state from whatever the URL currently holds.
    pub fn new(url: U) -> Self {
        let filters = FilterState::from_query(&url.read());
        Self {
            filters,
            retry_seed: 0,
            url,
        }
    }

    /// Like [`new`](RecordsController::new), with list requests sized
    /// by the client configuration's page size.
    pub fn with_config(url: U, config: &ClientConfig) -> Self {
        let mut controller = Self::new(url);
        controller.filters.limit = config.page_size.max(1);
        controller
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn retry_seed(&self) -> u64 {
        self.retry_seed
    }

    pub fn url(&self) -> &U {
        &self.url
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filters.search = search.into();
        self.reset_page_and_sync();
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        self.filters.status = status;
        self.reset_page_and_sync();
    }

    pub fn set_department(&mut self, department: impl Into<String>) {
        self.filters.department = department.into();
        self.reset_page_and_sync();
    }

    /// Change pages without resetting anything else. Rejected when the
    /// target is out of the range the server last reported, or when no
    /// pagination is known yet.
    pub fn set_page(&mut self, page: u32, page_info: Option<&PageInfo>) -> bool {
        let Some(info) = page_info else {
            return false;
        };
        if page < 1 || page > info.total_pages {
            return false;
        }
        self.filters.page = page;
        self.sync_url();
        true
    }

    /// Activate a sort column: the active field flips its order, a new
    /// field starts ascending. Either way the page resets to 1.
    pub fn toggle_sort(&mut self, field: SortField) {
        let next_order = if self.filters.sort_by == field {
            self.filters.sort_order.toggled()
        } else {
            SortOrder::Asc
        };
        self.filters.sort_by = field;
        self.filters.sort_order = next_order;
        self.reset_page_and_sync();
    }

    pub fn reset_filters(&mut self) {
        let limit = self.filters.limit;
        self.filters = FilterState {
            limit,
            ..FilterState::default()
        };
        self.sync_url();
    }

    /// Pull the page back into range after the server reports fewer
    /// pages than we are on (e.g. the last record of the last page was
    /// just deleted). Returns true when the page changed.
    pub fn clamp_page(&mut self, info: &PageInfo) -> bool {
        if info.total_pages > 0 && self.filters.page > info.total_pages {
            tracing::debug!(
                from = self.filters.page,
                to = info.total_pages,
                "clamping page to server-reported total"
            );
            self.filters.page = info.total_pages;
            self.sync_url();
            return true;
        }
        false
    }

    /// Force the next fetch cycle; called after create/update/delete
    /// (server state changed under us) and by the error banner's retry.
    pub fn bump_retry_seed(&mut self) {
        self.retry_seed += 1;
    }

    /// Re-read filters from the URL (back/forward navigation). The
    /// page size is not URL state and survives the restore.
    pub fn restore_from_url(&mut self) {
        let limit = self.filters.limit;
        self.filters = FilterState::from_query(&self.url.read());
        self.filters.limit = limit;
    }

    fn reset_page_and_sync(&mut self) {
        self.filters.page = DEFAULT_PAGE;
        self.sync_url();
    }

    /// Write the canonical query string back, replace-style, only when
    /// it differs from what the adapter currently holds.
    fn sync_url(&mut self) {
        let next = self.filters.to_query();
        if next != self.url.read() {
            self.url.replace(&next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordStatus;

    fn page_info(page: u32, total_pages: u32) -> PageInfo {
        PageInfo {
            page,
            total_pages,
            total: (total_pages as u64) * 5,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }

    fn controller() -> RecordsController<MemoryUrlState> {
        RecordsController::new(MemoryUrlState::default())
    }

    #[test]
    fn initial_state_restores_from_url() {
        let url = MemoryUrlState::new("status=Pending&page=2&sortOrder=desc");
        let controller = RecordsController::new(url);
        assert_eq!(
            controller.filters().status,
            StatusFilter::Only(RecordStatus::Pending)
        );
        assert_eq!(controller.filters().page, 2);
        assert_eq!(controller.filters().sort_order, SortOrder::Desc);
    }

    #[test]
    fn filter_changes_reset_page_to_one() {
        let mut controller = controller();
        assert!(controller.set_page(3, Some(&page_info(1, 5))));
        controller.set_search("flu");
        assert_eq!(controller.filters().page, 1);

        assert!(controller.set_page(3, Some(&page_info(1, 5))));
        controller.set_status(StatusFilter::Only(RecordStatus::Active));
        assert_eq!(controller.filters().page, 1);

        assert!(controller.set_page(3, Some(&page_info(1, 5))));
        controller.set_department("Cardiology");
        assert_eq!(controller.filters().page, 1);
    }

    #[test]
    fn page_change_does_not_reset_other_filters() {
        let mut controller = controller();
        controller.set_search("flu");
        assert!(controller.set_page(2, Some(&page_info(1, 3))));
        assert_eq!(controller.filters().search, "flu");
        assert_eq!(controller.filters().page, 2);
    }

    #[test]
    fn out_of_range_pages_are_rejected() {
        let mut controller = controller();
        assert!(!controller.set_page(2, None));
        assert!(!controller.set_page(0, Some(&page_info(1, 3))));
        assert!(!controller.set_page(4, Some(&page_info(1, 3))));
        assert_eq!(controller.filters().page, 1);
    }

    #[test]
    fn sort_toggles_order_on_same_field_and_resets_on_new_field() {
        let mut controller = controller();
        controller.toggle_sort(SortField::PatientName);
        assert_eq!(controller.filters().sort_by, SortField::PatientName);
        assert_eq!(controller.filters().sort_order, SortOrder::Asc);

        controller.toggle_sort(SortField::PatientName);
        assert_eq!(controller.filters().sort_order, SortOrder::Desc);

        controller.toggle_sort(SortField::Department);
        assert_eq!(controller.filters().sort_by, SortField::Department);
        assert_eq!(controller.filters().sort_order, SortOrder::Asc);
    }

    #[test]
    fn sort_toggle_resets_page() {
        let mut controller = controller();
        assert!(controller.set_page(3, Some(&page_info(1, 5))));
        controller.toggle_sort(SortField::Status);
        assert_eq!(controller.filters().page, 1);
    }

    #[test]
    fn clamp_page_pulls_page_into_range() {
        let url = MemoryUrlState::new("page=3");
        let mut controller = RecordsController::new(url);
        assert!(controller.clamp_page(&page_info(2, 2)));
        assert_eq!(controller.filters().page, 2);
        assert_eq!(controller.url().read(), "page=2");

        // Already in range: nothing to do.
        assert!(!controller.clamp_page(&page_info(2, 2)));
        // Zero total pages (empty result set) never clamps.
        assert!(!controller.clamp_page(&page_info(1, 0)));
    }

    #[test]
    fn url_reflects_only_non_default_filters() {
        let mut controller = controller();
        controller.set_search("flu");
        controller.set_status(StatusFilter::Only(RecordStatus::Pending));
        assert_eq!(controller.url().read(), "search=flu&status=Pending");

        controller.reset_filters();
        assert_eq!(controller.url().read(), "");
        assert_eq!(controller.filters(), &FilterState::default());
    }

    #[test]
    fn restore_from_url_follows_navigation() {
        let mut controller = controller();
        controller.set_search("flu");
        controller.url.replace("status=Discharged");
        controller.restore_from_url();
        assert_eq!(controller.filters().search, "");
        assert_eq!(
            controller.filters().status,
            StatusFilter::Only(RecordStatus::Discharged)
        );
    }

    #[test]
    fn retry_seed_increments() {
        let mut controller = controller();
        assert_eq!(controller.retry_seed(), 0);
        controller.bump_retry_seed();
        controller.bump_retry_seed();
        assert_eq!(controller.retry_seed(), 2);
    }

    #[test]
    fn configured_page_size_reaches_the_request_query() {
        let config = ClientConfig::default().with_page_size(20);
        let controller = RecordsController::with_config(MemoryUrlState::default(), &config);
        assert_eq!(controller.filters().limit, 20);
        assert_eq!(
            controller.filters().to_request_query(),
            "page=1&limit=20&sortBy=id&sortOrder=asc"
        );
    }

    #[test]
    fn restore_from_url_keeps_page_size() {
        let config = ClientConfig::default().with_page_size(10);
        let mut controller = RecordsController::with_config(MemoryUrlState::default(), &config);
        controller.url.replace("status=Pending");
        controller.restore_from_url();
        assert_eq!(controller.filters().limit, 10);
        assert_eq!(
            controller.filters().status,
            StatusFilter::Only(RecordStatus::Pending)
        );
    }

    #[test]
    fn reset_keeps_page_size() {
        let url = MemoryUrlState::default();
        let mut controller = RecordsController::new(url);
        controller.filters.limit = 10;
        controller.set_search("x");
        controller.reset_filters();
        assert_eq!(controller.filters().limit, 10);
    }
}
