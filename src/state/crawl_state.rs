use crate::url::{canonical_key, extract_authority, is_same_origin, FilterVerdict, ResourceFilter};
use dashmap::DashSet;
use std::collections::BTreeMap;
use std::sync::Mutex;
use url::Url;

/// A resource scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTask {
    /// Absolute URL as discovered (fragment and query preserved)
    pub url: Url,

    /// Number of link hops from the seed
    pub depth: u32,

    /// Whether the fetched payload may be written to disk
    pub save: bool,
}

/// Result of trying to claim a URL for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The URL was claimed; the caller owns its single fetch
    Accepted(ResourceTask),
    /// Host differs from the seed's host
    External,
    /// Depth would exceed the configured maximum
    TooDeep,
    /// Path matches an exclude prefix or the script directory rule
    Filtered(FilterVerdict),
    /// Another task already claimed the same canonical key
    AlreadyVisited,
}

/// Shared state of one mirror run
///
/// All cross-task bookkeeping goes through this type: the visited set, the
/// origin and depth bounds, the filters, and the active-depth gauge. Claiming a
/// URL is a single atomic step, so each canonical resource is fetched at most
/// once no matter how many tasks discover it concurrently.
#[derive(Debug)]
pub struct CrawlState {
    base_host: String,
    max_depth: u32,
    filter: ResourceFilter,
    visited: DashSet<String>,
    active_depths: Mutex<BTreeMap<u32, usize>>,
}

impl CrawlState {
    /// Creates the state for a run seeded at `seed`
    ///
    /// Returns None if the seed has no host.
    pub fn new(seed: &Url, max_depth: u32, filter: ResourceFilter) -> Option<Self> {
        Some(Self {
            base_host: extract_authority(seed)?,
            max_depth,
            filter,
            visited: DashSet::new(),
            active_depths: Mutex::new(BTreeMap::new()),
        })
    }

    /// The seed's host (with explicit port, if any)
    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// The configured maximum depth
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Attempts to claim `url` for fetching at `depth`
    ///
    /// Origin, depth, and path filters are checked first; the visited-set
    /// insertion is the final, atomic step.
    pub fn try_claim(&self, url: &Url, depth: u32) -> Claim {
        if !is_same_origin(url, &self.base_host) {
            return Claim::External;
        }

        if depth > self.max_depth {
            return Claim::TooDeep;
        }

        let verdict = self.filter.check(url);
        if !verdict.should_fetch() {
            return Claim::Filtered(verdict);
        }

        if !self.visited.insert(canonical_key(url)) {
            return Claim::AlreadyVisited;
        }

        Claim::Accepted(ResourceTask {
            url: url.clone(),
            depth,
            save: verdict.should_save(),
        })
    }

    /// Returns true if the canonical key of `url` has been claimed
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&canonical_key(url))
    }

    /// Number of claimed resources
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Marks a task as actively traversing its depth
    ///
    /// The returned guard leaves the depth when dropped, including on error
    /// paths and panics. Returns None if `depth` exceeds the maximum.
    pub fn enter(&self, depth: u32) -> Option<DepthGuard<'_>> {
        if depth > self.max_depth {
            return None;
        }
        let mut active = self.lock_depths();
        *active.entry(depth).or_insert(0) += 1;
        Some(DepthGuard { state: self, depth })
    }

    /// Deepest depth currently being traversed, if any task is active
    pub fn current_depth(&self) -> Option<u32> {
        self.lock_depths().keys().next_back().copied()
    }

    /// Number of tasks currently traversing
    pub fn active_count(&self) -> usize {
        self.lock_depths().values().sum()
    }

    fn leave(&self, depth: u32) {
        let mut active = self.lock_depths();
        if let Some(count) = active.get_mut(&depth) {
            *count -= 1;
            if *count == 0 {
                active.remove(&depth);
            }
        }
    }

    fn lock_depths(&self) -> std::sync::MutexGuard<'_, BTreeMap<u32, usize>> {
        // The map holds plain counters, so a poisoned lock is still consistent
        self.active_depths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps a depth level marked active for the lifetime of one task
#[derive(Debug)]
pub struct DepthGuard<'a> {
    state: &'a CrawlState,
    depth: u32,
}

impl DepthGuard<'_> {
    /// The depth this guard holds
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.state.leave(self.depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seed() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    fn state(max_depth: u32) -> CrawlState {
        CrawlState::new(&seed(), max_depth, ResourceFilter::default()).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_claim_once() {
        let state = state(5);
        let page = url("https://example.com/about");
        assert!(matches!(state.try_claim(&page, 1), Claim::Accepted(_)));
        assert_eq!(state.try_claim(&page, 1), Claim::AlreadyVisited);
        assert!(state.is_visited(&page));
    }

    #[test]
    fn test_fragment_and_query_variants_share_claim() {
        let state = state(5);
        assert!(matches!(
            state.try_claim(&url("https://example.com/a#one"), 1),
            Claim::Accepted(_)
        ));
        assert_eq!(
            state.try_claim(&url("https://example.com/a#two"), 1),
            Claim::AlreadyVisited
        );
        assert_eq!(
            state.try_claim(&url("https://example.com/a?x=1"), 1),
            Claim::AlreadyVisited
        );
    }

    #[test]
    fn test_scheme_variants_share_claim() {
        let state = state(5);
        assert!(matches!(
            state.try_claim(&url("https://example.com/x.html"), 1),
            Claim::Accepted(_)
        ));
        assert_eq!(
            state.try_claim(&url("http://example.com/x.html"), 1),
            Claim::AlreadyVisited
        );
    }

    #[test]
    fn test_external_never_claimed() {
        let state = state(5);
        assert_eq!(
            state.try_claim(&url("https://other.org/x"), 1),
            Claim::External
        );
        assert_eq!(state.visited_count(), 0);
    }

    #[test]
    fn test_depth_bound() {
        let state = state(2);
        assert!(matches!(
            state.try_claim(&url("https://example.com/a"), 2),
            Claim::Accepted(_)
        ));
        assert_eq!(
            state.try_claim(&url("https://example.com/b"), 3),
            Claim::TooDeep
        );
        assert!(!state.is_visited(&url("https://example.com/b")));
    }

    #[test]
    fn test_filters_applied_before_claim() {
        let filter = ResourceFilter::new(&["png".to_string()], &["/private".to_string()]);
        let state = CrawlState::new(&seed(), 5, filter).unwrap();

        assert_eq!(
            state.try_claim(&url("https://example.com/private/x"), 1),
            Claim::Filtered(FilterVerdict::Excluded)
        );
        assert_eq!(
            state.try_claim(&url("https://example.com/js/app.js"), 1),
            Claim::Filtered(FilterVerdict::Script)
        );

        match state.try_claim(&url("https://example.com/logo.png"), 1) {
            Claim::Accepted(task) => assert!(!task.save),
            other => panic!("expected accepted claim, got {:?}", other),
        }
    }

    #[test]
    fn test_concurrent_claims_accept_exactly_once() {
        let state = Arc::new(state(5));
        let page = url("https://example.com/contested");

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let state = Arc::clone(&state);
                let page = page.clone();
                std::thread::spawn(move || matches!(state.try_claim(&page, 1), Claim::Accepted(_)))
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|accepted| *accepted)
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn test_depth_guard_enter_leave() {
        let state = state(3);
        assert_eq!(state.current_depth(), None);

        let shallow = state.enter(1).unwrap();
        {
            let deep = state.enter(3).unwrap();
            assert_eq!(deep.depth(), 3);
            assert_eq!(state.current_depth(), Some(3));
            assert_eq!(state.active_count(), 2);
        }
        assert_eq!(state.current_depth(), Some(1));
        drop(shallow);
        assert_eq!(state.current_depth(), None);
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn test_enter_beyond_max_depth_refused() {
        let state = state(1);
        assert!(state.enter(2).is_none());
        assert_eq!(state.active_count(), 0);
    }
}
