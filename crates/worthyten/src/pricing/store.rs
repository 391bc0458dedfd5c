use super::resolution::{PricingRulesStore, RulesStoreError};
use super::rules::PricingRules;
use crate::catalog::ProductId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Rules documents on disk: `<root>/global.json` and `<root>/products/<id>.json`.
///
/// A missing file means "not configured"; unreadable or malformed files are errors.
#[derive(Debug, Clone)]
pub struct JsonDirectoryRulesStore {
    root: PathBuf,
}

impl JsonDirectoryRulesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: PathBuf) -> Result<Option<PricingRules>, RulesStoreError> {
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(RulesStoreError::Io { path, source }),
        };

        PricingRules::from_json_str(&raw)
            .map(Some)
            .map_err(|source| RulesStoreError::Parse { path, source })
    }
}

fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl PricingRulesStore for JsonDirectoryRulesStore {
    fn product_rules(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PricingRules>, RulesStoreError> {
        if !is_safe_file_stem(&product_id.0) {
            warn!(product_id = %product_id.0, "refusing to map product id onto a rules file");
            return Ok(None);
        }

        let path = self
            .root
            .join("products")
            .join(format!("{}.json", product_id.0));
        self.read(path)
    }

    fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError> {
        self.read(self.root.join("global.json"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Global,
    Product(ProductId),
}

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    rules: Option<PricingRules>,
}

/// TTL cache in front of another store. Entries may be stale for up to `ttl`.
///
/// Absent rules are cached as well so unconfigured products do not hit the
/// backing store on every quote. Errors are never cached.
#[derive(Debug)]
pub struct CachedRulesStore<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl<S> CachedRulesStore<S>
where
    S: PricingRulesStore,
{
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn invalidate(&self) {
        self.entries.lock().expect("rules cache poisoned").clear();
    }

    fn cached(&self, key: &CacheKey) -> Option<Option<PricingRules>> {
        let guard = self.entries.lock().expect("rules cache poisoned");
        guard
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.rules.clone())
    }

    fn get_or_fetch<F>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> Result<Option<PricingRules>, RulesStoreError>
    where
        F: FnOnce(&S) -> Result<Option<PricingRules>, RulesStoreError>,
    {
        if let Some(rules) = self.cached(&key) {
            debug!(?key, "pricing rules cache hit");
            return Ok(rules);
        }

        let rules = fetch(&self.inner)?;
        self.entries.lock().expect("rules cache poisoned").insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                rules: rules.clone(),
            },
        );
        Ok(rules)
    }
}

impl<S> PricingRulesStore for CachedRulesStore<S>
where
    S: PricingRulesStore,
{
    fn product_rules(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<PricingRules>, RulesStoreError> {
        self.get_or_fetch(CacheKey::Product(product_id.clone()), |inner| {
            inner.product_rules(product_id)
        })
    }

    fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError> {
        self.get_or_fetch(CacheKey::Global, |inner| inner.global_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{resolve_rules, Question, RulesSource};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
        fs::write(path, contents).expect("write rules");
    }

    #[test]
    fn directory_store_reads_product_then_global() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(
            &dir.path().join("global.json"),
            r#"{ "powerOn": { "no": -5000 } }"#,
        );
        write(
            &dir.path().join("products").join("iphone-13.json"),
            r#"{ "powerOn": { "no": -9000 } }"#,
        );
        let store = JsonDirectoryRulesStore::new(dir.path());

        let product = resolve_rules(&store, &ProductId("iphone-13".to_string())).expect("resolves");
        let other = resolve_rules(&store, &ProductId("pixel-7".to_string())).expect("resolves");

        assert_eq!(product.source, RulesSource::Product);
        assert_eq!(product.rules.adjustment(Question::PowerOn, "no"), Some(-9000));
        assert_eq!(other.source, RulesSource::Global);
    }

    #[test]
    fn directory_store_reports_malformed_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(&dir.path().join("global.json"), "{ not json");
        let store = JsonDirectoryRulesStore::new(dir.path());

        let err = store.global_rules().expect_err("parse error");

        assert!(matches!(err, RulesStoreError::Parse { .. }));
    }

    #[test]
    fn directory_store_ignores_path_like_product_ids() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(&dir.path().join("global.json"), r#"{ "age": { "aboveTwoYears": -10 } }"#);
        let store = JsonDirectoryRulesStore::new(dir.path());

        let rules = store
            .product_rules(&ProductId("../global".to_string()))
            .expect("no error");

        assert!(rules.is_none());
    }

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    impl PricingRulesStore for CountingStore {
        fn product_rules(&self, _: &ProductId) -> Result<Option<PricingRules>, RulesStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        fn global_rules(&self) -> Result<Option<PricingRules>, RulesStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(PricingRules::new().with_adjustment(Question::PowerOn, "no", -1)))
        }
    }

    #[test]
    fn cache_serves_repeat_lookups_within_ttl() {
        let store = CachedRulesStore::new(CountingStore::default(), Duration::from_secs(300));
        let id = ProductId("a7-iii".to_string());

        for _ in 0..3 {
            let resolved = resolve_rules(&store, &id).expect("resolves");
            assert_eq!(resolved.source, RulesSource::Global);
        }

        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 2);

        store.invalidate();
        resolve_rules(&store, &id).expect("resolves");
        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let store = CachedRulesStore::new(CountingStore::default(), Duration::ZERO);

        store.global_rules().expect("fetch");
        store.global_rules().expect("fetch");

        assert_eq!(store.inner().calls.load(Ordering::SeqCst), 2);
    }
}
