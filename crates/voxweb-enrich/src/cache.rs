//! Page-keyed analysis caches.

use std::collections::HashMap;

use tokio::sync::RwLock;

use voxweb_protocols::vision::AnalysisMode;

/// Two independent mappings from page key (URL) to analysis text.
///
/// A key is present in a mapping only after a successful analysis of that
/// kind completed for that exact key. Entries never expire on their own;
/// removal happens through [`invalidate`](Self::invalidate) or
/// [`clear`](Self::clear). Values are inserted whole - there is no partially
/// written state to observe.
#[derive(Default)]
pub struct AnalysisCache {
    description: RwLock<HashMap<String, String>>,
    content: RwLock<HashMap<String, String>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, mode: AnalysisMode) -> &RwLock<HashMap<String, String>> {
        match mode {
            AnalysisMode::Describe => &self.description,
            AnalysisMode::Content => &self.content,
        }
    }

    /// Look up the cached text for `key`, if any.
    pub async fn get(&self, mode: AnalysisMode, key: &str) -> Option<String> {
        self.map(mode).read().await.get(key).cloned()
    }

    /// Whether `key` has an entry of the given kind.
    pub async fn contains(&self, mode: AnalysisMode, key: &str) -> bool {
        self.map(mode).read().await.contains_key(key)
    }

    /// Whether `key` has both a description and a content entry.
    pub async fn has_both(&self, key: &str) -> bool {
        self.contains(AnalysisMode::Describe, key).await
            && self.contains(AnalysisMode::Content, key).await
    }

    /// Store the analysis text for `key`.
    pub async fn insert(&self, mode: AnalysisMode, key: &str, text: String) {
        self.map(mode).write().await.insert(key.to_string(), text);
    }

    /// Remove `key` from both mappings. Returns true if anything was removed.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed_description = self.description.write().await.remove(key).is_some();
        let removed_content = self.content.write().await.remove(key).is_some();
        removed_description || removed_content
    }

    /// Empty both mappings.
    pub async fn clear(&self) {
        self.description.write().await.clear();
        self.content.write().await.clear();
    }

    /// Number of entries of the given kind.
    pub async fn len(&self, mode: AnalysisMode) -> usize {
        self.map(mode).read().await.len()
    }
}
