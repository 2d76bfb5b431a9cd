use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::backend::{ObjectStorage, Page, PageRange, PostStore, StorageError, StoreError};
use crate::model::{Document, Post, PostId, PostSummary};

/// Store operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Fetch,
    FetchPage,
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    posts: Vec<Post>,
    failing: HashSet<StoreOp>,
}

/// Post table held in process. Ids are sequential numbers starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later `op` fail until [`MemoryStore::recover`] is called
    pub fn fail(&self, op: StoreOp) {
        self.state().failing.insert(op);
    }

    pub fn recover(&self, op: StoreOp) {
        self.state().failing.remove(&op);
    }

    pub fn len(&self) -> usize {
        self.state().posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored document, bypassing failure injection
    pub fn get(&self, id: &PostId) -> Option<Document> {
        self.state()
            .posts
            .iter()
            .find(|post| &post.id == id)
            .map(|post| post.document.clone())
    }

    fn guard(state: &StoreState, op: StoreOp) -> Result<(), StoreError> {
        if state.failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} disabled")));
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn fetch(&self, id: &PostId) -> Result<Document, StoreError> {
        let state = self.state();
        Self::guard(&state, StoreOp::Fetch)?;
        state
            .posts
            .iter()
            .find(|post| &post.id == id)
            .map(|post| post.document.clone())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn fetch_page(&self, range: PageRange) -> Result<Page<PostSummary>, StoreError> {
        let state = self.state();
        Self::guard(&state, StoreOp::FetchPage)?;

        let mut summaries: Vec<PostSummary> = state
            .posts
            .iter()
            .map(|post| PostSummary {
                id: post.id.clone(),
                title: post.document.title.clone(),
                saved_at: post.document.saved_at,
            })
            .collect();
        // newest first; never-saved rows last
        summaries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));

        Ok(Page {
            total: summaries.len(),
            rows: summaries
                .into_iter()
                .skip(range.from)
                .take(range.len())
                .collect(),
        })
    }

    async fn insert(&self, document: &Document) -> Result<PostId, StoreError> {
        let mut state = self.state();
        Self::guard(&state, StoreOp::Insert)?;
        state.next_id += 1;
        let id = PostId::new(state.next_id.to_string());
        state.posts.push(Post {
            id: id.clone(),
            document: document.clone(),
        });
        Ok(id)
    }

    async fn update(&self, id: &PostId, document: &Document) -> Result<(), StoreError> {
        let mut state = self.state();
        Self::guard(&state, StoreOp::Update)?;
        let post = state
            .posts
            .iter_mut()
            .find(|post| &post.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        post.document = document.clone();
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<(), StoreError> {
        let mut state = self.state();
        Self::guard(&state, StoreOp::Delete)?;
        state.posts.retain(|post| &post.id != id);
        Ok(())
    }
}

type RejectFn = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Object bucket held in process
pub struct MemoryStorage {
    base_url: String,
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    reject: Option<RejectFn>,
}

impl MemoryStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(HashMap::new()),
            reject: None,
        }
    }

    /// Refuse uploads whose path matches `reject`
    pub fn rejecting(mut self, reject: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.reject = Some(Box::new(reject));
        self
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, (Vec<u8>, String)>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bytes and content type of a stored object
    pub fn get(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.objects().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("base_url", &self.base_url)
            .field("objects", &self.len())
            .finish()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.reject.as_ref().is_some_and(|reject| reject(path)) {
            return Err(StorageError::Rejected(path.to_string()));
        }
        self.objects()
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}
