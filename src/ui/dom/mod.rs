//! In-memory HTML document used as the live display surface.
//!
//! Rendered message fragments are parsed into a [`Document`], decorated in
//! place and serialized back out. Handles are generational so anything that
//! outlives a node (a pending timer, a stale binding) can tell it is gone.

mod node;
mod parse;
mod serialize;

use std::sync::Arc;
use tokio::sync::Mutex;

pub use node::{Document, ElementData, NodeData, NodeId};
pub use parse::parse_fragment;
pub use serialize::{inner_html, outer_html};

/// Shared handle to a [`Document`].
///
/// All mutation goes through short synchronous closures; callers never hold
/// the lock across their own awaits.
#[derive(Clone, Debug)]
pub struct DocumentHandle {
    inner: Arc<Mutex<Document>>,
}

impl DocumentHandle {
    pub fn new(doc: Document) -> Self {
        Self {
            inner: Arc::new(Mutex::new(doc)),
        }
    }

    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Document) -> R,
    {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Document) -> R,
    {
        let guard = self.inner.lock().await;
        f(&guard)
    }
}

impl Default for DocumentHandle {
    fn default() -> Self {
        Self::new(Document::new())
    }
}
