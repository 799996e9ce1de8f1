//! Lazy entity handle.
//!
//! # Responsibility
//! - Identify one remote resource by kind and URI.
//! - Own that resource's document and fetch it on first access.
//!
//! # Invariants
//! - Handles are cheap clones of one shared cell; the session cache hands
//!   out the same cell for the same `(kind, canonical URI)`.
//! - Equality and hashing use the canonical URI only, so they hold before
//!   either side is loaded.
//! - A failed fetch leaves the load state untouched; the next access retries.
//!
//! Handles are single-threaded (`Rc`). A host that needs one entity on
//! several threads must serialize access itself.

use crate::cache::canonical_uri;
use crate::error::{ClarityError, ClarityResult};
use crate::model::kind::EntityKind;
use crate::session::{Session, SessionCore};
use crate::xml::{self, Element};
use std::cell::{Ref, RefCell};
use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// Document lifecycle of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// URI known, no document yet.
    Unloaded,
    /// Document present and consistent with the last fetch or save.
    Loaded,
    /// Document kept but marked outdated; the next read refetches.
    Stale,
}

struct Body {
    state: LoadState,
    root: Option<Element>,
}

struct EntityCell {
    kind: EntityKind,
    uri: String,
    canonical: String,
    body: RefCell<Body>,
    session: Weak<SessionCore>,
}

/// Shared handle to one cached remote resource.
#[derive(Clone)]
pub struct Entity {
    cell: Rc<EntityCell>,
}

impl Entity {
    pub(crate) fn new(kind: EntityKind, uri: &str, session: Weak<SessionCore>) -> Self {
        Self {
            cell: Rc::new(EntityCell {
                kind,
                uri: uri.to_string(),
                canonical: canonical_uri(uri),
                body: RefCell::new(Body {
                    state: LoadState::Unloaded,
                    root: None,
                }),
                session,
            }),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.cell.kind
    }

    /// URI as first registered, query string included.
    pub fn uri(&self) -> &str {
        &self.cell.uri
    }

    pub fn canonical_uri(&self) -> &str {
        &self.cell.canonical
    }

    /// Last path segment of the canonical URI (the LIMS id).
    pub fn id(&self) -> &str {
        self.cell
            .canonical
            .rsplit('/')
            .next()
            .unwrap_or(self.cell.canonical.as_str())
    }

    pub fn load_state(&self) -> LoadState {
        self.cell.body.borrow().state
    }

    pub fn is_loaded(&self) -> bool {
        self.load_state() == LoadState::Loaded
    }

    /// Whether two handles share one cell, i.e. came from the same cache slot.
    pub fn same_instance(&self, other: &Entity) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn session(&self) -> ClarityResult<Session> {
        self.cell
            .session
            .upgrade()
            .map(Session::from_core)
            .ok_or(ClarityError::SessionClosed)
    }

    /// Fetches the document unconditionally, replacing any local edits.
    pub fn fetch(&self) -> ClarityResult<()> {
        let session = self.session()?;
        let root = session.fetch_document(self.kind(), self.uri())?;
        self.install(root);
        Ok(())
    }

    /// Fetches the document unless it is already loaded.
    pub fn ensure_loaded(&self) -> ClarityResult<()> {
        if self.is_loaded() {
            return Ok(());
        }
        self.fetch()
    }

    /// Marks a loaded document outdated so the next read refetches it.
    pub fn invalidate(&self) {
        let mut body = self.cell.body.borrow_mut();
        if body.state == LoadState::Loaded {
            body.state = LoadState::Stale;
        }
    }

    /// Reads the loaded document, fetching it first if needed.
    pub fn with_root<R>(
        &self,
        read: impl FnOnce(&Element) -> ClarityResult<R>,
    ) -> ClarityResult<R> {
        self.ensure_loaded()?;
        let body = self.cell.body.borrow();
        let root = body
            .root
            .as_ref()
            .ok_or_else(|| ClarityError::missing(format!("{} has no document", self.uri())))?;
        read(root)
    }

    /// Mutates the loaded document in place, fetching it first if needed.
    ///
    /// Mutation never changes the load state; it only touches memory until
    /// the entity is saved through its session.
    pub fn with_root_mut<R>(
        &self,
        write: impl FnOnce(&mut Element) -> ClarityResult<R>,
    ) -> ClarityResult<R> {
        self.ensure_loaded()?;
        let mut body = self.cell.body.borrow_mut();
        let root = body
            .root
            .as_mut()
            .ok_or_else(|| ClarityError::missing(format!("{} has no document", self.uri())))?;
        write(root)
    }

    /// Snapshot of the document, fetching it first if needed.
    pub fn root(&self) -> ClarityResult<Element> {
        self.with_root(|root| Ok(root.clone()))
    }

    /// Serializes the current document, fetching it first if needed.
    pub fn to_xml(&self) -> ClarityResult<Vec<u8>> {
        self.with_root(xml::to_bytes)
    }

    /// Document currently held, without triggering a fetch.
    pub(crate) fn held_root(&self) -> Option<Ref<'_, Element>> {
        Ref::filter_map(self.cell.body.borrow(), |body| body.root.as_ref()).ok()
    }

    pub(crate) fn install(&self, root: Element) {
        let mut body = self.cell.body.borrow_mut();
        body.root = Some(root);
        body.state = LoadState::Loaded;
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.cell.canonical == other.cell.canonical
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cell.canonical.hash(state);
    }
}

impl Debug for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.cell.kind)
            .field("uri", &self.cell.uri)
            .field("state", &self.load_state())
            .finish()
    }
}
