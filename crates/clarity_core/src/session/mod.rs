//! Client session: transport, entity cache and document round trips.
//!
//! # Responsibility
//! - Own the transport collaborator and the per-session entity cache.
//! - Turn HTTP statuses into the error taxonomy.
//! - Fetch, save and create documents on behalf of entities.
//!
//! # Invariants
//! - Identity is per session: one cell per `(kind, canonical URI)`.
//! - A failed save leaves the in-memory document exactly as it was.
//! - Nothing is retried here.
//!
//! Concurrent edits through two sessions are last-save-wins; there is no
//! optimistic concurrency check.

mod creation;

pub use creation::{ReagentKitCreation, ReagentLotCreation, SampleCreation, StepCreation};

use crate::cache::{CacheLookup, EntityCache};
use crate::config::SessionConfig;
use crate::error::{ClarityError, ClarityResult};
use crate::model::catalog;
use crate::model::entity::Entity;
use crate::model::kind::EntityKind;
use crate::transport::{Method, Response, Transport};
use crate::xml::{self, Element};
use log::{debug, error, info};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

pub(crate) struct SessionCore {
    config: SessionConfig,
    transport: Box<dyn Transport>,
    cache: RefCell<EntityCache>,
}

/// Cheaply cloneable handle to one client session.
#[derive(Clone)]
pub struct Session {
    core: Rc<SessionCore>,
}

impl Session {
    pub fn new(config: SessionConfig, transport: impl Transport + 'static) -> ClarityResult<Self> {
        config.validate()?;
        info!(
            "event=session_open module=session status=ok base_url={} api_version={}",
            config.base_url, config.api_version
        );
        Ok(Self {
            core: Rc::new(SessionCore {
                config,
                transport: Box::new(transport),
                cache: RefCell::new(EntityCache::new()),
            }),
        })
    }

    pub(crate) fn from_core(core: Rc<SessionCore>) -> Self {
        Self { core }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.core.config
    }

    /// Joins `segments` under this session's API root.
    pub fn get_uri(&self, segments: &[&str]) -> String {
        self.core.config.api_uri(segments)
    }

    /// Returns the cached entity for `uri`, creating an unloaded one on a miss.
    pub fn entity(&self, kind: EntityKind, uri: &str) -> Entity {
        let weak = Rc::downgrade(&self.core);
        let (entity, lookup) = self
            .core
            .cache
            .borrow_mut()
            .get_or_insert_with(kind, uri, || Entity::new(kind, uri, weak));
        if lookup == CacheLookup::Miss {
            debug!(
                "event=cache_register module=session status=ok kind={} uri={}",
                kind.name(),
                uri
            );
        }
        entity
    }

    /// Resolves a short id through the kind's collection URI.
    ///
    /// # Errors
    /// - `InvalidArgument` for sub-resource kinds with no collection path.
    pub fn entity_by_id(&self, kind: EntityKind, id: &str) -> ClarityResult<Entity> {
        let segment = kind.spec().uri_segment.ok_or_else(|| {
            ClarityError::InvalidArgument(format!(
                "{} has no collection URI; look it up by full URI",
                kind.name()
            ))
        })?;
        Ok(self.entity(kind, &self.get_uri(&[segment, id])))
    }

    /// Accepts either a full URI or a short id; both land in the same slot.
    pub fn get_or_create(&self, kind: EntityKind, uri_or_id: &str) -> ClarityResult<Entity> {
        if uri_or_id.contains("://") {
            Ok(self.entity(kind, uri_or_id))
        } else {
            self.entity_by_id(kind, uri_or_id)
        }
    }

    /// Cached entity for `uri`, without registering one.
    pub fn cached(&self, kind: EntityKind, uri: &str) -> Option<Entity> {
        self.core.cache.borrow().get(kind, uri)
    }

    pub fn cache_len(&self) -> usize {
        self.core.cache.borrow().len()
    }

    pub fn clear_cache(&self) {
        let mut cache = self.core.cache.borrow_mut();
        info!(
            "event=cache_clear module=session status=ok evicted={}",
            cache.len()
        );
        cache.clear();
    }

    /// Parses a response body whose kind is not known in advance and
    /// installs it into the cached entity named by its `uri` attribute.
    pub fn load_document(&self, bytes: &[u8]) -> ClarityResult<Entity> {
        let root = xml::parse_document(bytes)?;
        self.adopt(root)
    }

    /// Saves the entity's document with PUT.
    pub fn put(&self, entity: &Entity) -> ClarityResult<()> {
        self.save(entity, Method::Put)
    }

    /// Saves the entity's document with POST, for resources the server
    /// updates that way (step placements, actions).
    pub fn post(&self, entity: &Entity) -> ClarityResult<()> {
        self.save(entity, Method::Post)
    }

    /// Runs the step's available program called `program_name` and returns
    /// the resulting program status, already loaded.
    pub fn trigger_program(&self, step: &Entity, program_name: &str) -> ClarityResult<Entity> {
        let link = step
            .available_programs()?
            .into_iter()
            .find(|link| link.name.as_deref() == Some(program_name))
            .ok_or_else(|| {
                ClarityError::InvalidArgument(format!(
                    "step {} has no program named `{program_name}`",
                    step.uri()
                ))
            })?;

        let response = self.send(Method::Post, &link.uri, Some(&[][..]))?;
        let status = self.load_document(&response.body)?;
        if status.kind() != EntityKind::ProgramStatus {
            return Err(ClarityError::MalformedDocument(format!(
                "program trigger returned a {} document",
                status.kind().name()
            )));
        }
        Ok(status)
    }

    /// Inputs of the artifact's parent process that produced this artifact;
    /// empty for artifacts with no parent process.
    pub fn input_artifact_list(&self, artifact: &Entity) -> ClarityResult<Vec<Entity>> {
        let Some(process) = artifact.get_entity("parent_process")? else {
            return Ok(Vec::new());
        };
        let inputs = process
            .input_outputs()?
            .into_iter()
            .filter(|map| map.output.as_ref() == Some(artifact))
            .map(|map| map.input)
            .fold(Vec::new(), |mut inputs: Vec<Entity>, input| {
                if !inputs.contains(&input) {
                    inputs.push(input);
                }
                inputs
            });
        Ok(inputs)
    }

    /// GETs `uri` and checks the root belongs to `kind`.
    pub(crate) fn fetch_document(&self, kind: EntityKind, uri: &str) -> ClarityResult<Element> {
        let started_at = Instant::now();
        let result = self.send(Method::Get, uri, None).and_then(|response| {
            let root = xml::parse_document(&response.body)?;
            let found = catalog::kind_of(&root)?;
            if found != kind {
                return Err(ClarityError::MalformedDocument(format!(
                    "expected a {} document at {uri}, got {}",
                    kind.name(),
                    found.name()
                )));
            }
            Ok(root)
        });

        match &result {
            Ok(_) => info!(
                "event=entity_fetch module=session status=ok kind={} uri={} duration_ms={}",
                kind.name(),
                uri,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=entity_fetch module=session status=error kind={} uri={} duration_ms={} error={}",
                kind.name(),
                uri,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Issues one request and maps non-2xx statuses onto the error taxonomy.
    pub(crate) fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<&[u8]>,
    ) -> ClarityResult<Response> {
        let transport = &self.core.transport;
        let response = match method {
            Method::Get => transport.get(uri)?,
            Method::Post => transport.post(uri, body.unwrap_or_default())?,
            Method::Put => transport.put(uri, body.unwrap_or_default())?,
        };
        check_status(uri, response)
    }

    /// Registers a freshly parsed document under its `uri` attribute.
    pub(crate) fn adopt(&self, root: Element) -> ClarityResult<Entity> {
        let kind = catalog::kind_of(&root)?;
        let uri = root
            .attr("uri")
            .ok_or_else(|| {
                ClarityError::missing(format!(
                    "{} document has no `uri` attribute",
                    kind.name()
                ))
            })?
            .to_string();
        let entity = self.entity(kind, &uri);
        entity.install(root);
        Ok(entity)
    }

    fn save(&self, entity: &Entity, method: Method) -> ClarityResult<()> {
        let started_at = Instant::now();
        let body = match entity.held_root() {
            Some(root) => xml::to_bytes(&root)?,
            None => {
                return Err(ClarityError::InvalidArgument(format!(
                    "cannot save {}: document not loaded",
                    entity.uri()
                )))
            }
        };

        let result = self
            .send(method, entity.uri(), Some(body.as_slice()))
            .and_then(|response| refreshed_root(entity, &response));
        match result {
            Ok(refreshed) => {
                if let Some(root) = refreshed {
                    entity.install(root);
                }
                info!(
                    "event=entity_save module=session status=ok method={} kind={} uri={} duration_ms={}",
                    method.as_str(),
                    entity.kind().name(),
                    entity.uri(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=entity_save module=session status=error method={} kind={} uri={} duration_ms={} error={}",
                    method.as_str(),
                    entity.kind().name(),
                    entity.uri(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Parses a save response; an empty body keeps the local document.
fn refreshed_root(entity: &Entity, response: &Response) -> ClarityResult<Option<Element>> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let root = xml::parse_document(&response.body)?;
    let kind = catalog::kind_of(&root)?;
    if kind != entity.kind() {
        return Err(ClarityError::MalformedDocument(format!(
            "save of {} returned a {} document",
            entity.uri(),
            kind.name()
        )));
    }
    Ok(Some(root))
}

fn check_status(uri: &str, response: Response) -> ClarityResult<Response> {
    if response.is_success() {
        return Ok(response);
    }
    match response.status {
        404 => Err(ClarityError::NotFound {
            uri: uri.to_string(),
        }),
        status => Err(ClarityError::ServerError {
            uri: uri.to_string(),
            status,
            message: exception_message(&response.body),
        }),
    }
}

/// `<message>` text of an `exc:exception` error body, if there is one.
fn exception_message(body: &[u8]) -> Option<String> {
    let root = xml::parse_document(body).ok()?;
    root.child("message")
        .and_then(Element::trimmed_text)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::check_status;
    use crate::error::ClarityError;
    use crate::transport::Response;

    #[test]
    fn statuses_map_onto_error_taxonomy() {
        assert!(check_status("u", Response::new(201, "")).is_ok());
        assert!(check_status("u", Response::new(299, "")).is_ok());
        assert!(matches!(
            check_status("u", Response::new(300, "")),
            Err(ClarityError::ServerError { status: 300, .. })
        ));
        assert!(matches!(
            check_status("u", Response::new(404, "")),
            Err(ClarityError::NotFound { .. })
        ));

        let body = r#"<exc:exception xmlns:exc="http://genologics.com/ri/exception"><message>Step is locked</message></exc:exception>"#;
        match check_status("u", Response::new(400, body)) {
            Err(ClarityError::ServerError {
                status, message, ..
            }) => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Step is locked"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
