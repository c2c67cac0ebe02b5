//! Dossier persistence - one YAML file per project under projects/
//!
//! Writes are atomic (temp file + rename) and serialized per project, so two
//! commands racing on the same dossier in one process cannot interleave a
//! read-modify-write. An operation that fails leaves the file untouched.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

use crate::core::dossier::ProjectDossier;
use crate::core::entity::Entity;
use crate::core::error::DossierError;
use crate::core::identity::EntityId;
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::entities::ticket::Ticket;
use crate::yaml::{self, YamlError};

/// Errors from loading, resolving or saving dossiers
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error(transparent)]
    Dossier(#[from] DossierError),

    #[error("no entity matches '{reference}'")]
    NotFound { reference: String },

    #[error("'{reference}' is ambiguous; candidates: {}", candidates.join(", "))]
    Ambiguous {
        reference: String,
        candidates: Vec<String>,
    },
}

/// File-backed store for project dossiers and tickets
pub struct DossierStore {
    workspace: Workspace,
}

fn file_locks() -> &'static Mutex<HashMap<String, Arc<Mutex<()>>>> {
    static LOCKS: OnceLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> = OnceLock::new();
    LOCKS.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock_for(id: &str) -> Arc<Mutex<()>> {
    let mut map = file_locks()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    map.entry(id.to_string())
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

impl DossierStore {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// Open the store of the workspace containing the current directory
    pub fn discover() -> Result<Self, StoreError> {
        Ok(Self::new(Workspace::discover()?))
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    fn dossier_path(&self, id: &EntityId) -> PathBuf {
        self.workspace
            .projects_dir()
            .join(format!("{}.vct.yaml", id))
    }

    fn ticket_path(&self, id: &EntityId) -> PathBuf {
        self.workspace
            .tickets_dir()
            .join(format!("{}.vct.yaml", id))
    }

    fn read_all<E: Entity + 'static>(
        files: impl Iterator<Item = PathBuf>,
    ) -> Result<Vec<E>, StoreError> {
        let mut entities = Vec::new();
        for path in files {
            entities.push(yaml::read_file::<E>(&path)?);
        }
        entities.sort_by_key(|e| e.created());
        Ok(entities)
    }

    // -- dossiers -----------------------------------------------------------

    pub fn save(&self, dossier: &ProjectDossier) -> Result<(), StoreError> {
        yaml::write_file(&self.dossier_path(&dossier.id), dossier)?;
        Ok(())
    }

    pub fn load(&self, id: &EntityId) -> Result<ProjectDossier, StoreError> {
        Ok(yaml::read_file(&self.dossier_path(id))?)
    }

    /// All dossiers in the workspace, oldest first
    pub fn list(&self) -> Result<Vec<ProjectDossier>, StoreError> {
        Self::read_all(self.workspace.iter_dossier_files())
    }

    /// Resolve a user-supplied reference to a project id. Accepts the full id
    /// or a unique prefix of its ULID part.
    pub fn resolve(&self, reference: &str) -> Result<EntityId, StoreError> {
        Self::resolve_in(
            reference,
            ProjectDossier::PREFIX,
            self.workspace.iter_dossier_files(),
        )
    }

    /// Resolve a user-supplied reference to a ticket id
    pub fn resolve_ticket(&self, reference: &str) -> Result<EntityId, StoreError> {
        Self::resolve_in(reference, Ticket::PREFIX, self.workspace.iter_ticket_files())
    }

    fn resolve_in(
        reference: &str,
        prefix: &str,
        files: impl Iterator<Item = PathBuf>,
    ) -> Result<EntityId, StoreError> {
        let needle = reference.to_uppercase();
        let mut candidates = Vec::new();

        for path in files {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(id_str) = name.strip_suffix(".vct.yaml") else {
                continue;
            };
            let matched = id_str == needle
                || id_str
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.strip_prefix('-'))
                    .is_some_and(|ulid| ulid.starts_with(&needle));
            if matched {
                candidates.push(id_str.to_string());
            }
        }

        match candidates.len() {
            0 => Err(StoreError::NotFound {
                reference: reference.to_string(),
            }),
            1 => EntityId::parse(&candidates[0]).map_err(|_| StoreError::NotFound {
                reference: reference.to_string(),
            }),
            _ => Err(StoreError::Ambiguous {
                reference: reference.to_string(),
                candidates,
            }),
        }
    }

    /// Load a dossier, apply an operation, and save it back only if the
    /// operation succeeded. Serialized per project id.
    pub fn with_dossier_mut<T>(
        &self,
        reference: &str,
        op: impl FnOnce(&mut ProjectDossier) -> Result<T, DossierError>,
    ) -> Result<T, StoreError> {
        let id = self.resolve(reference)?;
        let lock = lock_for(&id.to_string());
        let _guard = lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut dossier = self.load(&id)?;
        let out = op(&mut dossier)?;
        self.save(&dossier)?;
        Ok(out)
    }

    // -- tickets ------------------------------------------------------------

    pub fn save_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        yaml::write_file(&self.ticket_path(&ticket.id), ticket)?;
        Ok(())
    }

    pub fn load_ticket(&self, id: &EntityId) -> Result<Ticket, StoreError> {
        Ok(yaml::read_file(&self.ticket_path(id))?)
    }

    pub fn list_tickets(&self) -> Result<Vec<Ticket>, StoreError> {
        Self::read_all(self.workspace.iter_ticket_files())
    }

    /// Ticket counterpart of [`with_dossier_mut`](Self::with_dossier_mut)
    pub fn with_ticket_mut<T>(
        &self,
        reference: &str,
        op: impl FnOnce(&mut Ticket) -> Result<T, DossierError>,
    ) -> Result<T, StoreError> {
        let id = self.resolve_ticket(reference)?;
        let lock = lock_for(&id.to_string());
        let _guard = lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut ticket = self.load_ticket(&id)?;
        let out = op(&mut ticket)?;
        self.save_ticket(&ticket)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, DossierStore) {
        let tmp = tempdir().unwrap();
        let ws = Workspace::init(tmp.path()).unwrap();
        (tmp, DossierStore::new(ws))
    }

    #[test]
    fn test_save_load_roundtrip() {
        let (_tmp, store) = store();
        let dossier = ProjectDossier::new("Refinery unit 4", "Acme", "jsmith");
        store.save(&dossier).unwrap();

        let loaded = store.load(&dossier.id).unwrap();
        assert_eq!(loaded.id, dossier.id);
        assert_eq!(loaded.title, "Refinery unit 4");
    }

    #[test]
    fn test_resolve_by_ulid_prefix() {
        let (_tmp, store) = store();
        let dossier = ProjectDossier::new("Refinery unit 4", "Acme", "jsmith");
        store.save(&dossier).unwrap();

        let full = dossier.id.to_string();
        let ulid = full.strip_prefix("PRJ-").unwrap();

        assert_eq!(store.resolve(&full).unwrap(), dossier.id);
        assert_eq!(store.resolve(&ulid[..8]).unwrap(), dossier.id);
        assert_eq!(
            store.resolve(&ulid[..8].to_lowercase()).unwrap(),
            dossier.id
        );

        let err = store.resolve("NOPE").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_with_dossier_mut_discards_on_error() {
        let (_tmp, store) = store();
        let mut dossier = ProjectDossier::new("Refinery unit 4", "Acme", "jsmith");
        dossier.stage = crate::core::lifecycle::ProjectStage::TechnicalSelectionInProgress;
        store.save(&dossier).unwrap();
        let reference = dossier.id.to_string();

        // submitting an empty list fails; the file must be unchanged
        let result = store.with_dossier_mut(&reference, |d| {
            d.submit_technical_list(&crate::core::team::Actor::new(
                "jsmith",
                crate::core::team::Role::Engineering,
            ))
        });
        assert!(result.is_err());

        let reloaded = store.load(&dossier.id).unwrap();
        assert!(reloaded.technical_versions.is_empty());
        assert!(!reloaded.technical_list_locked);
    }

    #[test]
    fn test_list_is_oldest_first() {
        let (_tmp, store) = store();
        let a = ProjectDossier::new("First", "Acme", "jsmith");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = ProjectDossier::new("Second", "Acme", "jsmith");
        store.save(&b).unwrap();
        store.save(&a).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "First");
        assert_eq!(listed[1].title, "Second");
    }

    #[test]
    fn test_ticket_roundtrip() {
        let (_tmp, store) = store();
        let dossier = ProjectDossier::new("Refinery unit 4", "Acme", "jsmith");
        let ticket = Ticket::new(dossier.id.clone(), "Leak at stem seal", "customer");
        store.save_ticket(&ticket).unwrap();

        let resolved = store.resolve_ticket(&ticket.id.to_string()).unwrap();
        let loaded = store.load_ticket(&resolved).unwrap();
        assert_eq!(loaded.title, "Leak at stem seal");
    }
}
