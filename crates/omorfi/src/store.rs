// ModelStore: role-indexed registry of loaded transducers.
//
// Design notes:
// - One slot per role, each an RwLock around an Arc'd model. Readers clone
//   the Arc and drop the lock before running a lookup, so lookups never
//   hold a lock.
// - Files are read and parsed with no lock held. A store-wide writer mutex
//   serializes load/register/unload so the alphabet check against the other
//   roles and the swap happen as one step.
// - A poisoned lock is recovered: slots only ever hold complete models.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use omorfi_core::Role;
use omorfi_fst::{FstError, Transducer};

/// Error type for model loading failures.
///
/// A failed load leaves the store exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    /// The file could not be read.
    #[error("failed to read model {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid transducer.
    #[error("invalid model {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FstError,
    },

    /// The model was compiled against a different alphabet than a model
    /// already registered under another role.
    #[error(
        "alphabet mismatch: {role} model has alphabet {found}, but the loaded {other} model uses {expected}"
    )]
    AlphabetMismatch {
        role: Role,
        other: Role,
        expected: u32,
        found: u32,
    },
}

/// A transducer registered under a role.
///
/// Immutable once loaded; replacing a model swaps in a new `Model`.
#[derive(Debug)]
pub struct Model {
    role: Role,
    transducer: Transducer,
    path: Option<PathBuf>,
}

impl Model {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn transducer(&self) -> &Transducer {
        &self.transducer
    }

    /// File the model was loaded from, `None` for registered in-memory models.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Holds at most one model per [`Role`].
///
/// An empty slot is a valid state meaning "this capability is unavailable".
#[derive(Debug, Default)]
pub struct ModelStore {
    slots: [RwLock<Option<Arc<Model>>>; Role::ALL.len()],
    writer: Mutex<()>,
}

impl ModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the transducer at `path` and register it under `role`.
    ///
    /// Replaces any model already in that slot. On error the previous model
    /// stays in place and queryable.
    pub fn load(&self, path: impl AsRef<Path>, role: Role) -> Result<Arc<Model>, ModelLoadError> {
        let path = path.as_ref();
        let result = std::fs::read(path)
            .map_err(|source| ModelLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|data| {
                Transducer::from_bytes(&data).map_err(|source| ModelLoadError::Format {
                    path: path.to_path_buf(),
                    source,
                })
            })
            .and_then(|transducer| self.install(role, transducer, Some(path.to_path_buf())));

        match &result {
            Ok(model) => {
                let t = model.transducer();
                log::info!(
                    "loaded {role} model from {}: {} states, {} transitions, {} symbols",
                    path.display(),
                    t.state_count(),
                    t.transition_count(),
                    t.symbols().len(),
                );
            }
            Err(e) => log::warn!("rejected {role} model: {e}"),
        }
        result
    }

    /// Register an in-memory transducer under `role`, with the same
    /// alphabet check and replacement rules as [`ModelStore::load`].
    pub fn register(&self, role: Role, transducer: Transducer) -> Result<Arc<Model>, ModelLoadError> {
        let result = self.install(role, transducer, None);
        match &result {
            Ok(model) => log::info!(
                "registered {role} model: {} states, {} transitions",
                model.transducer().state_count(),
                model.transducer().transition_count(),
            ),
            Err(e) => log::warn!("rejected {role} model: {e}"),
        }
        result
    }

    /// The model registered under `role`, if any.
    pub fn get(&self, role: Role) -> Option<Arc<Model>> {
        self.slots[role.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove the model registered under `role`, returning it.
    pub fn unload(&self, role: Role) -> Option<Arc<Model>> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.slots[role.index()]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            log::info!("unloaded {role} model");
        }
        previous
    }

    /// Roles with a registered model, in [`Role::ALL`] order.
    pub fn loaded_roles(&self) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|&role| self.get(role).is_some())
            .collect()
    }

    fn install(
        &self,
        role: Role,
        transducer: Transducer,
        path: Option<PathBuf>,
    ) -> Result<Arc<Model>, ModelLoadError> {
        let model = Arc::new(Model {
            role,
            transducer,
            path,
        });

        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.check_alphabet(role, model.transducer.alphabet_id())?;

        let previous = self.slots[role.index()]
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&model));
        if previous.is_some() {
            log::debug!("replaced {role} model");
        }
        Ok(model)
    }

    /// Alphabet ids must agree across roles; 0 matches anything.
    fn check_alphabet(&self, role: Role, found: u32) -> Result<(), ModelLoadError> {
        if found == 0 {
            return Ok(());
        }
        for other in Role::ALL.into_iter().filter(|&r| r != role) {
            if let Some(model) = self.get(other) {
                let expected = model.transducer.alphabet_id();
                if expected != 0 && expected != found {
                    return Err(ModelLoadError::AlphabetMismatch {
                        role,
                        other,
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}
