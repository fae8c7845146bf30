use crate::marker;
use crate::LinkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A working directory bound to a dataset reference (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub dir: PathBuf,
    pub reference: String,
    pub alias: String,
}

/// `username/name[@path]` -> `username/name`.
fn alias_of(reference: &str) -> &str {
    reference.split('@').next().unwrap_or(reference)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    links: Vec<Link>,
}

/// Persistent, process-wide registry of directory/reference links. Load and
/// save are serialized through an internal mutex; marker files in each linked
/// directory remain the authority on whether a link is still live across
/// processes (§4.G).
pub struct LinkRegistry {
    path: PathBuf,
    state: Mutex<State>,
}

impl LinkRegistry {
    /// Open (or create) the registry backed by `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<LinkRegistry, LinkError> {
        let path = path.into();
        let state = if path.exists() {
            let bytes = std::fs::read(&path)?;
            bincode::deserialize(&bytes)?
        } else {
            State::default()
        };
        Ok(LinkRegistry {
            path,
            state: Mutex::new(state),
        })
    }

    fn save(&self, state: &State) -> Result<(), LinkError> {
        let bytes = bincode::serialize(state)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Link `dir` to `reference`. If `reference`'s alias is already linked
    /// elsewhere, the prior directory's marker file decides: present it's a
    /// refusal, gone it's a stale link silently replaced (§4.G, §9).
    pub fn create_link(&self, dir: &Path, reference: &str) -> Result<Link, LinkError> {
        let alias = alias_of(reference).to_string();
        let mut state = self.state.lock().unwrap();

        if let Some(pos) = state.links.iter().position(|l| l.alias == alias) {
            let prior = &state.links[pos];
            if marker::exists(&prior.dir) {
                return Err(LinkError::AlreadyLinked {
                    alias,
                    dir: prior.dir.display().to_string(),
                });
            }
            tracing::warn!(
                alias = %alias,
                stale_dir = %prior.dir.display(),
                "replacing stale link whose marker file is gone"
            );
            state.links.remove(pos);
        }

        marker::write(dir, reference)?;
        let link = Link {
            dir: dir.to_path_buf(),
            reference: reference.to_string(),
            alias,
        };
        state.links.push(link.clone());
        self.save(&state)?;
        Ok(link)
    }

    /// Point the link rooted at `dir` at `new_ref`, rewriting its marker file
    /// and re-deriving its alias.
    pub fn modify_link_reference(&self, dir: &Path, new_ref: &str) -> Result<Link, LinkError> {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .links
            .iter()
            .position(|l| l.dir == dir)
            .ok_or_else(|| LinkError::NotFound(dir.display().to_string()))?;

        marker::write(dir, new_ref)?;
        let link = &mut state.links[pos];
        link.reference = new_ref.to_string();
        link.alias = alias_of(new_ref).to_string();
        let link = link.clone();
        self.save(&state)?;
        Ok(link)
    }

    /// Move the registry's record of `reference`'s directory to `dir_new`,
    /// without touching any marker file (the caller is expected to have
    /// already moved the working directory itself).
    pub fn modify_link_directory(
        &self,
        dir_new: &Path,
        reference: &str,
    ) -> Result<Link, LinkError> {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .links
            .iter()
            .position(|l| l.reference == reference)
            .ok_or_else(|| LinkError::NotFound(reference.to_string()))?;

        state.links[pos].dir = dir_new.to_path_buf();
        let link = state.links[pos].clone();
        self.save(&state)?;
        Ok(link)
    }

    /// Remove the link rooted at `dir`. Its marker file is deleted; a
    /// missing marker is only an error if its content would have disagreed
    /// with `reference` anyway (§4.G), since then there was nothing of
    /// ours to remove.
    pub fn unlink(&self, dir: &Path, reference: &str) -> Result<(), LinkError> {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .links
            .iter()
            .position(|l| l.dir == dir)
            .ok_or_else(|| LinkError::NotFound(dir.display().to_string()))?;

        match marker::read(dir) {
            Some(found) if found == reference => marker::remove(dir)?,
            Some(found) => {
                return Err(LinkError::MarkerMismatch {
                    dir: dir.display().to_string(),
                    found,
                    expected: reference.to_string(),
                })
            }
            None => return Err(LinkError::MissingMarker(dir.display().to_string())),
        }

        state.links.remove(pos);
        self.save(&state)?;
        Ok(())
    }

    /// Read-through page of the registry's links, in insertion order.
    pub fn list_links(&self, offset: usize, limit: usize) -> Vec<Link> {
        let state = self.state.lock().unwrap();
        state.links.iter().skip(offset).take(limit).cloned().collect()
    }
}
