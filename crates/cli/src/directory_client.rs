//! Directory-backed [`PostmanClient`]
//!
//! Published documents live under a local directory, one file per uid:
//!
//! ```text
//! {root}/collections/{uid}.json
//! {root}/environments/{uid}.json
//! ```
//!
//! A shared directory (or one synced to a workspace by another tool) stands in
//! for the remote side, so republishing merges against what was last published.

use restmeta_common::{stable_id, GeneratorError, Result};
use restmeta_generator::postman::types::{Collection, Environment};
use restmeta_generator::store::{read_json, write_json};
use restmeta_generator::{PostmanClient, RemoteEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const COLLECTIONS_DIR: &str = "collections";
const ENVIRONMENTS_DIR: &str = "environments";

pub struct DirectoryClient {
    root: PathBuf,
}

impl DirectoryClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_path(&self, uid: &str) -> PathBuf {
        self.root.join(COLLECTIONS_DIR).join(format!("{}.json", uid))
    }

    fn environment_path(&self, uid: &str) -> PathBuf {
        self.root.join(ENVIRONMENTS_DIR).join(format!("{}.json", uid))
    }

    /// Documents in `dir` as (uid, path) pairs, sorted by uid
    fn listed(&self, dir: &str) -> Result<Vec<(String, PathBuf)>> {
        let dir = self.root.join(dir);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| {
            GeneratorError::Remote(format!("Failed to list {}: {}", dir.display(), e))
        })?;

        let mut listed: Vec<(String, PathBuf)> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let uid = path.file_stem()?.to_string_lossy().into_owned();
                Some((uid, path))
            })
            .collect();
        listed.sort();
        Ok(listed)
    }

    fn require(&self, path: &Path, uid: &str) -> Result<()> {
        if path.exists() {
            Ok(())
        } else {
            Err(GeneratorError::Remote(format!("No document with uid {}", uid)))
        }
    }
}

impl PostmanClient for DirectoryClient {
    fn find_collection(&self, name: &str) -> Result<Option<RemoteEntry>> {
        for (uid, path) in self.listed(COLLECTIONS_DIR)? {
            match read_json::<Collection>(&path) {
                Ok(collection) if collection.info.name == name => {
                    return Ok(Some(RemoteEntry {
                        uid,
                        id: collection.info.postman_id,
                        name: collection.info.name,
                    }));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable collection")
                }
            }
        }
        Ok(None)
    }

    fn fetch_collection(&self, uid: &str) -> Result<Collection> {
        let path = self.collection_path(uid);
        self.require(&path, uid)?;
        read_json(&path)
    }

    fn create_collection(&self, collection: &Collection) -> Result<String> {
        let uid = stable_id(&["collection", collection.info.name.as_str()]);
        let mut created = collection.clone();
        created.info.postman_id.get_or_insert_with(|| uid.clone());
        write_json(&self.collection_path(&uid), &created)?;
        Ok(uid)
    }

    fn replace_collection(&self, uid: &str, collection: &Collection) -> Result<()> {
        let path = self.collection_path(uid);
        self.require(&path, uid)?;
        write_json(&path, collection)
    }

    fn find_environment(&self, name: &str) -> Result<Option<RemoteEntry>> {
        for (uid, path) in self.listed(ENVIRONMENTS_DIR)? {
            match read_json::<Environment>(&path) {
                Ok(environment) if environment.name == name => {
                    return Ok(Some(RemoteEntry {
                        uid,
                        id: environment.id,
                        name: environment.name,
                    }));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable environment")
                }
            }
        }
        Ok(None)
    }

    fn create_environment(&self, environment: &Environment) -> Result<String> {
        let uid = stable_id(&["environment", environment.name.as_str()]);
        let mut created = environment.clone();
        created.id.get_or_insert_with(|| uid.clone());
        write_json(&self.environment_path(&uid), &created)?;
        Ok(uid)
    }

    fn replace_environment(&self, uid: &str, environment: &Environment) -> Result<()> {
        let path = self.environment_path(uid);
        self.require(&path, uid)?;
        write_json(&path, environment)
    }
}
