//! Company (tenant) records and the store the settings page talks to.

use chrono::Utc;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

const INSTANCE_NAME_CONSTRAINT: &str = "companies_evolution_instance_name_key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub evolution_instance_name: Option<String>,
}

impl Company {
    pub fn instance_name(&self) -> Option<&str> {
        self.evolution_instance_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub evolution_instance_name: Option<String>,
}

impl CompanyPatch {
    pub fn instance_name(name: impl Into<String>) -> Self {
        Self {
            evolution_instance_name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid companies file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Company {0} not found")]
    NotFound(String),

    #[error("duplicate key value violates unique constraint \"{constraint}\": {detail}")]
    Duplicate {
        constraint: &'static str,
        detail: String,
    },
}

/// Data access for the signed-in company.
pub trait CompanyStore: Send + Sync {
    fn load(&self) -> BoxFuture<'static, Result<Company, StoreError>>;
    fn update(&self, patch: CompanyPatch) -> BoxFuture<'static, Result<Company, StoreError>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CompaniesFile {
    #[serde(default)]
    active_company_id: Option<String>,
    #[serde(default)]
    companies: Vec<Company>,
}

impl CompaniesFile {
    fn active_index(&self) -> Option<usize> {
        match self.active_company_id.as_deref() {
            Some(id) => self.companies.iter().position(|c| c.id == id),
            None => (!self.companies.is_empty()).then_some(0),
        }
    }
}

/// Keeps every tenant in one JSON file; instance names are unique across them.
#[derive(Clone)]
pub struct FileCompanyStore {
    path: PathBuf,
    default_name: String,
    lock: Arc<Mutex<()>>,
}

impl FileCompanyStore {
    pub fn new(path: impl Into<PathBuf>, default_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            default_name: default_name.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Option<CompaniesFile>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, file: &CompaniesFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(file)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read_or_init(&self) -> Result<(CompaniesFile, usize), StoreError> {
        let mut file = self.read_file().await?.unwrap_or_default();
        if let Some(idx) = file.active_index() {
            return Ok((file, idx));
        }

        let company = Company {
            id: format!("company-{:x}", Utc::now().timestamp_millis()),
            name: self.default_name.clone(),
            evolution_instance_name: None,
        };
        info!("Creating company {} ({})", company.name, company.id);
        file.active_company_id = Some(company.id.clone());
        file.companies.push(company);
        self.write_file(&file).await?;
        let idx = file.companies.len() - 1;
        Ok((file, idx))
    }

    async fn load_active(&self) -> Result<Company, StoreError> {
        let _guard = self.lock.lock().await;
        let (file, idx) = self.read_or_init().await?;
        Ok(file.companies[idx].clone())
    }

    async fn apply_patch(&self, patch: CompanyPatch) -> Result<Company, StoreError> {
        let _guard = self.lock.lock().await;
        let (mut file, idx) = self.read_or_init().await?;
        let active_id = file.companies[idx].id.clone();

        if let Some(ref wanted) = patch.evolution_instance_name {
            let taken = file.companies.iter().any(|c| {
                c.id != active_id
                    && c.instance_name()
                        .is_some_and(|name| name.eq_ignore_ascii_case(wanted))
            });
            if taken {
                return Err(StoreError::Duplicate {
                    constraint: INSTANCE_NAME_CONSTRAINT,
                    detail: format!("Key (evolution_instance_name)=({wanted}) already exists."),
                });
            }
        }

        let company = file
            .companies
            .get_mut(idx)
            .ok_or_else(|| StoreError::NotFound(active_id.clone()))?;
        if let Some(name) = patch.name {
            company.name = name;
        }
        if let Some(instance) = patch.evolution_instance_name {
            company.evolution_instance_name = (!instance.is_empty()).then_some(instance);
        }
        let updated = company.clone();

        self.write_file(&file).await?;
        debug!("Company {} updated", updated.id);
        Ok(updated)
    }
}

impl CompanyStore for FileCompanyStore {
    fn load(&self) -> BoxFuture<'static, Result<Company, StoreError>> {
        let store = self.clone();
        async move { store.load_active().await }.boxed()
    }

    fn update(&self, patch: CompanyPatch) -> BoxFuture<'static, Result<Company, StoreError>> {
        let store = self.clone();
        async move { store.apply_patch(patch).await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileCompanyStore {
        FileCompanyStore::new(dir.path().join("companies.json"), "Barbearia Centro")
    }

    #[tokio::test]
    async fn first_load_creates_default_company() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        let company = store.load().await.expect("load");
        assert_eq!(company.name, "Barbearia Centro");
        assert_eq!(company.instance_name(), None);
        assert!(store.path().exists());

        let again = store.load().await.expect("reload");
        assert_eq!(again.id, company.id);
    }

    #[tokio::test]
    async fn update_persists_instance_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        store.load().await.expect("load");

        let updated = store
            .update(CompanyPatch::instance_name("minhabarbearia"))
            .await
            .expect("update");
        assert_eq!(updated.instance_name(), Some("minhabarbearia"));

        let reopened = store_in(&dir).load().await.expect("reload");
        assert_eq!(reopened.instance_name(), Some("minhabarbearia"));
    }

    #[tokio::test]
    async fn instance_names_are_unique_across_companies() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("companies.json");
        let file = serde_json::json!({
            "active_company_id": "b",
            "companies": [
                { "id": "a", "name": "Other", "evolution_instance_name": "taken" },
                { "id": "b", "name": "Mine" }
            ]
        });
        std::fs::write(&path, file.to_string()).expect("seed file");
        let store = FileCompanyStore::new(&path, "unused");

        let err = store
            .update(CompanyPatch::instance_name("taken"))
            .await
            .err()
            .expect("duplicate rejected");
        assert!(err.to_string().contains("duplicate"));

        let mine = store.load().await.expect("load");
        assert_eq!(mine.id, "b");
        assert_eq!(mine.instance_name(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), b"{ not json").expect("write");

        let err = store.load().await.err().expect("error");
        assert!(matches!(err, StoreError::Json(_)));
    }
}
