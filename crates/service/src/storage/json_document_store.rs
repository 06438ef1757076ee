use std::{
    io::ErrorKind,
    marker::PhantomData,
    path::PathBuf,
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::error;

use crate::errors::ServiceError;

/// Generic JSON file-backed document store.
///
/// The whole document is read on every `load` and rewritten on every `save`.
/// Writers are serialized by a single mutex; readers take no lock and always
/// see a fully written version because saves go through a temp file + rename.
pub struct JsonDocumentStore<T> {
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send,
{
    /// Bind the store to a path. The file itself is only created on first save.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        Ok(Arc::new(Self { file_path, write_lock: Mutex::new(()), _doc: PhantomData }))
    }

    /// Read the full document. A missing file yields `T::default()`.
    pub async fn load(&self) -> Result<T, ServiceError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                error!(path = %self.file_path.display(), error = %e, "document read failed");
                return Err(ServiceError::Storage(format!("read {}: {e}", self.file_path.display())));
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "document is not valid JSON");
            ServiceError::Storage(format!("corrupt document {}: {e}", self.file_path.display()))
        })
    }

    /// Overwrite the document under the write lock.
    pub async fn save(&self, doc: &T) -> Result<(), ServiceError> {
        let _guard = self.write_lock.lock().await;
        self.write(doc).await
    }

    /// Load, mutate and save while holding the write lock for the whole cycle.
    /// Nothing is written when `f` fails.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<R, ServiceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        let out = f(&mut doc)?;
        self.write(&doc).await?;
        Ok(out)
    }

    async fn write(&self, doc: &T) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(doc)?;
        let tmp = self.temp_path();
        let result = async {
            fs::write(&tmp, &data).await?;
            fs::rename(&tmp, &self.file_path).await
        }
        .await;
        result.map_err(|e| {
            error!(path = %self.file_path.display(), error = %e, "document write failed");
            ServiceError::Storage(format!("write {}: {e}", self.file_path.display()))
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.file_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}
