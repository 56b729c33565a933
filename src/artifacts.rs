use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{not_found_error, render_error, unexpected_error, Error};

/// Persists rendered map documents, one per request.
#[async_trait]
pub trait MapStore: Send + Sync {
    async fn save(&self, id: Uuid, document: String) -> Result<(), Error>;
    async fn load(&self, id: Uuid) -> Result<String, Error>;
    async fn latest(&self) -> Option<Uuid>;
}

/// Stores each document as `<dir>/<id>.html`.
#[derive(Debug)]
pub struct FsMapStore {
    dir: PathBuf,
    latest: RwLock<Option<Uuid>>,
}

impl FsMapStore {
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();

        tokio::fs::create_dir_all(&dir).await.map_err(|err| {
            unexpected_error(format!("cannot create {}: {}", dir.display(), err))
        })?;

        Ok(Self {
            dir,
            latest: RwLock::new(None),
        })
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.html", id))
    }

    /// Removes documents last written more than `max_age` ago.
    #[tracing::instrument(skip(self))]
    pub async fn purge_older_than(&self, max_age: Duration) -> Result<usize, Error> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(unexpected_error)?;
        let now = SystemTime::now();
        let mut purged = 0;

        while let Some(entry) = entries.next_entry().await.map_err(unexpected_error)? {
            let path = entry.path();

            if document_id(&path).is_none() {
                continue;
            }

            let modified = match entry.metadata().await.and_then(|meta| meta.modified()) {
                Ok(modified) => modified,
                Err(err) => {
                    tracing::warn!("skipping {}: {}", path.display(), err);
                    continue;
                }
            };

            let age = now.duration_since(modified).unwrap_or_default();

            if age >= max_age {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => purged += 1,
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => tracing::warn!("failed to purge {}: {}", path.display(), err),
                }
            }
        }

        if purged > 0 {
            tracing::info!("purged {} stale map documents", purged);
        }

        Ok(purged)
    }
}

// Matches `<uuid>.html` and leftover `<uuid>.html.tmp` files.
fn document_id(path: &Path) -> Option<Uuid> {
    let name = path.file_name()?.to_str()?;
    let stem = name
        .strip_suffix(".html.tmp")
        .or_else(|| name.strip_suffix(".html"))?;

    stem.parse().ok()
}

#[async_trait]
impl MapStore for FsMapStore {
    #[tracing::instrument(skip(self, document))]
    async fn save(&self, id: Uuid, document: String) -> Result<(), Error> {
        let path = self.path_for(id);
        let tmp = self.dir.join(format!("{}.html.tmp", id));

        let written = match tokio::fs::write(&tmp, document).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(err) => Err(err),
        };

        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    tracing::warn!("failed to remove {}: {}", tmp.display(), cleanup);
                }
            }

            return Err(render_error(err));
        }

        *self.latest.write().await = Some(id);

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, id: Uuid) -> Result<String, Error> {
        match tokio::fs::read_to_string(self.path_for(id)).await {
            Ok(document) => Ok(document),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found_error()),
            Err(err) => Err(unexpected_error(err)),
        }
    }

    async fn latest(&self) -> Option<Uuid> {
        *self.latest.read().await
    }
}

/// Periodically purges documents older than `retention`.
pub fn spawn_purge_task(store: Arc<FsMapStore>, retention: Duration) -> tokio::task::JoinHandle<()> {
    let period = (retention / 4).max(Duration::from_secs(60));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            if let Err(err) = store.purge_older_than(retention).await {
                tracing::warn!("map purge failed: {}", err);
            }
        }
    })
}

#[test]
fn saves_and_loads_documents() {
    use tokio_test::block_on;

    let dir = tempfile::tempdir().unwrap();
    let store = block_on(FsMapStore::new(dir.path())).unwrap();
    let id = Uuid::new_v4();

    assert_eq!(block_on(store.latest()), None);

    block_on(store.save(id, "<html></html>".into())).unwrap();

    assert_eq!(block_on(store.load(id)).unwrap(), "<html></html>");
    assert_eq!(block_on(store.latest()), Some(id));
    assert!(dir.path().join(format!("{}.html", id)).exists());
    assert!(!dir.path().join(format!("{}.html.tmp", id)).exists());
}

#[test]
fn unknown_documents_are_not_found() {
    use tokio_test::block_on;

    let dir = tempfile::tempdir().unwrap();
    let store = block_on(FsMapStore::new(dir.path())).unwrap();

    let err = block_on(store.load(Uuid::new_v4())).unwrap_err();
    assert_eq!(err.code, 104);
}

#[test]
fn documents_are_request_scoped() {
    use tokio_test::block_on;

    let dir = tempfile::tempdir().unwrap();
    let store = block_on(FsMapStore::new(dir.path())).unwrap();
    let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

    block_on(store.save(first, "first".into())).unwrap();
    block_on(store.save(second, "second".into())).unwrap();

    assert_eq!(block_on(store.load(first)).unwrap(), "first");
    assert_eq!(block_on(store.load(second)).unwrap(), "second");
    assert_eq!(block_on(store.latest()), Some(second));
}

#[test]
fn purge_removes_only_stale_documents() {
    use tokio_test::block_on;

    let dir = tempfile::tempdir().unwrap();
    let store = block_on(FsMapStore::new(dir.path())).unwrap();
    let id = Uuid::new_v4();

    block_on(store.save(id, "doc".into())).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();

    assert_eq!(
        block_on(store.purge_older_than(Duration::from_secs(3600))).unwrap(),
        0
    );
    assert!(block_on(store.load(id)).is_ok());

    assert_eq!(block_on(store.purge_older_than(Duration::ZERO)).unwrap(), 1);
    assert_eq!(block_on(store.load(id)).unwrap_err().code, 104);
    assert!(dir.path().join("notes.txt").exists());
}

#[test]
fn failed_save_leaves_no_temporary_file() {
    use tokio_test::block_on;

    let dir = tempfile::tempdir().unwrap();
    let store = block_on(FsMapStore::new(dir.path())).unwrap();
    let id = Uuid::new_v4();

    // a directory in the way makes the rename fail
    std::fs::create_dir(dir.path().join(format!("{}.html", id))).unwrap();

    let err = block_on(store.save(id, "doc".into())).unwrap_err();
    assert_eq!(err.code, 7);
    assert!(!dir.path().join(format!("{}.html.tmp", id)).exists());
    assert_eq!(block_on(store.latest()), None);
}

#[test]
fn purge_collects_leftover_temporary_files() {
    use tokio_test::block_on;

    let dir = tempfile::tempdir().unwrap();
    let store = block_on(FsMapStore::new(dir.path())).unwrap();
    let leftover = dir.path().join(format!("{}.html.tmp", Uuid::new_v4()));

    std::fs::write(&leftover, "<html>").unwrap();
    std::fs::write(dir.path().join("notes.html.tmp"), "keep").unwrap();

    assert_eq!(
        block_on(store.purge_older_than(Duration::from_secs(3600))).unwrap(),
        0
    );
    assert!(leftover.exists());

    assert_eq!(block_on(store.purge_older_than(Duration::ZERO)).unwrap(), 1);
    assert!(!leftover.exists());
    assert!(dir.path().join("notes.html.tmp").exists());
}
