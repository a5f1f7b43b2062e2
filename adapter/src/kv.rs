use shared::error::AppResult;
use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::RwLock;

/// プロセス内のキー・バリューストア。
///
/// 値はメモリに持ち、ファイルパスが指定されていれば `set` のたびに全体を
/// JSON オブジェクトとして書き出す（一時ファイルに書いてから rename）。
/// 書き出しに失敗した場合はメモリ上の値も更新しない。
#[derive(Clone)]
pub struct KvStore {
    path: Option<Arc<PathBuf>>,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl KvStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "Opened key-value store");
        Ok(Self {
            path: Some(Arc::new(path)),
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        if let Some(path) = &self.path {
            let mut next = entries.clone();
            next.insert(key.to_string(), value.clone());
            persist(path, &next).await?;
        }
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

async fn persist(path: &Path, entries: &BTreeMap<String, String>) -> AppResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let bytes = serde_json::to_vec_pretty(entries)?;
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
