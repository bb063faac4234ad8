//! 临时存储 - 基础设施层
//!
//! 每个请求独占一个工作目录，上传内容分块写入其中，请求结束时无条件删除。

use crate::config::Config;
use crate::error::StorageError;
use crate::models::UploadJob;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};

/// 校验时读取的字节数
const VALIDATION_HEADER_BYTES: usize = 1024;

/// 请求级工作目录
///
/// 由创建它的请求独占。显式调用 [`release`](Self::release) 删除目录；
/// 如果请求在中途提前返回或 panic，`Drop` 会补做同样的清理。
#[derive(Debug)]
pub struct WorkingArea {
    path: PathBuf,
    released: bool,
}

impl WorkingArea {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 删除整个目录树，错误只记录不上抛
    pub fn release(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => info!("🗑️ 已删除临时目录: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("临时目录已不存在: {}", self.path.display());
            }
            Err(e) => warn!("⚠️ 清理临时目录失败 (不影响结果) {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for WorkingArea {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// 已写入工作目录的视频
#[derive(Debug, Clone)]
pub struct MaterializedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// 临时存储管理器
#[derive(Debug, Clone)]
pub struct StorageManager {
    work_root: PathBuf,
    prefix: String,
    fallback_dir: PathBuf,
    max_upload_bytes: u64,
    chunk_size: usize,
}

impl StorageManager {
    pub fn new(config: &Config) -> Self {
        Self {
            work_root: config.work_root.clone(),
            prefix: config.work_dir_prefix.clone(),
            fallback_dir: config.fallback_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            chunk_size: config.upload_chunk_size.max(1),
        }
    }

    /// 创建新的工作目录
    ///
    /// 不会失败：创建失败时退回到当前工作目录下的固定兜底目录，
    /// 仍在其中为本请求单独建一个子目录。
    pub fn acquire(&self) -> WorkingArea {
        let name = format!("{}{}", self.prefix, uuid::Uuid::new_v4().simple());
        let path = self.work_root.join(&name);

        match std::fs::create_dir_all(&path) {
            Ok(()) => {
                info!("📁 已创建临时目录: {}", path.display());
                WorkingArea {
                    path,
                    released: false,
                }
            }
            Err(e) => {
                error!("创建临时目录失败 {}: {}", path.display(), e);
                let fallback = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(&self.fallback_dir)
                    .join(&name);
                if let Err(e) = std::fs::create_dir_all(&fallback) {
                    error!("创建兜底目录失败 {}: {}", fallback.display(), e);
                }
                warn!("⚠️ 使用兜底目录: {}", fallback.display());
                WorkingArea {
                    path: fallback,
                    released: false,
                }
            }
        }
    }

    /// 把上传内容分块写入工作目录
    ///
    /// 累计字节数一旦超过上限立即中止。已写入的部分留在目录中，由释放工作目录时一并删除。
    pub async fn materialize(
        &self,
        area: &WorkingArea,
        job: &mut UploadJob,
        file_name: &str,
    ) -> Result<MaterializedFile, StorageError> {
        let target = area.path().join(file_name);
        let mut file = fs::File::create(&target)
            .await
            .map_err(|e| StorageError::io(&target, e))?;

        let mut buffer = vec![0u8; self.chunk_size];
        let mut written: u64 = 0;

        loop {
            let read = job
                .reader()
                .read(&mut buffer)
                .await
                .map_err(|e| StorageError::io(&target, e))?;
            if read == 0 {
                break;
            }

            written += read as u64;
            if written > self.max_upload_bytes {
                warn!(
                    "⚠️ 上传文件超过上限 {} 字节，已中止写入: {}",
                    self.max_upload_bytes,
                    target.display()
                );
                return Err(StorageError::SizeLimitExceeded {
                    limit: self.max_upload_bytes,
                });
            }

            file.write_all(&buffer[..read])
                .await
                .map_err(|e| StorageError::io(&target, e))?;
        }

        file.flush().await.map_err(|e| StorageError::io(&target, e))?;

        info!("✓ 视频已保存: {} ({} 字节)", target.display(), written);

        Ok(MaterializedFile {
            path: target,
            size: written,
        })
    }
}

/// 校验视频文件：存在、非空、前 1KB 可读
pub async fn validate_video_file(path: &Path) -> bool {
    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(_) => {
            error!("文件不存在: {}", path.display());
            return false;
        }
    };

    if metadata.len() == 0 {
        error!("文件为空: {}", path.display());
        return false;
    }

    let mut header = [0u8; VALIDATION_HEADER_BYTES];
    let readable = match fs::File::open(path).await {
        Ok(mut file) => file.read(&mut header).await.is_ok(),
        Err(_) => false,
    };

    if readable {
        debug!("视频文件校验通过: {} ({} 字节)", path.display(), metadata.len());
    } else {
        error!("视频文件不可读: {}", path.display());
    }
    readable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(root: &Path) -> Config {
        Config {
            work_root: root.to_path_buf(),
            ..Config::default()
        }
    }

    fn test_root() -> PathBuf {
        let root = std::env::temp_dir().join(format!("storage_test_{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    #[tokio::test]
    async fn acquire_creates_unique_directories() {
        let root = test_root();
        let storage = StorageManager::new(&test_config(&root));

        let first = storage.acquire();
        let second = storage.acquire();

        assert!(first.path().is_dir());
        assert!(second.path().is_dir());
        assert_ne!(first.path(), second.path());

        let first_path = first.path().to_path_buf();
        first.release();
        assert!(!first_path.exists());

        drop(second);
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn acquire_falls_back_when_root_is_unusable() {
        let root = test_root();
        let blocker = root.join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let fallback = root.join("fallback_area");
        let config = Config {
            work_root: blocker.clone(),
            fallback_dir: fallback.clone(),
            ..Config::default()
        };
        let storage = StorageManager::new(&config);
        let area = storage.acquire();

        assert_eq!(area.path().parent(), Some(fallback.as_path()));
        assert!(area.path().is_dir());
        let area_path = area.path().to_path_buf();
        area.release();
        assert!(!area_path.exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn concurrent_fallback_areas_stay_isolated() {
        let root = test_root();
        let blocker = root.join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();

        let config = Config {
            work_root: blocker,
            fallback_dir: root.join("fallback_area"),
            ..Config::default()
        };
        let storage = StorageManager::new(&config);
        let first = storage.acquire();
        let second = storage.acquire();
        assert_ne!(first.path(), second.path());

        let mut job = UploadJob::from_bytes("clip.mp4", b"clip-2".to_vec());
        let file = storage.materialize(&second, &mut job, "video_2.mp4").await.unwrap();

        first.release();
        assert!(file.path.exists());
        assert!(validate_video_file(&file.path).await);

        let second_path = second.path().to_path_buf();
        second.release();
        assert!(!second_path.exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn materialize_writes_all_chunks() {
        let root = test_root();
        let config = Config {
            upload_chunk_size: 7,
            ..test_config(&root)
        };
        let storage = StorageManager::new(&config);
        let area = storage.acquire();

        let payload: Vec<u8> = (0..100u8).collect();
        let mut job = UploadJob::from_bytes("clip.mp4", payload.clone());
        let file = storage.materialize(&area, &mut job, "video_0.mp4").await.unwrap();

        assert_eq!(file.size, 100);
        assert_eq!(std::fs::read(&file.path).unwrap(), payload);
        assert!(validate_video_file(&file.path).await);

        area.release();
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn materialize_aborts_past_size_limit() {
        let root = test_root();
        let config = Config {
            max_upload_bytes: 16,
            upload_chunk_size: 8,
            ..test_config(&root)
        };
        let storage = StorageManager::new(&config);
        let area = storage.acquire();

        let mut job = UploadJob::from_bytes("big.mp4", vec![1u8; 40]);
        let err = storage.materialize(&area, &mut job, "big.mp4").await.unwrap_err();
        assert!(matches!(err, StorageError::SizeLimitExceeded { limit: 16 }));

        // 部分写入的内容留给调用方清理
        let partial = area.path().join("big.mp4");
        assert_eq!(std::fs::metadata(&partial).unwrap().len(), 16);

        let area_path = area.path().to_path_buf();
        area.release();
        assert!(!area_path.exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn validation_rejects_missing_and_empty_files() {
        let root = test_root();
        let empty = root.join("empty.mp4");
        std::fs::write(&empty, b"").unwrap();

        assert!(!validate_video_file(&root.join("missing.mp4")).await);
        assert!(!validate_video_file(&empty).await);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn release_is_idempotent_when_directory_vanished() {
        let root = test_root();
        let storage = StorageManager::new(&test_config(&root));
        let area = storage.acquire();
        std::fs::remove_dir_all(area.path()).unwrap();
        area.release();
        std::fs::remove_dir_all(&root).unwrap();
    }
}
