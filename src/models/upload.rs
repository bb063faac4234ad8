use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tokio::io::AsyncRead;

/// 一次视频提交
///
/// 持有上传内容的字节流；写入工作目录后由所属请求负责清理。
pub struct UploadJob {
    /// 客户端声明的文件名
    pub filename: Option<String>,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadJob {
    /// 从任意异步字节流创建
    pub fn new(filename: Option<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            filename,
            reader: Box::new(reader),
        }
    }

    /// 从内存字节创建
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(Some(filename.into()), Cursor::new(bytes))
    }

    /// 从本地文件创建（流式读取，不整体载入内存）
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        Ok(Self::new(filename, file))
    }

    /// 字节流
    pub fn reader(&mut self) -> &mut (dyn AsyncRead + Send + Unpin) {
        self.reader.as_mut()
    }

    /// 声明的文件名，缺失时使用给定的默认值
    pub fn display_name(&self, default: impl FnOnce() -> String) -> String {
        self.filename
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(default)
    }
}

impl fmt::Debug for UploadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadJob")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}
