//! 附件模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BomError, Result};

/// 允許上傳的 MIME 類型
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "application/rtf",
    "application/zip",
    "application/x-zip-compressed",
];

/// 單檔上傳大小上限（100 MiB）
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// 附件類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// 圖片
    Image,
    /// 文件
    Document,
}

impl FileKind {
    /// 依 MIME 類型判斷附件類型
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            FileKind::Image
        } else {
            FileKind::Document
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Document => "document",
        }
    }
}

/// 附件所屬對象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileOwner {
    Material(i64),
    Product(i64),
}

/// 附件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// 附件ID
    pub id: i64,

    /// 顯示名稱（原始檔名）
    pub name: String,

    /// 儲存路徑
    pub path: String,

    /// MIME 類型
    pub mime_type: String,

    /// 附件類型
    pub kind: FileKind,

    /// 是否為主圖
    pub is_profile_picture: bool,
}

impl File {
    /// 創建新的附件，附件類型由 MIME 類型推得
    pub fn new(
        id: i64,
        name: impl Into<String>,
        path: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        let mime_type = mime_type.into();
        Self {
            id,
            name: name.into(),
            path: path.into(),
            kind: FileKind::from_mime(&mime_type),
            mime_type,
            is_profile_picture: false,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == FileKind::Image
    }
}

/// 檢查 MIME 類型是否允許上傳
pub fn is_allowed_mime(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// 驗證待上傳的檔案
pub fn validate_upload(mime_type: &str, size_bytes: u64) -> Result<()> {
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(BomError::IncorrectValue(format!(
            "檔案過大: {} KiB，上限 {} KiB",
            size_bytes / 1024,
            MAX_UPLOAD_BYTES / 1024
        )));
    }
    if !is_allowed_mime(mime_type) {
        return Err(BomError::IncorrectValue(format!(
            "不允許的檔案類型: {}",
            mime_type
        )));
    }
    Ok(())
}

/// 產生唯一的儲存檔名（保留原始副檔名，無副檔名時使用 `.bin`）
pub fn unique_storage_name(original_name: &str) -> String {
    let ext = std::path::Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("bin");
    format!("{}.{}", Uuid::new_v4().simple(), ext)
}

/// 某個物料或產品的附件集合
///
/// 同一所屬對象最多只有一個主圖。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachments {
    pub owner: FileOwner,
    pub files: Vec<File>,
}

impl Attachments {
    pub fn new(owner: FileOwner) -> Self {
        Self {
            owner,
            files: Vec::new(),
        }
    }

    /// 附加檔案（同一附件ID只附加一次）
    pub fn attach(&mut self, mut file: File) -> bool {
        if self.files.iter().any(|f| f.id == file.id) {
            return false;
        }
        if file.is_profile_picture && self.profile_picture().is_some() {
            file.is_profile_picture = false;
        }
        self.files.push(file);
        true
    }

    /// 移除附件
    pub fn detach(&mut self, file_id: i64) -> Option<File> {
        let index = self.files.iter().position(|f| f.id == file_id)?;
        Some(self.files.remove(index))
    }

    /// 設置主圖，原主圖標記會被清除
    pub fn set_profile_picture(&mut self, file_id: i64) -> Result<()> {
        if !self.files.iter().any(|f| f.id == file_id) {
            return Err(BomError::NotFound(format!("附件 {}", file_id)));
        }
        for file in &mut self.files {
            file.is_profile_picture = file.id == file_id;
        }
        Ok(())
    }

    /// 清除主圖
    pub fn clear_profile_picture(&mut self) {
        for file in &mut self.files {
            file.is_profile_picture = false;
        }
    }

    /// 取得主圖
    pub fn profile_picture(&self) -> Option<&File> {
        self.files.iter().find(|f| f.is_profile_picture)
    }

    /// 所有圖片附件
    pub fn images(&self) -> impl Iterator<Item = &File> {
        self.files.iter().filter(|f| f.is_image())
    }
}
