use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// 图片列表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedImage {
    pub id: String,
    pub path: String,
}

/// 图片列表，即 `images.json` 的内容
#[derive(Debug, Clone, Default)]
pub struct ImageList {
    pub images: Vec<ListedImage>,
}

#[derive(Deserialize)]
struct RawImageList {
    #[serde(default)]
    images: Vec<RawImage>,
}

#[derive(Deserialize)]
struct RawImage {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    path: Value,
}

impl ImageList {
    /// 从 JSON 文件中读取图片列表
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let list = Self::parse(&text)?;
        info!("从 {} 读取了 {} 张图片", path.display(), list.len());
        Ok(list)
    }

    /// 解析 `{"images": [{"id": ..., "path": ...}]}`
    ///
    /// 数字类型的 id 会被转换为字符串，id 或 path 为空的项会被跳过
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawImageList = serde_json::from_str(text)?;
        let images = raw
            .images
            .into_iter()
            .filter_map(|img| {
                let id = value_to_string(img.id);
                let path = value_to_string(img.path);
                if id.is_empty() || path.is_empty() {
                    debug!("跳过不完整的图片项: id={id:?}, path={path:?}");
                    return None;
                }
                Some(ListedImage { id, path })
            })
            .collect();
        Ok(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

fn value_to_string(v: Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s,
        v => v.to_string(),
    }
}
