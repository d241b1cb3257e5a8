use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info, warn};

use crate::codec::{self, FeatureRecord};
use crate::error::{Result, RetrievalError};
use crate::image_list::ImageList;

/// 待加载的一项：图片 ID、图片路径以及缓存文件的内容（文件不存在时为 None）
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub id: String,
    pub path: String,
    pub bytes: Option<Vec<u8>>,
}

/// 图片及其 VLAD 向量
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub id: String,
    pub path: String,
    /// 解码失败或缓存文件不存在时为 None，此时图片不参与检索
    pub record: Option<FeatureRecord>,
}

impl ImageEntry {
    pub fn vector(&self) -> Option<&[f32]> {
        self.record.as_ref().map(|r| r.vector.as_slice())
    }
}

/// 加载统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// 输入的图片总数
    pub total: usize,
    /// 成功加载向量的图片数
    pub loaded: usize,
    /// 缓存文件不存在
    pub missing: usize,
    /// 缓存文件解码失败
    pub decode_failed: usize,
    /// 向量维度与其他图片不一致
    pub dimension_mismatch: usize,
    /// 重复的图片 ID
    pub duplicate: usize,
}

impl LoadStats {
    pub fn skipped(&self) -> usize {
        self.missing + self.decode_failed + self.dimension_mismatch + self.duplicate
    }
}

/// 只读的向量库，加载完成后不再修改
#[derive(Debug)]
pub struct VectorStore {
    entries: Vec<ImageEntry>,
    index: HashMap<String, usize>,
    dimension: usize,
}

impl VectorStore {
    /// 从若干待加载项构建向量库
    ///
    /// 单项失败只会被记录并跳过；输入为空或没有任何可用向量时返回 `NoUsableData`。
    /// 第一条成功解码的向量决定整个库的维度。
    pub fn load(sources: impl IntoIterator<Item = SourceEntry>) -> Result<(Self, LoadStats)> {
        let mut stats = LoadStats::default();
        let mut entries = vec![];
        let mut index = HashMap::new();
        let mut dimension = None;

        for src in sources {
            stats.total += 1;

            if index.contains_key(&src.id) {
                warn!("重复的图片 ID: {}", src.id);
                stats.duplicate += 1;
                continue;
            }

            let record = match src.bytes {
                None => {
                    warn!("VLAD 缓存文件不存在: {}", src.id);
                    stats.missing += 1;
                    None
                }
                Some(bytes) => match codec::decode(&bytes) {
                    Err(e) => {
                        warn!("VLAD 缓存文件解码失败: {}: {}", src.id, e);
                        stats.decode_failed += 1;
                        None
                    }
                    Ok(record) => match dimension {
                        Some(d) if d != record.dimension() => {
                            warn!(
                                "VLAD 向量维度不一致: {}: 期望 {}，实际 {}",
                                src.id,
                                d,
                                record.dimension()
                            );
                            stats.dimension_mismatch += 1;
                            None
                        }
                        _ => {
                            dimension = Some(record.dimension());
                            stats.loaded += 1;
                            Some(record)
                        }
                    },
                },
            };

            index.insert(src.id.clone(), entries.len());
            entries.push(ImageEntry { id: src.id, path: src.path, record });
        }

        if stats.total == 0 {
            return Err(RetrievalError::NoUsableData("image list is empty"));
        }
        let Some(dimension) = dimension else {
            return Err(RetrievalError::NoUsableData("no valid VLAD vector loaded"));
        };

        info!("成功加载 {}/{} 个 VLAD 向量，维度 {}", stats.loaded, stats.total, dimension);
        Ok((Self { entries, index, dimension }, stats))
    }

    /// 按图片列表从缓存目录中读取 `<id>.isat_vlad` 并构建向量库
    pub fn open(list: &ImageList, vlad_dir: impl AsRef<Path>) -> Result<(Self, LoadStats)> {
        let vlad_dir = vlad_dir.as_ref();
        let sources = list.images.iter().map(|img| {
            let file = vlad_dir.join(codec::cache_file_name(&img.id));
            let bytes = match fs::read(&file) {
                Ok(bytes) => Some(bytes),
                Err(e) if e.kind() == ErrorKind::NotFound => None,
                Err(e) => {
                    warn!("读取失败 {}: {}", file.display(), e);
                    None
                }
            };
            debug!("读取 {}", file.display());
            SourceEntry { id: img.id.clone(), path: img.path.clone(), bytes }
        });
        Self::load(sources)
    }

    /// 所有图片，按输入顺序
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// 所有拥有向量、可以参与检索的图片，按输入顺序
    pub fn retrievable(&self) -> impl Iterator<Item = &ImageEntry> + Clone {
        self.entries.iter().filter(|e| e.record.is_some())
    }

    pub fn get(&self, id: &str) -> Option<&ImageEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
