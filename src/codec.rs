use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

/// 文件头魔数，即小端序的 ASCII "VLAD"
pub const MAGIC: u32 = 0x44414C56;
/// 写入缓存文件时使用的版本号
pub const CURRENT_VERSION: u32 = 1;
/// 文件头长度：魔数 + 版本号 + 向量长度
pub const HEADER_SIZE: usize = 12;
/// VLAD 缓存文件的后缀名
pub const EXTENSION: &str = "isat_vlad";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid magic: {0:#010x}")]
    InvalidMagic(u32),

    #[error("truncated data: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: usize, actual: usize },

    #[error("trailing data: expected {expected} bytes, got {actual}")]
    TrailingData { expected: usize, actual: usize },
}

/// 解码后的一条 VLAD 向量记录
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    /// 文件头中的版本号，仅用于诊断
    pub version: u32,
    pub vector: Vec<f32>,
}

impl FeatureRecord {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { version: CURRENT_VERSION, vector }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// 解码一个 VLAD 缓存文件的全部字节
///
/// 布局：`magic: u32 | version: u32 | n: u32 | f32 * n`，均为小端序。
/// 未知的版本号不会被拒绝。
pub fn decode(bytes: &[u8]) -> Result<FeatureRecord, DecodeError> {
    let truncated = |expected| DecodeError::TruncatedData { expected, actual: bytes.len() };

    let mut rdr = Cursor::new(bytes);
    let magic = rdr.read_u32::<LittleEndian>().map_err(|_| truncated(HEADER_SIZE))?;
    if magic != MAGIC {
        return Err(DecodeError::InvalidMagic(magic));
    }
    let version = rdr.read_u32::<LittleEndian>().map_err(|_| truncated(HEADER_SIZE))?;
    let n = rdr.read_u32::<LittleEndian>().map_err(|_| truncated(HEADER_SIZE))? as usize;

    let expected = n.saturating_mul(4).saturating_add(HEADER_SIZE);
    if bytes.len() < expected {
        return Err(truncated(expected));
    }
    if bytes.len() > expected {
        return Err(DecodeError::TrailingData { expected, actual: bytes.len() });
    }

    let mut vector = vec![0f32; n];
    rdr.read_f32_into::<LittleEndian>(&mut vector).map_err(|_| truncated(expected))?;
    Ok(FeatureRecord { version, vector })
}

/// 将记录编码为缓存文件格式
pub fn encode(record: &FeatureRecord) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + record.vector.len() * 4);
    // 写入 Vec 不会失败
    write_record(&mut buf, record).expect("writing to Vec never fails");
    buf
}

/// 将向量写入缓存文件
pub fn write_file(path: impl AsRef<Path>, vector: &[f32]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_record(&mut writer, &FeatureRecord::new(vector.to_vec()))?;
    writer.flush()
}

fn write_record<W: Write>(writer: &mut W, record: &FeatureRecord) -> std::io::Result<()> {
    writer.write_u32::<LittleEndian>(MAGIC)?;
    writer.write_u32::<LittleEndian>(record.version)?;
    writer.write_u32::<LittleEndian>(record.vector.len() as u32)?;
    for &x in &record.vector {
        writer.write_f32::<LittleEndian>(x)?;
    }
    Ok(())
}

/// 返回某个图片 ID 对应的缓存文件名
pub fn cache_file_name(id: &str) -> String {
    format!("{id}.{EXTENSION}")
}
