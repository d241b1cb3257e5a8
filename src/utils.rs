use std::path::Path;

use anyhow::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};

use crate::session::Progress;
use crate::store::ImageEntry;

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
    )
    .expect("failed to build progress style")
    .progress_chars("#>-")
}

impl Progress for ProgressBar {
    fn start(&self, total: usize) {
        self.set_length(total as u64);
    }

    fn advance(&self, query: &ImageEntry) {
        self.set_message(query.id.clone());
        self.inc(1);
    }

    fn finish(&self) {
        self.finish_with_message("检索完成");
    }
}

/// 检查目录是否存在
pub fn ensure_dir(path: &Path, what: &str) -> Result<()> {
    if !path.is_dir() {
        bail!("{what}不存在: {}", path.display());
    }
    Ok(())
}

/// 检查文件是否存在
pub fn ensure_file(path: &Path, what: &str) -> Result<()> {
    if !path.is_file() {
        bail!("{what}不存在: {}", path.display());
    }
    Ok(())
}
