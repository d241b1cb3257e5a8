use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use serde_json::json;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, StoreOptions};
use crate::image_list::ImageList;
use crate::retrieval::{RankedMatch, top_k};
use crate::store::VectorStore;
use crate::utils::{ensure_dir, ensure_file};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub store: StoreOptions,
    /// 返回的检索结果数量
    #[arg(short = 'k', long, value_name = "K", default_value_t = 10)]
    pub top_k: usize,
    /// 被搜索的图片 ID
    pub id: String,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        ensure_dir(&self.store.vlad_dir, "VLAD 缓存目录")?;
        ensure_file(&self.store.images, "图片列表文件")?;

        let list = ImageList::open(&self.store.images)?;
        let (store, _) = VectorStore::open(&list, &self.store.vlad_dir)?;

        let query = store.get(&self.id).ok_or_else(|| anyhow!("图片不存在: {}", self.id))?;
        let vector = query.vector().ok_or_else(|| anyhow!("图片没有可用的 VLAD 向量: {}", self.id))?;

        let result = top_k(vector, store.retrievable(), self.top_k, &query.id)?;
        print_result(&result, self.output_format)
    }
}

fn print_result(result: &[RankedMatch], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let result = result
                .iter()
                .map(|m| json!({"distance": m.distance, "id": m.entry.id, "path": m.entry.path}))
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&result)?)
        }
        OutputFormat::Table => {
            for m in result {
                println!("{:.4}\t{}\t{}", m.distance, m.entry.id, m.entry.path);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
