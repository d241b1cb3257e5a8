use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::*;

#[derive(Parser, Debug, Clone)]
pub struct StoreOptions {
    /// VLAD 缓存文件目录，包含 `<id>.isat_vlad` 文件
    #[arg(long, value_name = "DIR")]
    pub vlad_dir: PathBuf,
    /// 图片列表 JSON 文件，格式为 {"images": [{"id": ..., "path": ...}]}
    #[arg(long, value_name = "FILE")]
    pub images: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct RetrievalOptions {
    /// 每个查询返回的检索结果数量
    #[arg(short = 'k', long, value_name = "K", default_value_t = 10)]
    pub top_k: usize,
    /// 处理的最大查询图像数量，用于快速预览，不填或为 0 则处理全部
    #[arg(long, value_name = "N")]
    pub max_queries: Option<usize>,
    /// 检索线程数，为 0 时使用全部 CPU
    #[arg(short = 'j', long, value_name = "N", default_value_t = 1)]
    pub threads: usize,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vladeval", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 不显示进度条
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 对每张图片检索 top-k 相似图片，生成可视化报告
    Report(ReportCommand),
    /// 检索单张图片的 top-k 相似图片
    Search(SearchCommand),
    /// 显示 VLAD 缓存文件的信息
    Show(ShowCommand),
}
