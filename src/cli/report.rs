use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{Opts, RetrievalOptions, StoreOptions};
use crate::image_list::ImageList;
use crate::report::ReportFormat;
use crate::session::RetrievalSession;
use crate::store::VectorStore;
use crate::utils::{ensure_dir, ensure_file, pb_style};

#[derive(Parser, Debug, Clone)]
pub struct ReportCommand {
    #[command(flatten)]
    pub store: StoreOptions,
    #[command(flatten)]
    pub retrieval: RetrievalOptions,
    /// 输出报告路径
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    /// 报告格式
    #[arg(long, value_enum, default_value_t = ReportFormat::Html)]
    pub format: ReportFormat,
}

impl SubCommandExtend for ReportCommand {
    fn run(&self, opts: &Opts) -> Result<()> {
        ensure_dir(&self.store.vlad_dir, "VLAD 缓存目录")?;
        ensure_file(&self.store.images, "图片列表文件")?;

        let list = ImageList::open(&self.store.images)?;
        let (store, stats) = VectorStore::open(&list, &self.store.vlad_dir)?;
        info!(
            "加载完成：{} 个可用，{} 个缺失，{} 个解码失败，{} 个维度不一致，{} 个重复",
            stats.loaded, stats.missing, stats.decode_failed, stats.dimension_mismatch, stats.duplicate
        );

        let pb = if opts.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::no_length().with_style(pb_style())
        };

        let start = Instant::now();
        let results = RetrievalSession::new(&store, self.retrieval.top_k)
            .max_queries(self.retrieval.max_queries)
            .threads(self.retrieval.threads)
            .observer(&pb)
            .run_all()?;
        info!("检索耗时 {:.2}s", start.elapsed().as_secs_f32());

        let report = self.format.render(&results, self.retrieval.top_k)?;
        fs::write(&self.output, report)?;

        let output = fs::canonicalize(&self.output).unwrap_or_else(|_| self.output.clone());
        info!("报告已生成：file://{}", output.display());
        Ok(())
    }
}
