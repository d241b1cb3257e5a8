use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::codec;
use crate::config::Opts;
use crate::distance::norm;

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// VLAD 缓存文件路径
    pub file: PathBuf,
}

impl SubCommandExtend for ShowCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let bytes = fs::read(&self.file)?;
        let record = codec::decode(&bytes)?;

        let (min, max) = record
            .vector
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));

        println!("file     : {}", self.file.display());
        println!("version  : {}", record.version);
        println!("dimension: {}", record.dimension());
        println!("norm     : {:.6}", norm(&record.vector));
        if record.dimension() > 0 {
            println!("min      : {:.6}", min);
            println!("max      : {:.6}", max);
        }
        Ok(())
    }
}
