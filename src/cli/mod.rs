mod report;
mod search;
mod show;

pub use report::*;
pub use search::*;
pub use show::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> anyhow::Result<()>;
}
