//! 切片合成工具: 在底图上叠加伪彩色与透明度图层, 输出单张切片或多切片拼图.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use slice_berry::geometry::Axis3;
use utils::{at_least_one, CommonOptions};

mod result;
mod runner;

/// 命令行参数.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(flatten)]
    pub common: CommonOptions,

    /// 切片法向: x, y 或 z.
    #[arg(long, default_value = "z")]
    pub axis: Axis3,

    /// 切片的物理位置. 缺省为底图质心.
    #[arg(long, allow_negative_numbers = true)]
    pub position: Option<f64>,

    /// 多切片拼图的切片数. 给出时输出拼图.
    #[arg(long, value_parser = at_least_one())]
    pub slices: Option<usize>,

    /// 拼图的列数.
    #[arg(long, default_value_t = 4, value_parser = at_least_one())]
    pub cols: usize,

    /// 输出图像的放大倍数.
    #[arg(long, default_value_t = 1)]
    pub scale: u32,

    /// 在该物理点处绘制十字准线 (单切片).
    #[arg(long, num_args = 3, allow_negative_numbers = true)]
    pub crosshairs: Option<Vec<f64>>,

    /// 图例输出路径.
    #[arg(long)]
    pub colorbar: Option<PathBuf>,

    /// 输出路径.
    #[arg(long, short, default_value = "slice.png")]
    pub output: PathBuf,
}

fn main() -> ExitCode {
    if let Err(e) = simple_logger::init_with_env() {
        eprintln!("日志初始化失败: {e}");
    }

    let args = Args::parse();
    match runner::run(&args) {
        Ok(report) => {
            report.analyze();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
