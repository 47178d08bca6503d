//! 运行结果.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

/// 一个输出文件.
#[derive(Debug)]
pub struct Output {
    /// 内容, 如 "切片", "拼图", "图例".
    pub kind: &'static str,
    /// 路径.
    pub path: PathBuf,
    /// 像素尺寸 `(宽, 高)`.
    pub size: (u32, u32),
}

/// 将 `o` 的描述写进 `w` 中.
fn describe_into<W: Write>(o: &Output, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Output `{}`:", o.kind)?;
    writeln!(w, "{S4}Path: {}", o.path.display())?;
    write!(w, "{S4}Size: {} x {}", o.size.0, o.size.1)?;
    Ok(())
}

/// 一次运行的全部输出和各阶段耗时.
#[derive(Debug, Default)]
pub struct RunReport {
    outputs: Vec<Output>,
    stages: Vec<(&'static str, Duration)>,
}

impl RunReport {
    /// 记录一个阶段的耗时.
    pub fn stage(&mut self, name: &'static str, elapsed: Duration) {
        self.stages.push((name, elapsed));
    }

    /// 记录一个输出文件.
    pub fn output(&mut self, kind: &'static str, path: PathBuf, size: (u32, u32)) {
        self.outputs.push(Output { kind, path, size });
    }

    /// 输出文件.
    #[inline]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// 总耗时.
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|(_, d)| *d).sum()
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(256);

        for o in self.outputs.iter() {
            describe_into(o, &mut buf).unwrap();
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();
            utils::sep();
        }
        for (name, d) in self.stages.iter() {
            println!("{name}: {} us", d.as_micros());
        }
        println!("Total: {} us", self.total().as_micros());
        utils::sep();
    }
}
