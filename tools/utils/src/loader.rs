//! 按命令行选项加载参与合成的体数据.

use std::path::Path;

use log::info;
use slice_berry::compose::Layers;
use slice_berry::{SliceResult, Volume};

use crate::CommonOptions;

/// 已加载的各图层. 缺省的图层为 `None`.
#[derive(Debug)]
pub struct LoadedLayers {
    /// 底图.
    pub base: Volume,
    /// 整体遮罩.
    pub mask: Option<Volume>,
    /// 伪彩色图层.
    pub color: Option<Volume>,
    /// 伪彩色遮罩.
    pub color_mask: Option<Volume>,
    /// 透明度图层.
    pub alpha: Option<Volume>,
    /// 等值线图像.
    pub contour: Option<Volume>,
}

fn open(path: &Path, what: &str) -> SliceResult<Volume> {
    let vol = Volume::open(path)?;
    info!("加载{what} {} (形状 {:?})", path.display(), vol.shape());
    Ok(vol)
}

fn open_optional(path: Option<&Path>, what: &str) -> SliceResult<Option<Volume>> {
    path.map(|p| open(p, what)).transpose()
}

impl LoadedLayers {
    /// 加载 `opts` 中给出的所有图像.
    pub fn load(opts: &CommonOptions) -> SliceResult<Self> {
        Ok(Self {
            base: open(&opts.base_image, "底图")?,
            mask: open_optional(opts.mask.as_deref(), "遮罩")?,
            color: open_optional(opts.color.as_deref(), "伪彩色图层")?,
            color_mask: open_optional(opts.color_mask.as_deref(), "伪彩色遮罩")?,
            alpha: open_optional(opts.alpha.as_deref(), "透明度图层")?,
            contour: open_optional(opts.contour_img.as_deref(), "等值线图像")?,
        })
    }

    /// 借用为合成图层.
    pub fn layers(&self) -> Layers<'_> {
        Layers::new(&self.base)
            .with_mask(self.mask.as_ref())
            .with_color(self.color.as_ref())
            .with_color_mask(self.color_mask.as_ref())
            .with_alpha(self.alpha.as_ref())
    }

    /// 提取等值线的体数据: 等值线图像, 缺省时为透明度图层.
    #[inline]
    pub fn contour_volume(&self) -> Option<&Volume> {
        self.contour.as_ref().or(self.alpha.as_ref())
    }
}
