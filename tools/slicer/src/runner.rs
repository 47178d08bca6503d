//! 程序运行函数.

use std::path::Path;
use std::time::Instant;

use image::{imageops, RgbImage};
use log::{info, warn};
use slice_berry::annotate::{crosshairs, draw_slice};
use slice_berry::consts::rgb::CROSSHAIR;
use slice_berry::geometry::SliceGeometry;
use slice_berry::legend::{alphabar, colorbar, AlphabarStyle, ColorbarStyle, Legend};
use slice_berry::save::to_rgb_image;
use slice_berry::{montage, SliceResult};
use utils::loader::LoadedLayers;
use utils::DisplayInterp;

use crate::result::RunReport;
use crate::Args;

/// 按 `scale` 放大图像.
fn upscale(img: RgbImage, scale: u32, interp: DisplayInterp) -> RgbImage {
    if scale <= 1 {
        return img;
    }
    imageops::resize(&img, img.width() * scale, img.height() * scale, interp.filter())
}

fn save(img: &RgbImage, path: &Path) -> SliceResult<()> {
    img.save(path)?;
    info!("已保存 {}", path.display());
    Ok(())
}

/// 实际运行.
pub fn run(args: &Args) -> SliceResult<RunReport> {
    let common = &args.common;
    let mut report = RunReport::default();

    let timer = Instant::now();
    let loaded = LoadedLayers::load(common)?;
    let options = common.to_options()?;
    let window = common.window_for(&loaded.base)?;
    report.stage("load", timer.elapsed());

    let timer = Instant::now();
    let layers = loaded.layers();
    let bbox = loaded.base.bounding_box();
    let img = match args.slices {
        Some(count) => {
            if common.wants_contours() {
                warn!("拼图模式不绘制等值线");
            }
            let positions = montage::positions(&loaded.base, args.axis, count);
            let geoms =
                montage::geometries(&loaded.base, args.axis, &positions, common.samples, common.orient);
            let slices = montage::par_overlay_slices(&geoms, &options, window, &layers)?;
            to_rgb_image(montage::tile(&slices, args.cols).view())?
        }
        None => {
            let position = args
                .position
                .unwrap_or_else(|| loaded.base.center_of_mass()[args.axis.index()]);
            info!("沿 {} 轴在 {position:.2} 处切片", args.axis);
            let geom =
                SliceGeometry::axis_aligned(&bbox, args.axis, position, common.samples, common.orient);

            let contour = match (common.wants_contours(), loaded.contour_volume()) {
                (true, Some(vol)) => Some(common.contour_spec(vol)?),
                (true, None) => {
                    warn!("未给出等值线图像或透明度图层, 跳过等值线");
                    None
                }
                (false, _) => None,
            };
            let rendered = draw_slice(&geom, &options, window, &layers, contour.as_ref())?;

            let cross = args.crosshairs.as_deref().and_then(|p| match p {
                [x, y, z] => Some((crosshairs([*x, *y, *z], args.axis, common.orient), CROSSHAIR)),
                _ => None,
            });
            rendered.to_rgb_image(cross)?
        }
    };
    let img = upscale(img, args.scale, common.interp);
    report.stage("render", timer.elapsed());

    let timer = Instant::now();
    save(&img, &args.output)?;
    let kind = if args.slices.is_some() { "montage" } else { "slice" };
    report.output(kind, args.output.clone(), img.dimensions());

    if let Some(path) = &args.colorbar {
        if let Some(legend) = legend(args, &loaded)? {
            let bar = legend.to_rgb_image()?;
            save(&bar, path)?;
            report.output("legend", path.clone(), bar.dimensions());
        }
    }
    report.stage("save", timer.elapsed());

    Ok(report)
}

/// 图例: 有透明度图层时为二维色条, 否则有伪彩色图层时为一维色条.
fn legend(args: &Args, loaded: &LoadedLayers) -> SliceResult<Option<Legend>> {
    let common = &args.common;
    let clims = common.color_limits()?;
    if loaded.alpha.is_some() {
        let style = AlphabarStyle {
            alines: if common.wants_contours() {
                common.contour.iter().map(|l| f64::from(*l)).collect()
            } else {
                Vec::new()
            },
            ..AlphabarStyle::default()
        };
        alphabar(
            &common.color_map,
            clims,
            &common.color_label,
            common.alpha_limits()?,
            &common.alpha_label,
            &style,
        )
        .map(Some)
    } else if loaded.color.is_some() {
        colorbar(&common.color_map, clims, &common.color_label, &ColorbarStyle::default()).map(Some)
    } else {
        warn!("没有伪彩色图层, 不输出图例");
        Ok(None)
    }
}
