//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d, Point3};

pub use crate::data::{Affine, BoundingBox, Limits, Volume, Window};
pub use crate::{SliceError, SliceResult};

pub use crate::geometry::{Axis3, Orientation, SliceGeometry};
pub use crate::sample::{center_of_mass, sample_point, sample_point_with, Boundary};

pub use crate::color::colormap::{self, Colormap};
pub use crate::color::{blend, colorize, mask, scale_clip, RgbField, ScalarField};

pub use crate::compose::{overlay_slice, ColorMaskPolicy, Layers, Options};

pub use crate::annotate::{
    crosshairs, draw_slice, parse_color, ContourSpec, Crosshair, LineStyle, RenderedSlice,
};
pub use crate::legend::{alphabar, colorbar, AlphabarStyle, ColorbarStyle, Legend, LegendOrient};

pub use crate::save::ImgWriteVis;
