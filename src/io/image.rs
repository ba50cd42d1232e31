//! Layer compositing and PNG export

use crate::io::error::{GeneratorError, Result, WithPath};
use crate::layers::blending::{BlendMode, BlendRules};
use crate::layers::layer_set::LayerSet;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Draws a token's render sequence onto a square canvas
#[derive(Clone, Copy, Debug)]
pub struct Compositor<'a> {
    blending: &'a BlendRules,
    size: u32,
}

impl<'a> Compositor<'a> {
    /// Compositor producing `size` x `size` images
    pub const fn new(blending: &'a BlendRules, size: u32) -> Self {
        Self { blending, size }
    }

    /// Edge length of produced images
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Composite every renderable layer, bottom first
    ///
    /// # Errors
    ///
    /// Returns an error if a layer asset cannot be loaded
    pub fn render(&self, layers: &LayerSet) -> Result<RgbaImage> {
        let mut canvas = RgbaImage::new(self.size, self.size);

        for layer in layers.render_sequence() {
            let Some(path) = layer.file.as_deref() else {
                continue;
            };
            let mode = self.blending.mode_for(&layer.canonical_name);
            debug!(layer = layer.canonical_name.as_str(), ?mode, "compositing layer");

            let source = self.load_layer(path)?;
            draw_layer(&mut canvas, &source, mode);
        }

        Ok(canvas)
    }

    /// Composite and save as PNG, creating the parent directory
    ///
    /// # Errors
    ///
    /// Returns an error if a layer cannot be loaded, the directory cannot be
    /// created, or the image cannot be saved
    pub fn render_to(&self, layers: &LayerSet, output_path: &Path) -> Result<()> {
        let canvas = self.render(layers)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
        }

        canvas
            .save(output_path)
            .map_err(|source| GeneratorError::ImageExport {
                path: output_path.to_path_buf(),
                source,
            })
    }

    fn load_layer(&self, path: &Path) -> Result<RgbaImage> {
        let image = image::open(path)
            .map_err(|source| GeneratorError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        if image.width() == self.size && image.height() == self.size {
            Ok(image)
        } else {
            debug!(
                path = %path.display(),
                width = image.width(),
                height = image.height(),
                "resizing layer"
            );
            Ok(imageops::resize(
                &image,
                self.size,
                self.size,
                FilterType::Lanczos3,
            ))
        }
    }
}

fn draw_layer(canvas: &mut RgbaImage, source: &RgbaImage, mode: BlendMode) {
    for (backdrop, layer) in canvas.pixels_mut().zip(source.pixels()) {
        *backdrop = blend_pixel(*backdrop, *layer, mode);
    }
}

/// Composite one straight-alpha pixel over another
///
/// The blend result is weighted by the backdrop's coverage, so a blend mode
/// over a transparent backdrop behaves like plain source-over.
pub fn blend_pixel(backdrop: Rgba<u8>, source: Rgba<u8>, mode: BlendMode) -> Rgba<u8> {
    let [br, bg, bb, ba] = backdrop.0;
    let [sr, sg, sb, sa] = source.0;

    let alpha_b = unit(ba);
    let alpha_s = unit(sa);
    let alpha_out = alpha_b.mul_add(1.0 - alpha_s, alpha_s);

    if alpha_out <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |cb: u8, cs: u8| {
        let cb = unit(cb);
        let cs = unit(cs);
        let mixed = (1.0 - alpha_b).mul_add(cs, alpha_b * mode.blend(cb, cs));
        let out = alpha_s.mul_add(mixed, alpha_b * cb * (1.0 - alpha_s)) / alpha_out;
        byte(out)
    };

    Rgba([
        channel(br, sr),
        channel(bg, sg),
        channel(bb, sb),
        byte(alpha_out),
    ])
}

fn unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

fn byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
