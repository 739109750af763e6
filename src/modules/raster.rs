use eframe::egui;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub fn blank(width: u32, height: u32) -> RgbaImage {
    ImageBuffer::from_pixel(width.max(1), height.max(1), BACKGROUND)
}

/// Largest size with the source aspect ratio that fits inside the cell. No cropping.
pub fn fit_within(src_w: u32, src_h: u32, cell_w: u32, cell_h: u32) -> (u32, u32) {
    let (cell_w, cell_h) = (cell_w.max(1), cell_h.max(1));
    if src_w == 0 || src_h == 0 { return (cell_w, cell_h); }

    let img_ratio: f64 = src_w as f64 / src_h as f64;
    let target_ratio: f64 = cell_w as f64 / cell_h as f64;
    if img_ratio > target_ratio {
        (cell_w, ((cell_w as f64 / img_ratio) as u32).clamp(1, cell_h))
    } else {
        (((cell_h as f64 * img_ratio) as u32).clamp(1, cell_w), cell_h)
    }
}

pub fn scale_to_fit(img: &RgbaImage, cell_w: u32, cell_h: u32) -> RgbaImage {
    let (w, h) = fit_within(img.width(), img.height(), cell_w, cell_h);
    imageops::resize(img, w, h, FilterType::Lanczos3)
}

pub fn resize_exact(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(img, width.max(1), height.max(1), FilterType::Lanczos3)
}

pub fn to_color_image(img: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied([img.width() as usize, img.height() as usize], img.as_raw())
}

/// A static preview raster plus its lazily uploaded texture.
pub struct Thumbnail {
    image: RgbaImage,
    texture: Option<egui::TextureHandle>,
}

impl Thumbnail {
    pub fn new(image: RgbaImage) -> Self { Self { image, texture: None } }

    pub fn image(&self) -> &RgbaImage { &self.image }
    pub fn size(&self) -> egui::Vec2 { egui::vec2(self.image.width() as f32, self.image.height() as f32) }

    pub fn texture_id(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let image: &RgbaImage = &self.image;
        self.texture
            .get_or_insert_with(|| ctx.load_texture("storyboard_thumbnail", to_color_image(image), egui::TextureOptions::LINEAR))
            .id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_fits_inside_small_cell() {
        let (w, h) = fit_within(1920, 1080, 150, 85);
        assert!(w <= 150 && h <= 85);
        assert_eq!((w, h), (150, 84));
        let src_ratio = 1920.0 / 1080.0;
        assert!((w as f64 / h as f64 - src_ratio).abs() < 0.02);
    }

    #[test]
    fn tall_images_are_limited_by_height() {
        assert_eq!(fit_within(100, 400, 150, 85), (21, 85));
    }

    #[test]
    fn degenerate_sizes_do_not_divide_by_zero() {
        assert_eq!(fit_within(0, 10, 150, 85), (150, 85));
        assert_eq!(fit_within(10, 10, 0, 0), (1, 1));
        assert_eq!(fit_within(10_000, 1, 150, 85), (150, 1));
    }

    #[test]
    fn scale_to_fit_resamples_whole_image() {
        let src: RgbaImage = ImageBuffer::from_pixel(1920, 1080, Rgba([10, 20, 30, 255]));
        let thumb: RgbaImage = scale_to_fit(&src, 150, 85);
        assert_eq!(thumb.dimensions(), (150, 84));
        assert_eq!(thumb.get_pixel(75, 42).0, [10, 20, 30, 255]);
    }

    #[test]
    fn blank_is_opaque_white() {
        let img: RgbaImage = blank(4, 3);
        assert_eq!(img.dimensions(), (4, 3));
        assert!(img.pixels().all(|p| *p == BACKGROUND));
    }
}
