//! Postcard rendering: one day's forecast drawn onto a template image.

use ab_glyph::{FontVec, PxScale};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;
use weathermaker_core::PostcardConfig;
use weathermaker_forecast::ForecastRecord;

const TEXT_X: i32 = 20;
/// Top edge of the first line. imageproc positions text by its top, so this puts the
/// first baseline near y = 30 at `TEXT_SCALE`.
const TEXT_TOP: i32 = 10;
const LINE_STEP: i32 = 50;
const TEXT_SCALE: f32 = 32.0;
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
/// Share of the gradient in the final pixel; the rest is the template
const GRADIENT_WEIGHT: f32 = 0.5;
const NEUTRAL_COLOR: [u8; 3] = [255, 255, 255];

#[derive(Debug, Error)]
pub enum PostcardError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font could not be loaded: {0}")]
    Font(String),

    #[error("Template not found: {}", .0.display())]
    NoTemplate(PathBuf),

    #[error("Invalid postcard name: {0:?}")]
    InvalidName(String),
}

impl PostcardError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PostcardError::Image(_) => "The postcard image could not be processed.",
            PostcardError::Io(_) => "The postcard file could not be written.",
            PostcardError::Font(_) => "The configured font could not be loaded.",
            PostcardError::NoTemplate(_) => "Postcard template is missing. Check postcard.template_path.",
            PostcardError::InvalidName(_) => "Postcard name must be a plain file name.",
        }
    }
}

/// Renders forecast postcards
pub struct PostcardComposer {
    template_path: PathBuf,
    icons_dir: PathBuf,
    output_dir: PathBuf,
    width_scale: f32,
    font: Option<FontVec>,
}

impl PostcardComposer {
    pub fn new(config: &PostcardConfig) -> Result<Self, PostcardError> {
        let font = match &config.font_path {
            Some(path) => {
                let bytes = std::fs::read(path)?;
                let font = FontVec::try_from_vec(bytes)
                    .map_err(|e| PostcardError::Font(format!("{}: {}", path.display(), e)))?;
                Some(font)
            }
            None => None,
        };

        Ok(Self {
            template_path: config.template_path.clone(),
            icons_dir: config.icons_dir.clone(),
            output_dir: config.output_dir.clone(),
            width_scale: config.width_scale,
            font,
        })
    }

    /// Build the postcard in memory
    pub fn compose(&self, record: &ForecastRecord) -> Result<RgbImage, PostcardError> {
        let mut canvas = self.load_template()?;

        let start = record
            .condition
            .category()
            .map(|c| c.gradient_color())
            .unwrap_or(NEUTRAL_COLOR);
        paint_gradient(&mut canvas, start);

        match &self.font {
            Some(font) => {
                let scale = PxScale::from(TEXT_SCALE);
                for (i, line) in record.postcard_lines().iter().enumerate() {
                    let y = TEXT_TOP + LINE_STEP * i as i32;
                    imageproc::drawing::draw_text_mut(
                        &mut canvas,
                        TEXT_COLOR,
                        TEXT_X,
                        y,
                        scale,
                        font,
                        line,
                    );
                }
            }
            None => tracing::warn!("No font configured, postcard will have no text"),
        }

        let condition = record.condition.to_string();
        if let Some(icon_path) = find_icon(&self.icons_dir, &condition)? {
            paste_bottom_right(&mut canvas, &icon_path)?;
        }

        Ok(canvas)
    }

    /// Render and write `<output_dir>/<name>.png`
    pub fn render_to_file(
        &self,
        record: &ForecastRecord,
        name: &str,
    ) -> Result<PathBuf, PostcardError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(PostcardError::InvalidName(name.to_string()));
        }

        let canvas = self.compose(record)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.png", name));
        canvas.save(&path)?;

        tracing::info!("Postcard for {} written to {}", record.date, path.display());
        Ok(path)
    }

    fn load_template(&self) -> Result<RgbImage, PostcardError> {
        if !self.template_path.is_file() {
            return Err(PostcardError::NoTemplate(self.template_path.clone()));
        }

        let template = image::open(&self.template_path)?.to_rgb8();
        let width = ((template.width() as f32) * self.width_scale).round().max(1.0) as u32;
        Ok(imageops::resize(&template, width, template.height(), FilterType::Triangle))
    }
}

/// Blend a left-to-right gradient from `start` (x = 0) toward white over the canvas
fn paint_gradient(canvas: &mut RgbImage, start: [u8; 3]) {
    let width = canvas.width() as f32;
    for (x, _, pixel) in canvas.enumerate_pixels_mut() {
        let t = x as f32 / width;
        for (channel, &from) in pixel.0.iter_mut().zip(start.iter()) {
            let from = from as f32;
            let shade = from + t * (255.0 - from);
            let mixed = shade * GRADIENT_WEIGHT + (*channel as f32) * (1.0 - GRADIENT_WEIGHT);
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// First icon (by file name) whose lowercase stem occurs in the lowercase condition
fn find_icon(icons_dir: &Path, condition: &str) -> Result<Option<PathBuf>, PostcardError> {
    if !icons_dir.is_dir() {
        tracing::warn!("Icons directory {} not found", icons_dir.display());
        return Ok(None);
    }

    let condition = condition.to_lowercase();
    let mut candidates = std::fs::read_dir(icons_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect::<Vec<_>>();
    candidates.sort();

    Ok(candidates.into_iter().find(|p| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .map(|stem| !stem.is_empty() && condition.contains(&stem.to_lowercase()))
            .unwrap_or(false)
    }))
}

fn paste_bottom_right(canvas: &mut RgbImage, icon_path: &Path) -> Result<(), PostcardError> {
    let icon = image::open(icon_path)?.to_rgb8();
    if icon.width() > canvas.width() || icon.height() > canvas.height() {
        tracing::warn!(
            "Icon {} ({}x{}) does not fit the postcard, skipping",
            icon_path.display(),
            icon.width(),
            icon.height()
        );
        return Ok(());
    }

    let x = i64::from(canvas.width() - icon.width());
    let y = i64::from(canvas.height() - icon.height());
    imageops::overlay(canvas, &icon, x, y);
    Ok(())
}
