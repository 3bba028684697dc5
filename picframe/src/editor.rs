//! Editor state: the loaded image, user settings and the export actions
//! built on top of the compositor and the palette extractor.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::image::{compose, decode, encode_data_uri, Bitmap, EncodedImage};
use crate::palette::{extract_palette, DEFAULT_COLOR_COUNT};
use crate::params::{BorderStyle, EffectParameters, OutputFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSettings {
    pub enabled: bool,
    pub width: u32,
    pub color: Color,
    pub style: BorderStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub enabled: bool,
    pub blur: u32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerSettings {
    pub enabled: bool,
    pub radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub format: OutputFormat,
    // 1-100
    pub quality: u8,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 20,
            color: Color::rgb(0x3b, 0x82, 0xf6),
            style: BorderStyle::Solid,
        }
    }
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            blur: 20,
            offset_x: 10,
            offset_y: 10,
            color: Color::rgba(0, 0, 0, 77),
        }
    }
}

impl Default for CornerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            radius: 16,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: 90,
        }
    }
}

/// Everything the user can adjust
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub border: BorderSettings,
    pub shadow: ShadowSettings,
    pub corner: CornerSettings,
    pub export: ExportSettings,
}

impl EditorSettings {
    /// Flatten into the parameters for one compose + encode call
    pub fn to_params(&self) -> EffectParameters {
        EffectParameters {
            border_width: if self.border.enabled {
                self.border.width
            } else {
                0
            },
            border_color: self.border.color,
            border_style: self.border.style,
            corner_radius: if self.corner.enabled {
                self.corner.radius
            } else {
                0
            },
            shadow_enabled: self.shadow.enabled,
            shadow_color: self.shadow.color,
            shadow_blur: self.shadow.blur,
            shadow_offset_x: self.shadow.offset_x,
            shadow_offset_y: self.shadow.offset_y,
            output_format: self.export.format,
            output_quality: self.export.quality,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid("settings", e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Size of the original file in bytes
    pub size: usize,
}

#[derive(Debug, Clone)]
struct LoadedImage {
    info: ImageInfo,
    bitmap: Bitmap,
}

#[derive(Debug, Default)]
pub struct Editor {
    image: Option<LoadedImage>,
    suggested_colors: Vec<Color>,
    pub settings: EditorSettings,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn image_info(&self) -> Option<&ImageInfo> {
        self.image.as_ref().map(|image| &image.info)
    }

    pub fn suggested_colors(&self) -> &[Color] {
        &self.suggested_colors
    }

    /// Decode `data` and make it the current image.
    ///
    /// On failure the previous image and suggestions are left in place.
    pub async fn load_image(&mut self, name: impl Into<String>, data: &[u8]) -> Result<&ImageInfo> {
        let bitmap = decode_async(data).await?;
        let info = ImageInfo {
            name: name.into(),
            width: bitmap.width(),
            height: bitmap.height(),
            size: data.len(),
        };
        log::info!(
            "loaded {} ({}x{}, {} bytes)",
            info.name,
            info.width,
            info.height,
            info.size
        );

        self.suggested_colors = extract_palette(&bitmap, DEFAULT_COLOR_COUNT);
        let loaded = self.image.insert(LoadedImage { info, bitmap });
        Ok(&loaded.info)
    }

    /// Back to the default settings; the loaded image stays
    pub fn reset_settings(&mut self) {
        self.settings = EditorSettings::default();
        self.suggested_colors.clear();
    }

    pub fn apply_color_to_border(&mut self, color: Color) {
        self.settings.border.color = color.with_alpha(255);
    }

    /// Take the color's RGB but keep the shadow's current transparency
    pub fn apply_color_to_shadow(&mut self, color: Color) {
        let alpha = self.settings.shadow.color.a;
        self.settings.shadow.color = color.with_alpha(alpha);
    }

    pub fn params(&self) -> EffectParameters {
        self.settings.to_params()
    }

    /// Composite the current image as a data URI, `None` when nothing is loaded
    pub async fn preview(&self) -> Result<Option<String>> {
        let Some(image) = &self.image else {
            return Ok(None);
        };

        let params = self.params();
        params.validate()?;
        let composed = compose(&image.bitmap, &params)?;
        encode_data_uri_async(&composed, params.output_format, params.output_quality)
            .await
            .map(Some)
    }

    /// Composite and encode the current image for saving, `None` when
    /// nothing is loaded
    pub async fn download(&self, file_name: Option<String>) -> Result<Option<EncodedImage>> {
        let Some(image) = &self.image else {
            return Ok(None);
        };

        let params = self.params();
        params.validate()?;
        let composed = compose(&image.bitmap, &params)?;
        encode_async(&composed, params, file_name).await.map(Some)
    }
}

// Suspend points around the codec boundary. Drawing in between is
// synchronous, so an encode always sees a fully composed canvas.

async fn decode_async(data: &[u8]) -> Result<Bitmap> {
    decode(data)
}

async fn encode_data_uri_async(img: &Bitmap, format: OutputFormat, quality: u8) -> Result<String> {
    encode_data_uri(img, format, quality)
}

async fn encode_async(
    img: &Bitmap,
    params: EffectParameters,
    file_name: Option<String>,
) -> Result<EncodedImage> {
    EncodedImage::new(img, params.output_format, params.output_quality, file_name)
}
