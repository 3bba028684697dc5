use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use std::str::FromStr;

use crate::color::Color;
use crate::error::{Error, Result};

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, EnumCount, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Double,
}

impl BorderStyle {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
            BorderStyle::Double => "double",
        }
    }
}

#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, EnumCount, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    WebP,
}

impl OutputFormat {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// Whether the quality setting affects the encoded output
    pub fn is_lossy(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }
}

#[derive(Debug)]
pub struct ParseError {
    kind: &'static str,
    value: String,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseError {}

impl TryFrom<&str> for BorderStyle {
    type Error = ParseError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "solid" => Ok(BorderStyle::Solid),
            "dashed" => Ok(BorderStyle::Dashed),
            "double" => Ok(BorderStyle::Double),
            _ => Err(ParseError {
                kind: "border style",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for BorderStyle {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = ParseError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(ParseError {
                kind: "output format",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Everything the compositor and encoder need for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParameters {
    pub border_width: u32,
    pub border_color: Color,
    pub border_style: BorderStyle,
    pub corner_radius: u32,
    pub shadow_enabled: bool,
    pub shadow_color: Color,
    pub shadow_blur: u32,
    pub shadow_offset_x: i32,
    pub shadow_offset_y: i32,
    pub output_format: OutputFormat,
    // 1-100, ignored for png
    pub output_quality: u8,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            border_width: 0,
            border_color: Color::BLACK,
            border_style: BorderStyle::Solid,
            corner_radius: 0,
            shadow_enabled: false,
            shadow_color: Color::rgba(0, 0, 0, 77),
            shadow_blur: 10,
            shadow_offset_x: 5,
            shadow_offset_y: 5,
            output_format: OutputFormat::Png,
            output_quality: 90,
        }
    }
}

impl EffectParameters {
    /// Margin reserved around the content box so the shadow never clips
    pub fn shadow_padding(&self) -> u32 {
        if !self.shadow_enabled {
            return 0;
        }

        self.shadow_blur
            .max(self.shadow_offset_x.unsigned_abs())
            .max(self.shadow_offset_y.unsigned_abs())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.output_quality) {
            return Err(Error::invalid(
                "output_quality",
                format!("{} is outside 1-100", self.output_quality),
            ));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| Error::invalid("parameters", e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_padding_takes_the_largest_extent() {
        let mut params = EffectParameters {
            shadow_enabled: true,
            shadow_blur: 20,
            shadow_offset_x: 10,
            shadow_offset_y: 10,
            ..Default::default()
        };
        assert_eq!(params.shadow_padding(), 20);

        params.shadow_offset_y = -35;
        assert_eq!(params.shadow_padding(), 35);

        params.shadow_enabled = false;
        assert_eq!(params.shadow_padding(), 0);
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::try_from("JPG").unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::WebP.mime(), "image/webp");
        assert!("gif".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::iter().count(), OutputFormat::COUNT);

        for style in BorderStyle::iter() {
            assert_eq!(style.as_str().parse::<BorderStyle>().unwrap(), style);
        }
    }

    #[test]
    fn json_presets_fill_in_defaults() {
        let params = EffectParameters::from_json(
            r##"{ "border_width": 12, "border_color": "#3b82f6", "output_format": "jpg" }"##,
        )
        .unwrap();

        assert_eq!(params.border_width, 12);
        assert_eq!(params.border_color, Color::rgb(0x3b, 0x82, 0xf6));
        assert_eq!(params.output_format, OutputFormat::Jpeg);
        assert_eq!(params.shadow_color, Color::rgba(0, 0, 0, 77));

        let back = EffectParameters::from_json(&params.to_json()).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn quality_must_be_in_range() {
        let err = EffectParameters::from_json(r#"{ "output_quality": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert!(EffectParameters::from_json("not json").is_err());
    }
}
