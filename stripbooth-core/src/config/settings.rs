use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{assets::color::ColorDef, compose::print::PrintLayout};

/// Current schema version written into every settings record.
pub const CONFIG_VERSION: u32 = 1;

/// Default strip background.
pub const DEFAULT_STRIP_BACKGROUND: &str = "#388046";
/// Default artifact filename prefix.
pub const DEFAULT_FILENAME_PREFIX: &str = "photobooth";

/// Camera adjustments applied identically at preview and capture time.
///
/// Values are trusted as given; no bounds are enforced here. Practical domains are zoom
/// `0.5..=3.0`, brightness/contrast/saturation `0..=200` (100 neutral), crop `-50..=50`
/// percent of the native frame, rotation `-180..=180` degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisualAdjustments {
    /// Record schema version.
    pub version: u32,
    /// Multiplicative zoom.
    pub zoom: f64,
    /// Brightness percentage.
    pub brightness: f64,
    /// Contrast percentage.
    pub contrast: f64,
    /// Saturation percentage.
    pub saturation: f64,
    /// Horizontal crop offset, percent of native width.
    pub crop_x: f64,
    /// Vertical crop offset, percent of native height.
    pub crop_y: f64,
    /// Rotation in degrees about the photo centre.
    pub rotation: f64,
    /// Optional camera device selector passed through to the camera provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Default for VisualAdjustments {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            zoom: 1.0,
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            crop_x: 0.0,
            crop_y: 0.0,
            rotation: 0.0,
            device_id: None,
        }
    }
}

/// Application-level settings consumed by the compositor and the print path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    /// Record schema version.
    pub version: u32,
    /// Prefix for artifact filenames.
    pub filename_prefix: String,
    /// Destination folder; empty means "use the download fallback".
    pub save_folder_path: String,
    /// Strip background colour string.
    pub strip_background_color: String,
    /// Branding graphic (PNG/JPEG/SVG); empty means "no graphic, draw the text fallback".
    pub branding_image_path: String,
    /// Branding width as a fraction of the strip width.
    pub branding_scale: f64,
    /// First line of the text fallback.
    pub branding_title: String,
    /// Second line of the text fallback.
    pub branding_subtitle: String,
    /// Print artifact layout.
    pub print_layout: PrintLayout,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_owned(),
            save_folder_path: String::new(),
            strip_background_color: DEFAULT_STRIP_BACKGROUND.to_owned(),
            branding_image_path: String::new(),
            branding_scale: 0.9,
            branding_title: "PHOTOBOOTH".to_owned(),
            branding_subtitle: "Thanks for stopping by".to_owned(),
            print_layout: PrintLayout::Single,
        }
    }
}

impl AppSettings {
    /// Parsed strip background; an unparsable value falls back to the default green.
    pub fn background(&self) -> ColorDef {
        match ColorDef::parse(&self.strip_background_color) {
            Ok(c) => c,
            Err(err) => {
                tracing::warn!(
                    value = %self.strip_background_color,
                    %err,
                    "invalid strip background colour, using default"
                );
                default_background()
            }
        }
    }

    /// Destination folder, if one is configured.
    pub fn save_folder(&self) -> Option<&std::path::Path> {
        let trimmed = self.save_folder_path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(std::path::Path::new(trimmed))
        }
    }
}

// #388046
fn default_background() -> ColorDef {
    ColorDef::rgba(56.0 / 255.0, 128.0 / 255.0, 70.0 / 255.0, 1.0)
}

/// Overlay `stored` onto `defaults`.
///
/// Precedence: a stored value wins per field, recursively for nested objects; fields missing
/// from `stored` keep their default. A non-object `stored` value replaces nothing.
pub fn merge_json(defaults: serde_json::Value, stored: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match (defaults, stored) {
        (Value::Object(mut base), Value::Object(over)) => {
            for (key, value) in over {
                // `null` means "unset": keep whatever the default was.
                if value.is_null() {
                    continue;
                }
                let merged = match base.remove(&key) {
                    Some(existing @ Value::Object(_)) => merge_json(existing, value),
                    Some(_) | None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (base, _) => base,
    }
}

/// Merge a stored record over a record's defaults and deserialize the result.
///
/// Unknown keys are ignored. If the merged record still fails to deserialize (for example a
/// field has the wrong type), the defaults are returned and a warning is logged.
pub fn merge_with_defaults<T>(defaults: T, stored: serde_json::Value) -> T
where
    T: Serialize + DeserializeOwned,
{
    let base = match serde_json::to_value(&defaults) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(%err, "failed to serialize settings defaults");
            return defaults;
        }
    };
    match serde_json::from_value(merge_json(base, stored)) {
        Ok(merged) => merged,
        Err(err) => {
            tracing::warn!(%err, "stored settings record is invalid, using defaults");
            defaults
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/settings.rs"]
mod tests;
