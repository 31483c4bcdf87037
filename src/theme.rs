//! JSON theme files.
//!
//! ```json
//! {
//!   "textures": {
//!     "button": { "path": "button.png", "border": { "top": 4, "right": 4, "bottom": 4, "left": 4 }, "fill": true }
//!   },
//!   "styles": {
//!     "base":   { "normal": { "color": "#e0e0e0" } },
//!     "button": {
//!       "inherits": "base",
//!       "normal": { "background-color": "#303030", "border-image": "url(button)" },
//!       "hover":  { "border-color": "#ffffffcc", "font": "font(1)" }
//!     }
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::style::{BorderWidths, DrawState, PropertyValue, Style, TextureDefinition};
use crate::utils::Color;
use log::debug;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Deserialize)]
struct ThemeFile {
    #[serde(default)]
    textures: HashMap<String, TextureSpec>,
    #[serde(default)]
    styles: HashMap<String, StyleSpec>,
}

#[derive(Debug, Deserialize)]
struct TextureSpec {
    path: PathBuf,
    #[serde(default)]
    border: BorderWidths,
    #[serde(default)]
    fill: bool,
    #[serde(default = "default_scale")]
    scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

type PropertyMap = HashMap<String, String>;

#[derive(Debug, Default, Deserialize)]
struct StyleSpec {
    inherits: Option<String>,
    #[serde(default)]
    normal: PropertyMap,
    #[serde(default)]
    focus: PropertyMap,
    #[serde(default)]
    hover: PropertyMap,
    #[serde(default)]
    active: PropertyMap,
}

impl StyleSpec {
    fn states(&self) -> [(DrawState, &PropertyMap); 4] {
        [
            (DrawState::Normal, &self.normal),
            (DrawState::Focus, &self.focus),
            (DrawState::Hover, &self.hover),
            (DrawState::Active, &self.active),
        ]
    }
}

/// A set of named, resolved styles.
#[derive(Debug, Default)]
pub struct Theme {
    styles: HashMap<String, Rc<Style>>,
    textures: HashMap<String, Rc<TextureDefinition>>,
}

impl Theme {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&json, base_dir)
    }

    /// Parses a theme; texture paths are resolved against `base_dir`.
    pub fn from_json_str(json: &str, base_dir: &Path) -> Result<Self> {
        let file: ThemeFile = serde_json::from_str(json)?;

        let mut textures = HashMap::new();
        for (name, spec) in &file.textures {
            let path = base_dir.join(&spec.path);
            debug!("loading theme texture {:?} from {}", name, path.display());
            let def = TextureDefinition::load(&path, spec.border, spec.fill, spec.scale)?;
            textures.insert(name.clone(), Rc::new(def));
        }

        let mut theme = Theme {
            styles: HashMap::new(),
            textures,
        };

        let mut names: Vec<&String> = file.styles.keys().collect();
        names.sort();
        for name in names {
            let mut visiting = HashSet::new();
            theme.build_style(name, &file.styles, &mut visiting)?;
        }

        debug!(
            "theme loaded: {} styles, {} textures",
            theme.styles.len(),
            theme.textures.len()
        );
        Ok(theme)
    }

    fn build_style(
        &mut self,
        name: &str,
        specs: &HashMap<String, StyleSpec>,
        visiting: &mut HashSet<String>,
    ) -> Result<Rc<Style>> {
        if let Some(style) = self.styles.get(name) {
            return Ok(style.clone());
        }
        if !visiting.insert(name.to_string()) {
            return Err(Error::InheritanceCycle(name.to_string()));
        }

        let spec = &specs[name];
        let mut style = match &spec.inherits {
            Some(parent) => {
                if !specs.contains_key(parent) {
                    return Err(Error::UnknownReference {
                        style: name.to_string(),
                        kind: "style",
                        name: parent.clone(),
                    });
                }
                let parent = self.build_style(parent, specs, visiting)?;
                Style::with_parent(name, parent)
            }
            None => Style::new(name),
        };

        for (state, props) in spec.states() {
            for (property, value) in props {
                let value = self.parse_value(name, property, value)?;
                style.set(state, property.clone(), value);
            }
        }

        let style = Rc::new(style);
        self.styles.insert(name.to_string(), style.clone());
        Ok(style)
    }

    fn parse_value(&self, style: &str, property: &str, raw: &str) -> Result<PropertyValue> {
        let invalid = || Error::InvalidValue {
            style: style.to_string(),
            property: property.to_string(),
            value: raw.to_string(),
        };
        let raw = raw.trim();

        if raw.starts_with('#') {
            return raw
                .parse::<Color>()
                .map(PropertyValue::Color)
                .map_err(|_| invalid());
        }

        if let Some(name) = call_argument(raw, "url") {
            return self
                .textures
                .get(name)
                .cloned()
                .map(PropertyValue::Texture)
                .ok_or_else(|| Error::UnknownReference {
                    style: style.to_string(),
                    kind: "texture",
                    name: name.to_string(),
                });
        }

        if let Some(slot) = call_argument(raw, "font") {
            return slot
                .parse::<usize>()
                .map(PropertyValue::Font)
                .map_err(|_| invalid());
        }

        Err(invalid())
    }

    pub fn style(&self, name: &str) -> Option<Rc<Style>> {
        self.styles.get(name).cloned()
    }

    pub fn texture(&self, name: &str) -> Option<Rc<TextureDefinition>> {
        self.textures.get(name).cloned()
    }
}

/// `func(arg)` -> `arg`, with surrounding whitespace and quotes removed.
fn call_argument<'a>(raw: &'a str, func: &str) -> Option<&'a str> {
    let inner = raw
        .strip_prefix(func)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')?
        .trim();
    Some(inner.trim_matches(|c| c == '"' || c == '\''))
}
