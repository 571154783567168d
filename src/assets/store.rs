//! Asset registry keyed by alias.
//!
//! The store wraps an [`AssetLoader`] (the rendering engine's loader in a
//! real app) and remembers what was loaded under which alias. Typed getters
//! fail with a lookup error naming the missing key.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, ShellError};

/// What a descriptor points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Json,
    Atlas,
    BitmapFont,
    Texture,
    Spine,
}

/// One resource to load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub alias: String,
    pub src: String,
    pub kind: AssetKind,
}

impl AssetDescriptor {
    pub fn new(alias: impl Into<String>, src: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            alias: alias.into(),
            src: src.into(),
            kind,
        }
    }

    /// A texture loaded from a URL.
    pub fn texture(alias: impl Into<String>, src: impl Into<String>) -> Self {
        Self::new(alias, src, AssetKind::Texture)
    }
}

/// Rectangle of a texture inside its source image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "h")]
    pub height: f64,
}

/// Named frames packed into one texture.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Atlas {
    frames: FxHashMap<String, Frame>,
}

#[derive(Deserialize)]
struct SheetJson {
    frames: FxHashMap<String, SheetFrame>,
}

#[derive(Deserialize)]
struct SheetFrame {
    frame: Frame,
}

impl Atlas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse sprite-sheet JSON (`{"frames": {"name": {"frame": {x, y, w, h}}}}`).
    pub fn from_sheet_json(json: &str) -> Result<Self> {
        let sheet: SheetJson = serde_json::from_str(json)?;
        Ok(Self {
            frames: sheet.frames.into_iter().map(|(k, v)| (k, v.frame)).collect(),
        })
    }

    /// Add a frame (builder pattern).
    #[must_use]
    pub fn with_frame(mut self, name: impl Into<String>, frame: Frame) -> Self {
        self.frames.insert(name.into(), frame);
        self
    }

    #[must_use]
    pub fn frame(&self, name: &str) -> Option<&Frame> {
        self.frames.get(name)
    }

    /// Frame names, sorted.
    #[must_use]
    pub fn frame_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.frames.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Aliases that make up one skeletal-animation asset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpineAsset {
    pub atlas: String,
    pub skeleton: String,
    pub scale: f64,
}

/// A loaded resource.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    Json(serde_json::Value),
    Atlas(Atlas),
    BitmapFont { face: String },
    Texture { width: f64, height: f64 },
    SpineAtlas(String),
}

/// Source of resources (the rendering engine's loader).
pub trait AssetLoader {
    fn load(&self, descriptor: &AssetDescriptor) -> Result<Resource>;
}

/// Loader serving resources registered ahead of time, keyed by `src`.
#[derive(Default)]
pub struct MemoryAssetLoader {
    resources: RefCell<FxHashMap<String, Resource>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryAssetLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `resource` available at `src` (builder pattern).
    #[must_use]
    pub fn with(self, src: impl Into<String>, resource: Resource) -> Self {
        self.insert(src, resource);
        self
    }

    pub fn insert(&self, src: impl Into<String>, resource: Resource) {
        self.resources.borrow_mut().insert(src.into(), resource);
    }

    /// Every `src` requested so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load(&self, descriptor: &AssetDescriptor) -> Result<Resource> {
        self.requests.borrow_mut().push(descriptor.src.clone());
        self.resources
            .borrow()
            .get(&descriptor.src)
            .cloned()
            .ok_or_else(|| ShellError::Load {
                src: descriptor.src.clone(),
                message: "not found".into(),
            })
    }
}

impl<L: AssetLoader + ?Sized> AssetLoader for Rc<L> {
    fn load(&self, descriptor: &AssetDescriptor) -> Result<Resource> {
        (**self).load(descriptor)
    }
}

/// Loaded resources by alias.
///
/// All methods take `&self`; the store is shared by every component of an
/// app.
pub struct AssetStore {
    loader: Box<dyn AssetLoader>,
    resources: RefCell<FxHashMap<String, Rc<Resource>>>,
    spine: RefCell<FxHashMap<String, SpineAsset>>,
    texture_scale: Cell<f64>,
}

impl AssetStore {
    /// Create a store. `texture_scale` is the default `@{scale}x` suffix.
    pub fn new(loader: Box<dyn AssetLoader>, texture_scale: f64) -> Self {
        Self {
            loader,
            resources: RefCell::new(FxHashMap::default()),
            spine: RefCell::new(FxHashMap::default()),
            texture_scale: Cell::new(texture_scale),
        }
    }

    /// Default scale suffix for atlases, fonts and spine atlases.
    #[must_use]
    pub fn texture_scale(&self) -> f64 {
        self.texture_scale.get()
    }

    pub fn set_texture_scale(&self, scale: f64) {
        self.texture_scale.set(scale);
    }

    /// Load a descriptor and register it under its alias.
    pub fn load(&self, descriptor: &AssetDescriptor) -> Result<Rc<Resource>> {
        let resource = Rc::new(self.loader.load(descriptor)?);
        debug!("loaded asset \"{}\" from {}", descriptor.alias, descriptor.src);
        self.resources
            .borrow_mut()
            .insert(descriptor.alias.clone(), Rc::clone(&resource));
        Ok(resource)
    }

    /// Load several descriptors, stopping at the first failure.
    pub fn load_all(&self, descriptors: &[AssetDescriptor]) -> Result<()> {
        for descriptor in descriptors {
            self.load(descriptor)?;
        }
        Ok(())
    }

    /// Load `"{path}@{scale}x.json"` as an atlas aliased `path`.
    pub fn add_atlas(&self, path: &str, scale: Option<f64>) -> Result<()> {
        let src = format!("{path}@{}x.json", scale.unwrap_or_else(|| self.texture_scale()));
        self.load(&AssetDescriptor::new(path, src, AssetKind::Atlas))?;
        Ok(())
    }

    /// Load `"{path}@{scale}x.fnt"` as a bitmap font aliased `path`.
    pub fn add_bitmap_font(&self, path: &str, scale: Option<f64>) -> Result<()> {
        let src = format!("{path}@{}x.fnt", scale.unwrap_or_else(|| self.texture_scale()));
        self.load(&AssetDescriptor::new(path, src, AssetKind::BitmapFont))?;
        Ok(())
    }

    /// Load a JSON document from `url` under `name`.
    pub fn add_json(&self, name: &str, url: &str) -> Result<()> {
        self.load(&AssetDescriptor::new(name, url, AssetKind::Json))?;
        Ok(())
    }

    /// Load a skeletal-animation asset: `"{path}@{scale}x.atlas"` and
    /// `"{path}.json"`, aliased `"{path}-atlas"` and `"{path}-data"`.
    pub fn add_spine(&self, path: &str, scale: Option<f64>) -> Result<()> {
        let scale = scale.unwrap_or_else(|| self.texture_scale());
        let atlas = format!("{path}-atlas");
        let skeleton = format!("{path}-data");

        self.load_all(&[
            AssetDescriptor::new(&skeleton, format!("{path}.json"), AssetKind::Json),
            AssetDescriptor::new(&atlas, format!("{path}@{scale}x.atlas"), AssetKind::Spine),
        ])?;

        self.spine.borrow_mut().insert(
            path.to_string(),
            SpineAsset {
                atlas,
                skeleton,
                scale: 1.0,
            },
        );
        Ok(())
    }

    /// Any resource by alias.
    pub fn get(&self, alias: &str) -> Result<Rc<Resource>> {
        self.resources
            .borrow()
            .get(alias)
            .cloned()
            .ok_or_else(|| ShellError::MissingAsset(alias.to_string()))
    }

    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.resources.borrow().contains_key(alias)
    }

    /// The atlas registered as `path`.
    pub fn get_atlas(&self, path: &str) -> Result<Rc<Resource>> {
        match self.resources.borrow().get(path) {
            Some(resource) if matches!(**resource, Resource::Atlas(_)) => Ok(Rc::clone(resource)),
            _ => Err(ShellError::MissingAtlas(path.to_string())),
        }
    }

    /// A frame inside the atlas registered as `path`.
    pub fn get_frame(&self, path: &str, frame: &str) -> Result<Frame> {
        let resource = self.get_atlas(path)?;
        match &*resource {
            Resource::Atlas(atlas) => atlas.frame(frame).copied(),
            _ => None,
        }
        .ok_or_else(|| ShellError::MissingFrame {
            atlas: path.to_string(),
            frame: frame.to_string(),
        })
    }

    pub fn get_spine(&self, path: &str) -> Result<SpineAsset> {
        self.spine
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| ShellError::MissingSpine(path.to_string()))
    }

    pub fn get_json(&self, name: &str) -> Result<serde_json::Value> {
        match self.resources.borrow().get(name).map(|r| &**r) {
            Some(Resource::Json(value)) => Ok(value.clone()),
            _ => Err(ShellError::MissingJson(name.to_string())),
        }
    }

    /// Forget an alias. Returns false if it was not registered.
    pub fn unload(&self, alias: &str) -> bool {
        let removed = self.resources.borrow_mut().remove(alias).is_some();
        let spine = self.spine.borrow_mut().remove(alias);
        if let Some(spine) = &spine {
            let mut resources = self.resources.borrow_mut();
            resources.remove(&spine.atlas);
            resources.remove(&spine.skeleton);
        }
        if removed || spine.is_some() {
            debug!("unloaded asset \"{alias}\"");
        }
        removed || spine.is_some()
    }

    /// Forget several aliases. Returns how many were registered.
    pub fn unload_many<S: AsRef<str>>(&self, aliases: &[S]) -> usize {
        aliases.iter().filter(|a| self.unload(a.as_ref())).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStore")
            .field("resources", &self.len())
            .field("texture_scale", &self.texture_scale())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards_atlas() -> Resource {
        Resource::Atlas(Atlas::new().with_frame(
            "ace",
            Frame {
                x: 0.0,
                y: 0.0,
                width: 16.0,
                height: 24.0,
            },
        ))
    }

    fn store(loader: MemoryAssetLoader) -> AssetStore {
        AssetStore::new(Box::new(loader), 2.0)
    }

    #[test]
    fn test_add_atlas_uses_scale_suffix() {
        let loader =
            Rc::new(MemoryAssetLoader::new().with("textures/cards@1x.json", cards_atlas()));
        let store = AssetStore::new(Box::new(Rc::clone(&loader)), 2.0);

        store.add_atlas("textures/cards", Some(1.0)).unwrap();
        assert!(store.get_atlas("textures/cards").is_ok());
        assert_eq!(store.get_frame("textures/cards", "ace").unwrap().height, 24.0);

        assert!(store.add_atlas("textures/cards", None).is_err());
        assert_eq!(
            loader.requests(),
            vec!["textures/cards@1x.json", "textures/cards@2x.json"]
        );
    }

    #[test]
    fn test_lookup_errors_name_the_key() {
        let store = store(MemoryAssetLoader::new().with("a@2x.json", cards_atlas()));
        store.add_atlas("a", None).unwrap();

        assert_eq!(
            store.get_frame("a", "king").unwrap_err(),
            ShellError::MissingFrame {
                atlas: "a".into(),
                frame: "king".into()
            }
        );
        assert_eq!(store.get_atlas("b").unwrap_err(), ShellError::MissingAtlas("b".into()));
        assert_eq!(store.get_json("a").unwrap_err(), ShellError::MissingJson("a".into()));
        assert_eq!(store.get("zzz").unwrap_err(), ShellError::MissingAsset("zzz".into()));
        assert_eq!(store.get_spine("s").unwrap_err(), ShellError::MissingSpine("s".into()));
    }

    #[test]
    fn test_json_and_unload() {
        let config = Resource::Json(serde_json::json!({"a": 1}));
        let loader = MemoryAssetLoader::new().with("data/config.json", config);
        let store = store(loader);

        store.add_json("config", "data/config.json").unwrap();
        assert_eq!(store.get_json("config").unwrap()["a"], 1);

        assert!(store.unload("config"));
        assert!(!store.unload("config"));
        assert!(store.get_json("config").is_err());
    }

    #[test]
    fn test_spine_registers_both_parts() {
        let loader = MemoryAssetLoader::new()
            .with("spine/hero.json", Resource::Json(serde_json::json!({})))
            .with("spine/hero@2x.atlas", Resource::SpineAtlas("hero.png".into()));
        let store = store(loader);

        store.add_spine("spine/hero", None).unwrap();
        let spine = store.get_spine("spine/hero").unwrap();
        assert_eq!(spine.atlas, "spine/hero-atlas");
        assert_eq!(spine.skeleton, "spine/hero-data");
        assert!(store.contains("spine/hero-atlas"));

        assert!(store.unload("spine/hero"));
        assert!(!store.contains("spine/hero-atlas"));
        assert!(!store.contains("spine/hero-data"));
    }

    #[test]
    fn test_unload_many_counts_registered() {
        let loader = MemoryAssetLoader::new()
            .with("a.png", Resource::Texture { width: 1.0, height: 1.0 })
            .with("b.png", Resource::Texture { width: 1.0, height: 1.0 });
        let store = store(loader);
        store
            .load_all(&[
                AssetDescriptor::texture("a", "a.png"),
                AssetDescriptor::texture("b", "b.png"),
            ])
            .unwrap();

        assert_eq!(store.unload_many(&["a", "b", "c"]), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_atlas_from_sheet_json() {
        let json = r#"{
            "frames": {
                "ace": { "frame": { "x": 0, "y": 0, "w": 16, "h": 24 } },
                "king": { "frame": { "x": 16, "y": 0, "w": 16, "h": 24 } }
            },
            "meta": { "scale": "1" }
        }"#;

        let atlas = Atlas::from_sheet_json(json).unwrap();
        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.frame_names(), vec!["ace", "king"]);
        assert_eq!(atlas.frame("king").unwrap().x, 16.0);
    }
}
