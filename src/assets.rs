//! Asset loading.
//!
//! Loads are fire-and-forget: `load_asset` dispatches on the file extension
//! to a registered loader and never propagates failure to the caller — a
//! miss is logged and the asset simply stays absent. Completion is signaled
//! through the message bus with a `LOADED_ASSET::<name>` message carrying
//! the asset, queued at normal priority so it arrives on a later tick.
//! Callers must tolerate an asset being unavailable for any number of
//! frames and re-check or subscribe rather than block.

use std::{any::Any, cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use crate::message::{MessageBus, MessagePriority};

/// Message code prefix announcing a finished load; the asset name follows.
pub const LOADED_ASSET_MESSAGE_PREFIX: &str = "LOADED_ASSET::";

/// Message code announcing that `name` finished loading.
pub fn asset_loaded_message(name: &str) -> String {
    format!("{}{}", LOADED_ASSET_MESSAGE_PREFIX, name)
}

/// A loaded asset. Concrete types are recovered with `as_any`.
pub trait Asset: Any {
    fn name(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

pub struct TextAsset {
    name: String,
    pub text: String,
}

impl Asset for TextAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ImageAsset {
    name: String,
    pub image: image::DynamicImage,
}

impl Asset for ImageAsset {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Decodes raw file bytes into an asset for the extensions it supports.
pub trait AssetLoader {
    fn supported_extensions(&self) -> &[&str];

    fn load(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<Rc<dyn Asset>>;
}

struct TextLoader;

impl AssetLoader for TextLoader {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "json"]
    }

    fn load(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<Rc<dyn Asset>> {
        let text = String::from_utf8(bytes)?;
        Ok(Rc::new(TextAsset {
            name: name.to_string(),
            text,
        }))
    }
}

struct ImageLoader;

impl AssetLoader for ImageLoader {
    fn supported_extensions(&self) -> &[&str] {
        &["png", "jpg", "jpeg", "gif", "webp", "bmp"]
    }

    fn load(&self, name: &str, bytes: Vec<u8>) -> anyhow::Result<Rc<dyn Asset>> {
        let image = image::load_from_memory(&bytes)?;
        Ok(Rc::new(ImageAsset {
            name: name.to_string(),
            image,
        }))
    }
}

struct ManagerState {
    loaders: Vec<Box<dyn AssetLoader>>,
    loaded: HashMap<String, Rc<dyn Asset>>,
}

/// Shared handle to the asset registry.
#[derive(Clone)]
pub struct AssetManager {
    state: Rc<RefCell<ManagerState>>,
    bus: MessageBus,
}

impl AssetManager {
    pub fn new(bus: MessageBus) -> Self {
        Self {
            state: Rc::new(RefCell::new(ManagerState {
                loaders: vec![Box::new(TextLoader), Box::new(ImageLoader)],
                loaded: HashMap::new(),
            })),
            bus,
        }
    }

    pub fn register_loader(&self, loader: Box<dyn AssetLoader>) {
        self.state.borrow_mut().loaders.push(loader);
    }

    pub fn is_asset_loaded(&self, name: &str) -> bool {
        self.state.borrow().loaded.contains_key(name)
    }

    /// Requests a load of `name`. Fire-and-forget: failures are logged and
    /// the asset stays absent. Completion is announced on the message bus.
    pub fn load_asset(&self, name: &str) {
        if self.is_asset_loaded(name) {
            log::debug!("asset '{}' is already loaded", name);
            return;
        }

        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let Some(extension) = extension else {
            log::warn!("asset '{}' has no file extension to dispatch on", name);
            return;
        };

        let bytes = match std::fs::read(name) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("unable to read asset '{}': {}", name, err);
                return;
            }
        };

        let asset = {
            let state = self.state.borrow();
            let Some(loader) = state
                .loaders
                .iter()
                .find(|loader| loader.supported_extensions().contains(&extension.as_str()))
            else {
                log::warn!("no loader registered for extension '{}'", extension);
                return;
            };
            match loader.load(name, bytes) {
                Ok(asset) => asset,
                Err(err) => {
                    log::warn!("failed to decode asset '{}': {}", name, err);
                    return;
                }
            }
        };

        self.state
            .borrow_mut()
            .loaded
            .insert(name.to_string(), asset.clone());
        self.bus.post(
            &asset_loaded_message(name),
            Some("asset_manager"),
            Some(asset as Rc<dyn Any>),
            MessagePriority::Normal,
        );
    }

    /// Returns the asset if it is loaded; otherwise triggers a load and
    /// reports the miss. Availability is announced on the bus later.
    pub fn get_asset(&self, name: &str) -> Option<Rc<dyn Asset>> {
        let existing = self.state.borrow().loaded.get(name).cloned();
        match existing {
            Some(asset) => Some(asset),
            None => {
                self.load_asset(name);
                None
            }
        }
    }
}
