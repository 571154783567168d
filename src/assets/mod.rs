//! Asset loading and lookup.
//!
//! - [`AssetStore`]: resources by alias, typed getters, unloading
//! - [`AssetLoader`]: the collaborator that actually fetches bytes
//! - [`MemoryAssetLoader`]: in-memory loader for headless runs

mod store;

pub use store::{
    AssetDescriptor, AssetKind, AssetLoader, AssetStore, Atlas, Frame, MemoryAssetLoader, Resource,
    SpineAsset,
};
