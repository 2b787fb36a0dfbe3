//! Client-side image delivery.
//!
//! Some mobile WebKit builds silently fail to paint large data-URI images in
//! live `<img>` elements. On those platforms an inline image is decoded to
//! bytes and handed to the display layer as a short-lived object URL instead.
//!
//! The capability is resolved once per client session ([`RenderCapabilities`]).
//! [`ImageSlots`] owns every object URL it creates: a new image for a slot
//! revokes the previous URL, and dropping the slots revokes the rest.
//! [`ImageDelivery`] adds a read-through cache so a failed fetch can still
//! show the last image that resolved.

use std::collections::HashMap;

use serde::Serialize;

use crate::image_codec;

/// Platform family, as far as image rendering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// iPhone, iPod and iPad (including iPadOS reporting a desktop UA).
    IosWebKit,
    Android,
    Desktop,
}

/// Detect the platform from a user agent and the reported touch points.
///
/// iPadOS Safari identifies itself as a Mac, so a "Macintosh" UA with more
/// than one touch point is treated as iOS.
pub fn detect_platform(user_agent: &str, max_touch_points: Option<u32>) -> Platform {
    let ua = user_agent.to_ascii_lowercase();
    if ua.contains("iphone") || ua.contains("ipad") || ua.contains("ipod") {
        return Platform::IosWebKit;
    }
    if ua.contains("macintosh") && max_touch_points.is_some_and(|n| n > 1) {
        return Platform::IosWebKit;
    }
    if ua.contains("android") {
        return Platform::Android;
    }
    Platform::Desktop
}

/// Per-session rendering capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCapabilities {
    pub platform: Platform,
    pub requires_reencoding: bool,
}

impl RenderCapabilities {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            requires_reencoding: platform == Platform::IosWebKit,
        }
    }

    pub fn detect(user_agent: &str, max_touch_points: Option<u32>) -> Self {
        Self::for_platform(detect_platform(user_agent, max_touch_points))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("Could not create object URL: {0}")]
    ObjectUrl(String),
}

/// Creates and revokes session-scoped object URLs (`URL.createObjectURL`).
pub trait ObjectUrlFactory {
    fn create(&self, bytes: &[u8], mime: &str) -> Result<String, DeliveryError>;
    fn revoke(&self, url: &str);
}

/// What the display layer should put in the image `src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplaySource {
    Inline(String),
    Transient(String),
}

impl DisplaySource {
    pub fn as_str(&self) -> &str {
        match self {
            DisplaySource::Inline(s) | DisplaySource::Transient(s) => s,
        }
    }
}

/// Tracks the object URL currently shown in each logical image slot.
pub struct ImageSlots<F: ObjectUrlFactory> {
    capabilities: RenderCapabilities,
    factory: F,
    active: HashMap<String, String>,
}

impl<F: ObjectUrlFactory> ImageSlots<F> {
    pub fn new(capabilities: RenderCapabilities, factory: F) -> Self {
        Self {
            capabilities,
            factory,
            active: HashMap::new(),
        }
    }

    pub fn capabilities(&self) -> RenderCapabilities {
        self.capabilities
    }

    /// Produce the display source for `data_uri` in `slot`.
    ///
    /// Supersedes whatever the slot showed before. Decode or object URL
    /// failures fall back to the inline string.
    pub fn present(&mut self, slot: &str, data_uri: &str) -> DisplaySource {
        if !self.capabilities.requires_reencoding {
            self.release(slot);
            return DisplaySource::Inline(data_uri.to_string());
        }

        match self.reencode(data_uri) {
            Ok(url) => {
                if let Some(previous) = self.active.insert(slot.to_string(), url.clone()) {
                    self.factory.revoke(&previous);
                }
                DisplaySource::Transient(url)
            }
            Err(_) => {
                self.release(slot);
                DisplaySource::Inline(data_uri.to_string())
            }
        }
    }

    /// Revoke the object URL held by `slot`, if any.
    pub fn release(&mut self, slot: &str) {
        if let Some(url) = self.active.remove(slot) {
            self.factory.revoke(&url);
        }
    }

    pub fn release_all(&mut self) {
        for (_, url) in self.active.drain() {
            self.factory.revoke(&url);
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn reencode(&self, data_uri: &str) -> Result<String, DeliveryError> {
        let image = image_codec::normalize(data_uri)
            .map_err(|e| DeliveryError::ObjectUrl(e.to_string()))?;
        let bytes = image
            .decode_bytes()
            .map_err(|e| DeliveryError::ObjectUrl(e.to_string()))?;
        self.factory.create(&bytes, image.mime())
    }
}

impl<F: ObjectUrlFactory> Drop for ImageSlots<F> {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Local mirror of the last image resolved per slot (e.g. `localStorage`).
pub trait ImageCache {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, image: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryImageCache {
    entries: HashMap<String, String>,
}

impl ImageCache for MemoryImageCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, image: String) {
        self.entries.insert(key.to_string(), image);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Slot management plus read-through caching of fetched images.
pub struct ImageDelivery<F: ObjectUrlFactory, C: ImageCache> {
    slots: ImageSlots<F>,
    cache: C,
}

impl<F: ObjectUrlFactory, C: ImageCache> ImageDelivery<F, C> {
    pub fn new(slots: ImageSlots<F>, cache: C) -> Self {
        Self { slots, cache }
    }

    /// Render the outcome of fetching the image for `slot`.
    ///
    /// - fetched image: cached, then presented;
    /// - no image stored: cache entry and slot cleared, nothing rendered;
    /// - fetch failed: the cached image is presented, if there is one.
    pub fn resolve<E>(
        &mut self,
        slot: &str,
        fetched: Result<Option<String>, E>,
    ) -> Option<DisplaySource> {
        match fetched {
            Ok(Some(image)) => {
                self.cache.put(slot, image.clone());
                Some(self.slots.present(slot, &image))
            }
            Ok(None) => {
                self.cache.remove(slot);
                self.slots.release(slot);
                None
            }
            Err(_) => {
                let cached = self.cache.get(slot)?;
                Some(self.slots.present(slot, &cached))
            }
        }
    }

    pub fn slots(&self) -> &ImageSlots<F> {
        &self.slots
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}
