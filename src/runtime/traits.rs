//! Trait abstractions for host collaborators
//!
//! The scene graph, avatar objects and asset store are owned by the host
//! engine; the session runtime reaches them only through these seams,
//! which also enable testing with mock implementations.

/// The NPC's avatar rig, used to switch animation state
pub trait AvatarRig: Send + Sync {
    /// Play the emote at the given resolved asset URL, replacing the
    /// current one.
    fn play_emote(&self, url: &str);
}

/// Resolves file-reference fields to loadable asset URLs
pub trait AssetResolver: Send + Sync {
    /// Resolve a possibly-empty file reference, falling back to the named
    /// default asset.
    fn resolve(&self, file_ref: Option<&str>, default_asset: &str) -> String;
}

/// Looks up the current user's avatar identity
pub trait PlayerIdentity: Send + Sync {
    /// Display name of the local player, looked up at submit time.
    fn display_name(&self) -> String;
}

/// Asset resolver that returns references as-is.
///
/// Suitable for hosts whose file references are already loadable URLs.
pub struct PassthroughAssets;

impl AssetResolver for PassthroughAssets {
    fn resolve(&self, file_ref: Option<&str>, default_asset: &str) -> String {
        match file_ref {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => default_asset.to_string(),
        }
    }
}
