use glam::DMat4;
use terra_math::LatLng;

/// Which fetch capability serves an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Local filesystem.
    File,
    /// Network, supplied by the host.
    Web,
}

/// Identity and placement of a mesh asset.
///
/// `uri` is the registry key. Descriptors are immutable once registered.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetDescriptor {
    /// Geographic anchor of the model origin.
    pub position: LatLng,
    /// Transform applied in model space before world placement.
    pub local_transform: DMat4,
    pub source: SourceKind,
    pub uri: String,
}

impl AssetDescriptor {
    /// Descriptor for an asset read from the local filesystem.
    pub fn from_file(position: LatLng, uri: impl Into<String>, local_transform: DMat4) -> Self {
        Self {
            position,
            local_transform,
            source: SourceKind::File,
            uri: uri.into(),
        }
    }

    /// Descriptor for an asset fetched over the network.
    pub fn from_web(position: LatLng, uri: impl Into<String>, local_transform: DMat4) -> Self {
        Self {
            position,
            local_transform,
            source: SourceKind::Web,
            uri: uri.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_fix_source() {
        let pos = LatLng::new(60.17, 24.94);
        let file = AssetDescriptor::from_file(pos, "models/a.obj", DMat4::IDENTITY);
        let web = AssetDescriptor::from_web(pos, "https://example.com/a.obj", DMat4::IDENTITY);
        assert_eq!(file.source, SourceKind::File);
        assert_eq!(web.source, SourceKind::Web);
        assert_eq!(file.uri, "models/a.obj");
        assert_eq!(web.position, pos);
    }
}
