use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridforge_core::MapSnapshot;
use thiserror::Error;

const SHARE_DOMAIN: &str = "gridforge";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded map payload.
pub(crate) const SHARE_HEADER: &str = "gridforge:v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding share strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("share string was empty")]
    EmptyPayload,
    /// The share string did not contain a version segment.
    #[error("share string is missing the version")]
    MissingVersion,
    /// The share string did not include the payload segment.
    #[error("share string is missing the payload")]
    MissingPayload,
    /// The share string used an unexpected prefix segment.
    #[error("share prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share string used an unsupported version identifier.
    #[error("share version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload is not a map snapshot.
    #[error("could not parse share payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise map: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Encodes a snapshot into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(snapshot: &MapSnapshot) -> Result<String, TransferError> {
    let json = serde_json::to_vec(snapshot).map_err(TransferError::Serialization)?;
    Ok(format!("{SHARE_HEADER}{FIELD_DELIMITER}{}", STANDARD_NO_PAD.encode(json)))
}

/// Decodes a snapshot from a share string.
pub(crate) fn decode(value: &str) -> Result<MapSnapshot, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    if domain != SHARE_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    if version != SHARE_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridforge_core::{AssetRef, GridCoord, TileRecord};
    use gridforge_world::{
        snapshot::{self, MapMetadata},
        World,
    };

    fn sample() -> MapSnapshot {
        let world = World::from_records(
            Default::default(),
            vec![
                TileRecord::unrotated(GridCoord::new(1, 0, 1), AssetRef::new("floor")),
                TileRecord::unrotated(GridCoord::new(2, 0, 1), AssetRef::new("wall")),
            ],
        );
        snapshot::export(
            &world,
            MapMetadata {
                map_name: "Shared".to_owned(),
                creation_time: "2024-01-01 00:00:00".to_owned(),
            },
        )
    }

    #[test]
    fn share_strings_round_trip() {
        let snapshot = sample();
        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SHARE_HEADER}:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&format!("  {encoded}\n")).expect("snapshot decodes");
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn foreign_prefixes_and_versions_are_rejected() {
        assert!(matches!(decode("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(
            decode("atlas:v1:abc"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "atlas"
        ));
        assert!(matches!(
            decode("gridforge:v2:abc"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(decode("gridforge"), Err(TransferError::MissingVersion)));
        assert!(matches!(decode("gridforge:v1"), Err(TransferError::MissingPayload)));
    }

    #[test]
    fn corrupt_payloads_are_rejected() {
        assert!(matches!(
            decode("gridforge:v1:***"),
            Err(TransferError::InvalidEncoding(_))
        ));

        let not_a_map = STANDARD_NO_PAD.encode(b"[1,2,3]");
        assert!(matches!(
            decode(&format!("gridforge:v1:{not_a_map}")),
            Err(TransferError::InvalidPayload(_))
        ));
    }
}
