use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use realm_world::BoardSnapshot;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "realm";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "realm:v1";
/// Delimiter used to separate the prefix from the payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding board transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("board string was empty")]
    EmptyPayload,
    /// The encoded snapshot did not contain a version segment.
    #[error("board string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include the payload segment.
    #[error("board string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("board prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("board version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode board payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process board payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Encodes a snapshot into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(snapshot: &BoardSnapshot) -> Result<String, TransferError> {
    let json = serde_json::to_vec(snapshot).map_err(TransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a snapshot from its transfer string.
pub(crate) fn decode(value: &str) -> Result<BoardSnapshot, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }
    if payload.is_empty() {
        return Err(TransferError::MissingPayload);
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_catalog::Catalog;
    use realm_core::{Command, Edge, TileName};
    use realm_world::{self as world, World};

    fn small_board() -> BoardSnapshot {
        let mut world = World::new(Catalog::canonical());
        let mut events = Vec::new();
        world::apply(&mut world, Command::PlaceAnchor, &mut events);
        world::apply(
            &mut world,
            Command::AttachTile {
                tile: TileName::Borderland,
                at_edge: Edge::new(3).expect("edge"),
                neighbor: TileName::Cavern,
                neighbor_edge: Edge::new(0).expect("edge"),
            },
            &mut events,
        );
        world.snapshot()
    }

    #[test]
    fn encoded_board_decodes_to_the_same_snapshot() {
        let snapshot = small_board();
        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&format!("  {encoded}\n")).expect("snapshot decodes");
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn rejects_foreign_headers() {
        assert!(matches!(decode(""), Err(TransferError::EmptyPayload)));
        assert!(matches!(decode("realm"), Err(TransferError::MissingVersion)));
        assert!(matches!(decode("realm:v1"), Err(TransferError::MissingPayload)));
        assert!(matches!(
            decode("maze:v1:e30"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("realm:v2:e30"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v2"
        ));
    }

    #[test]
    fn rejects_corrupt_payloads() {
        assert!(matches!(
            decode("realm:v1:***"),
            Err(TransferError::InvalidEncoding(_))
        ));
        // "{}" lacks the required fields.
        assert!(matches!(
            decode("realm:v1:e30"),
            Err(TransferError::InvalidPayload(_))
        ));
    }
}
