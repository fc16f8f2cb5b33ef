//! Single-line encoding of templates for clipboard transfer.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use building_hints_core::DesiredTemplate;
use building_hints_store::{decode_template, encode_template};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "tmpl";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded template payload.
pub(crate) const TRANSFER_HEADER: &str = "tmpl:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while decoding template transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("template string was empty")]
    EmptyPayload,
    /// A segment of the transfer string was missing.
    #[error("template string is missing the {0}")]
    MissingSegment(&'static str),
    /// The encoded template used an unexpected prefix segment.
    #[error("template prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded template used an unsupported version identifier.
    #[error("template version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode template payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload is not valid UTF-8 text.
    #[error("template payload is not valid text")]
    InvalidText(#[source] std::string::FromUtf8Error),
    /// The decoded payload could not be deserialised.
    #[error("could not parse template payload")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Encodes the template into a single-line string.
#[must_use]
pub(crate) fn encode(template: &DesiredTemplate) -> String {
    let encoded = STANDARD_NO_PAD.encode(encode_template(template));
    format!("{TRANSFER_HEADER}{FIELD_DELIMITER}{encoded}")
}

/// Decodes a template from its transfer string.
pub(crate) fn decode(value: &str) -> Result<DesiredTemplate, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(TransferError::MissingSegment("version"))?;
    let payload = parts
        .next()
        .ok_or(TransferError::MissingSegment("payload"))?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let json = String::from_utf8(bytes).map_err(TransferError::InvalidText)?;
    decode_template(&json).map_err(TransferError::InvalidPayload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_template_decodes_back() {
        let template: DesiredTemplate = [("theater", 1), ("main", 10), ("farm", 45)]
            .into_iter()
            .collect();

        let encoded = encode(&template);
        assert!(encoded.starts_with(&format!("{TRANSFER_HEADER}:")));
        assert!(!encoded.contains('\n'));

        let decoded = decode(&encoded).expect("template decodes");
        assert_eq!(decoded, template);
    }

    #[test]
    fn foreign_strings_are_rejected() {
        assert!(matches!(decode("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(
            decode("maze:v1:abc"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("tmpl:v2:abc"),
            Err(TransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("tmpl:v1"),
            Err(TransferError::MissingSegment("payload"))
        ));
        assert!(matches!(
            decode("tmpl:v1:!!!"),
            Err(TransferError::InvalidEncoding(_))
        ));
    }
}
