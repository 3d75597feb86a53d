//! base64url as used inside seals.
//!
//! Encoding never emits `+`, `/` or `=`. Decoding accepts input with or
//! without trailing padding.

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

use crate::error::{Error, Result};

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_LENIENT.encode(data)
}

pub fn decode(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_LENIENT
        .decode(data)
        .map_err(Error::Base64DecodeFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_url_safe_and_unpadded() {
        assert_eq!(encode(b"Hello World!"), "SGVsbG8gV29ybGQh");
        assert_eq!(encode([0xfb, 0xff]), "-_8");
        assert_eq!(encode(b"a"), "YQ");
    }

    #[test]
    fn decode_tolerates_stripped_or_present_padding() {
        for (stripped, padded, bytes) in [
            ("YQ", "YQ==", &b"a"[..]),
            ("YWI", "YWI=", &b"ab"[..]),
            ("YWJj", "YWJj", &b"abc"[..]),
            ("-_8", "-_8=", &[0xfb, 0xff][..]),
        ] {
            assert_eq!(decode(stripped).unwrap(), bytes);
            assert_eq!(decode(padded).unwrap(), bytes);
        }
    }

    #[test]
    fn decode_rejects_excess_padding() {
        for input in ["YQ===", "YWI==", "YWJj="] {
            assert!(
                matches!(decode(input), Err(Error::Base64DecodeFailed(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn decode_rejects_invalid_characters() {
        assert!(matches!(
            decode("SGVsbG8gV29ybGQh!"),
            Err(Error::Base64DecodeFailed(_))
        ));
        assert!(matches!(decode("gsdg!"), Err(Error::Base64DecodeFailed(_))));
        assert!(matches!(decode("fdk!"), Err(Error::Base64DecodeFailed(_))));
    }
}
