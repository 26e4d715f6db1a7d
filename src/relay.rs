/// Account-migration payload relay.
///
/// Takes the opaque export blob produced by the TeleOTP mini-app and turns it
/// into two independent representations: a scannable QR code carrying an
/// `otpauth-migration://` URI, and a deep link that re-opens the mini-app with
/// the payload attached. The blob itself is never interpreted here; both
/// encodings only need to round-trip byte-exactly.
use crate::error::{BotError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use image::Luma;
use qrcode::types::QrError;
use qrcode::QrCode;
use std::io::Cursor;

/// Scheme prefix understood by Google Authenticator and the TeleOTP importer.
const MIGRATION_SCHEME: &str = "otpauth-migration://offline?data=";

/// Rendered side length of the QR image in pixels (module count permitting).
const QR_IMAGE_SIZE: u32 = 512;

/// Everything needed to answer an export with a single photo message.
#[derive(Debug)]
pub struct ExportReply {
    /// PNG-encoded QR code of the migration URI.
    pub qr_png: Vec<u8>,
    /// Deep link that re-opens the mini-app with the payload attached.
    pub link: String,
    /// Caption for the photo message, with the link substituted in.
    pub caption: String,
}

/// Build the `otpauth-migration://offline?data=...` URI for a payload.
///
/// Every byte outside the unreserved set `[A-Za-z0-9-_.~]` is percent-encoded,
/// so percent-decoding the `data` parameter reproduces the payload exactly.
pub fn encode_for_qr(payload: &[u8]) -> String {
    format!("{}{}", MIGRATION_SCHEME, urlencoding::encode_binary(payload))
}

/// Render a URI as a PNG QR code.
///
/// Fails with [`BotError::QrCapacity`] when the input exceeds what the largest
/// QR symbol can hold; the payload is never truncated.
pub fn render_qr_image(uri: &str) -> Result<Vec<u8>> {
    let code = QrCode::new(uri.as_bytes()).map_err(|e| match e {
        QrError::DataTooLong => BotError::QrCapacity,
        other => BotError::Qr(other.to_string()),
    })?;

    let rendered = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_IMAGE_SIZE, QR_IMAGE_SIZE)
        .build();

    let mut png = Vec::new();
    rendered.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

/// Encode a payload as a URL-safe deep link token.
///
/// Base64 with `+` → `-`, `/` → `_` and trailing `=` padding stripped. This is
/// the exact inverse of the decoding the mini-app performs when it is opened
/// through a `startapp` link, so any change here breaks cross-app migration.
pub fn encode_for_deep_link(payload: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(payload)
}

/// Attach a token to the bot's public mini-app link.
///
/// The token alphabet is already URL-safe, so no further escaping is applied.
pub fn build_deep_link(token: &str, app_link: &str) -> String {
    format!("{}?startapp={}", app_link, token)
}

/// Turn an export payload into a ready-to-send photo reply.
///
/// `caption_template` is a localized string with a `{link}` placeholder. The
/// payload is treated as opaque: an empty export still produces a valid (if
/// meaningless) QR and link. A QR capacity failure fails the whole operation
/// and nothing should be sent to the user.
pub fn handle_export(
    payload: &[u8],
    app_link: &str,
    caption_template: &str,
) -> Result<ExportReply> {
    let qr_png = render_qr_image(&encode_for_qr(payload))?;
    let link = build_deep_link(&encode_for_deep_link(payload), app_link);
    let caption = caption_template.replace("{link}", &link);

    Ok(ExportReply {
        qr_png,
        link,
        caption,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    /// Reverse of the deep link transform, as the mini-app implements it:
    /// restore the base64 alphabet, re-pad, then standard-decode.
    fn reverse_deep_link_transform(token: &str) -> Vec<u8> {
        let mut restored = token.replace('-', "+").replace('_', "/");
        while restored.len() % 4 != 0 {
            restored.push('=');
        }
        STANDARD.decode(restored).unwrap()
    }

    #[test]
    fn test_qr_uri_round_trips() {
        let payloads: [&[u8]; 4] = [
            b"",
            b"hello",
            b"\x00\x01\x02\xff\xfe binary + / = ~",
            &[0u8, 255, 128, 10, 13, 37],
        ];

        for payload in payloads {
            let uri = encode_for_qr(payload);
            let data = uri.strip_prefix("otpauth-migration://offline?data=").unwrap();
            assert_eq!(
                urlencoding::decode_binary(data.as_bytes()).into_owned(),
                payload
            );
        }
    }

    #[test]
    fn test_qr_uri_has_no_raw_reserved_characters() {
        let uri = encode_for_qr(b"a+b/c=d e&f?g\xff");
        let data = uri.strip_prefix("otpauth-migration://offline?data=").unwrap();

        for c in data.chars() {
            assert!(
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'),
                "unexpected raw character {:?} in {}",
                c,
                data
            );
        }
    }

    #[test]
    fn test_empty_payload_yields_bare_scheme() {
        assert_eq!(encode_for_qr(b""), "otpauth-migration://offline?data=");
        assert_eq!(encode_for_deep_link(b""), "");
    }

    #[test]
    fn test_deep_link_token_known_vector() {
        // base64("hello") is "aGVsbG8=", padding stripped
        assert_eq!(encode_for_deep_link(b"hello"), "aGVsbG8");
    }

    #[test]
    fn test_deep_link_token_round_trips() {
        let payloads: [&[u8]; 4] = [
            b"",
            b"hello",
            b"\xfb\xff\xfe",
            &[0u8, 1, 2, 3, 251, 252, 253, 254, 255],
        ];

        for payload in payloads {
            let token = encode_for_deep_link(payload);
            assert_eq!(reverse_deep_link_transform(&token), payload);
        }
    }

    #[test]
    fn test_deep_link_token_is_url_safe() {
        // 0xfb-ish bytes produce '+' and '/' under plain base64
        let token = encode_for_deep_link(&[251u8, 239, 190, 63, 62, 0, 255]);
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_build_deep_link_format() {
        assert_eq!(
            build_deep_link("aGVsbG8", "https://t.me/test_bot/app"),
            "https://t.me/test_bot/app?startapp=aGVsbG8"
        );
    }

    #[test]
    fn test_render_qr_image_produces_png() {
        let png = render_qr_image(&encode_for_qr(b"hello")).unwrap();
        assert!(!png.is_empty());
        // PNG signature
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_render_qr_image_rejects_oversized_input() {
        // Far beyond the ~2.9 KB capacity of a version 40 symbol
        let uri = encode_for_qr(&vec![0x41u8; 8000]);
        match render_qr_image(&uri) {
            Err(BotError::QrCapacity) => {}
            other => panic!("expected QrCapacity error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_handle_export_composes_caption() {
        let reply = handle_export(
            b"hello",
            "https://t.me/test_bot/app",
            "Import your accounts: {link}",
        )
        .unwrap();

        assert_eq!(reply.link, "https://t.me/test_bot/app?startapp=aGVsbG8");
        assert_eq!(
            reply.caption,
            "Import your accounts: https://t.me/test_bot/app?startapp=aGVsbG8"
        );
        assert!(!reply.qr_png.is_empty());
    }

    #[test]
    fn test_handle_export_fails_whole_operation_on_capacity() {
        let payload = vec![0u8; 8000];
        assert!(matches!(
            handle_export(&payload, "https://t.me/test_bot/app", "{link}"),
            Err(BotError::QrCapacity)
        ));
    }
}
