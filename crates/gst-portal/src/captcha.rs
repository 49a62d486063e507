//! Captcha challenges bound to a portal session.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, GenericImageView};

use crate::config::CAPTCHA_COOKIE;
use crate::headers::Endpoint;
use crate::session::PortalSession;
use crate::types::{PortalError, PortalResult};

/// A captcha image and the token the portal bound to it.
#[derive(Debug, Clone)]
pub struct CaptchaChallenge {
    id: u64,
    epoch: u64,
    bytes: Vec<u8>,
    image: DynamicImage,
    token: Option<String>,
}

impl CaptchaChallenge {
    /// Decode a challenge image received for session `epoch`.
    pub fn decode(id: u64, epoch: u64, bytes: Vec<u8>, token: Option<String>) -> PortalResult<Self> {
        let image = image::load_from_memory(&bytes)?;
        Ok(Self {
            id,
            epoch,
            bytes,
            image,
            token,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Image bytes exactly as served.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Value of the captcha cookie set with this image, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Re-encode as PNG and return it base64-encoded.
    pub fn to_base64_png(&self) -> PortalResult<String> {
        let mut buf = Vec::new();
        let encoder = PngEncoder::new(Cursor::new(&mut buf));
        self.image.write_with_encoder(encoder)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&buf))
    }

    /// PNG data URI, ready for an `<img src>`.
    pub fn to_data_uri(&self) -> PortalResult<String> {
        Ok(format!("data:image/png;base64,{}", self.to_base64_png()?))
    }

    /// Write the raw image to `path` for manual solving.
    pub fn save(&self, path: &Path) -> PortalResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Answer to one specific challenge.
///
/// Only a session can mint these (see [`PortalSession::bind_solution`]). Not
/// `Clone`: the captcha-gated calls take them by value, so each answer is
/// submitted at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct CaptchaSolution {
    text: String,
    epoch: u64,
    challenge_id: u64,
}

impl CaptchaSolution {
    pub(crate) fn new(text: String, epoch: u64, challenge_id: u64) -> Self {
        Self {
            text,
            epoch,
            challenge_id,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn challenge_id(&self) -> u64 {
        self.challenge_id
    }
}

impl PortalSession {
    /// Fetch a fresh captcha for this session, replacing any held challenge.
    ///
    /// The old challenge is dropped up front: the portal may rotate the
    /// captcha cookie even when the fetch fails later on.
    pub async fn fetch_challenge(&mut self) -> PortalResult<&CaptchaChallenge> {
        self.challenge = None;
        let rnd = rand::random::<f64>().to_string();
        let resp = self.get(Endpoint::Captcha, &[("rnd", rnd.as_str())]).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortalError::CaptchaFetch {
                status: status.as_u16(),
            });
        }

        let token = resp
            .cookies()
            .find(|c| c.name() == CAPTCHA_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| self.cookie(CAPTCHA_COOKIE));
        if token.is_none() {
            tracing::warn!("Captcha response carried no {CAPTCHA_COOKIE} cookie");
        }

        let bytes = resp.bytes().await?.to_vec();
        let id = self.allocate_challenge_id();
        let challenge = CaptchaChallenge::decode(id, self.epoch(), bytes, token)?;
        let (width, height) = challenge.image().dimensions();
        tracing::debug!("Captcha challenge {id} fetched ({width}x{height})");

        Ok(self.challenge.insert(challenge))
    }

    /// The challenge currently awaiting a solution.
    pub fn challenge(&self) -> Option<&CaptchaChallenge> {
        self.challenge.as_ref()
    }

    /// Base64 PNG of the held challenge, `None` when nothing was fetched.
    pub fn encoded_challenge(&self) -> PortalResult<Option<String>> {
        self.challenge.as_ref().map(|c| c.to_base64_png()).transpose()
    }

    /// Save the held challenge image; `false` when nothing was fetched.
    pub fn save_challenge(&self, path: &Path) -> PortalResult<bool> {
        match &self.challenge {
            Some(challenge) => {
                challenge.save(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut buf = Vec::new();
        img.write_with_encoder(PngEncoder::new(&mut buf)).unwrap();
        buf
    }

    #[test]
    fn test_decode_and_encode() {
        let challenge = CaptchaChallenge::decode(1, 1, png(120, 40), Some("tok".into())).unwrap();
        assert_eq!(challenge.token(), Some("tok"));
        assert_eq!(challenge.image().dimensions(), (120, 40));

        let encoded = challenge.to_base64_png().unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let reloaded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(reloaded.dimensions(), (120, 40));
    }

    #[test]
    fn test_data_uri_prefix() {
        let challenge = CaptchaChallenge::decode(1, 1, png(2, 2), None).unwrap();
        assert!(challenge
            .to_data_uri()
            .unwrap()
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_decode_rejects_non_image() {
        let result = CaptchaChallenge::decode(1, 1, b"<html>busy</html>".to_vec(), None);
        assert!(matches!(result, Err(PortalError::CaptchaImage(_))));
    }

    #[test]
    fn test_save_writes_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = png(4, 4);
        let challenge = CaptchaChallenge::decode(1, 1, bytes.clone(), None).unwrap();
        let path = dir.path().join("nested").join("captcha.png");
        challenge.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_session_without_challenge() {
        let session = PortalSession::new(crate::PortalConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(session.encoded_challenge().unwrap().is_none());
        assert!(!session.save_challenge(&dir.path().join("c.png")).unwrap());
        assert!(matches!(
            session.bind_solution("AB12"),
            Err(PortalError::CaptchaUnavailable)
        ));
    }
}
