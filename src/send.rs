//! Photo delivery with a plain-text fallback.

use std::fmt::Display;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivered {
    Photo,
    Text,
}

/// Awaits `photo` if there is one. When it fails, or there is no photo,
/// awaits `text` instead. Only a failure of `text` is returned.
pub async fn photo_or_text<M, E, P, T>(photo: Option<P>, text: T) -> Result<Delivered, E>
where
    P: Future<Output = Result<M, E>>,
    T: Future<Output = Result<M, E>>,
    E: Display,
{
    if let Some(photo) = photo {
        match photo.await {
            Ok(_) => return Ok(Delivered::Photo),
            Err(e) => log::warn!("Failed to send photo, sending text instead: {}", e),
        }
    }
    text.await?;
    Ok(Delivered::Text)
}
