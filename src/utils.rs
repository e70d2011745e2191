// src/utils.rs
use eframe::egui;
use tracing::warn;

/// Decode an image payload (PNG/JPEG) into a GPU texture. Returns None on
/// undecodable bytes instead of failing the whole payload.
pub fn texture_from_bytes(
    ctx: &egui::Context,
    name: &str,
    bytes: &[u8],
) -> Option<egui::TextureHandle> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img.to_rgba8(),
        Err(err) => {
            warn!(%err, name, "image payload did not decode");
            return None;
        }
    };
    let size = [decoded.width() as usize, decoded.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_flat_samples().as_slice());
    Some(ctx.load_texture(name, color, egui::TextureOptions::LINEAR))
}
