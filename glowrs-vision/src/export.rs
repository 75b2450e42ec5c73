use anyhow::{Context, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

/// Encode the surface exactly as currently rendered into PNG bytes. Encoding
/// failures surface to the caller; the live pipeline is unaffected either
/// way.
pub fn encode_png(surface: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            surface.as_raw(),
            surface.width(),
            surface.height(),
            ExtendedColorType::Rgb8,
        )
        .context("encoding surface to png")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn png_round_trips_a_solid_fill() -> Result<()> {
        let surface = RgbImage::from_pixel(64, 48, Rgb([0xAA, 0x55, 0x66]));
        let bytes = encode_png(&surface)?;

        let decoded = image::load_from_memory(&bytes)?.to_rgb8();
        assert_eq!(decoded.dimensions(), (64, 48));
        assert!(decoded.pixels().all(|p| *p == Rgb([0xAA, 0x55, 0x66])));
        Ok(())
    }
}
