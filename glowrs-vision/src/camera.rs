use anyhow::{Context, Result};
use image::{ImageBuffer, Rgb, RgbImage};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

/// V4L2 webcam delivering RGB frames for the try-on surface. Dropping the
/// camera tears down the stream and releases the device handle, which turns
/// the physical camera indicator off.
pub struct Camera {
    stream: Stream<'static>,
    width: u32,
    height: u32,
    fourcc: FourCC,
}

impl Camera {
    /// Open a device and negotiate a format near the requested surface size.
    /// RGB3 is preferred; YUYV and GREY are accepted and converted in
    /// software.
    pub fn open(device: &str, width: u32, height: u32) -> Result<Self> {
        let dev = Device::with_path(device).context("open camera")?;
        let mut fmt = dev.format().context("get camera format")?;
        let rgb = Format::new(width, height, FourCC::new(b"RGB3"));
        fmt = dev.set_format(&rgb).unwrap_or(fmt);
        if fmt.fourcc != FourCC::new(b"RGB3") {
            let yuyv = Format::new(width, height, FourCC::new(b"YUYV"));
            fmt = dev.set_format(&yuyv).unwrap_or(fmt);
        }
        log::info!(
            "camera {} streaming {}x{} {:?}",
            device,
            fmt.width,
            fmt.height,
            fmt.fourcc
        );
        let stream =
            Stream::with_buffers(&dev, Type::VideoCapture, 4).context("start camera stream")?;
        Ok(Self {
            stream,
            width: fmt.width,
            height: fmt.height,
            fourcc: fmt.fourcc,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Block for the next frame and convert it to RGB.
    pub fn frame(&mut self) -> Result<RgbImage> {
        let (data, meta) = self.stream.next().context("capture frame")?;
        log::debug!(
            "frame seq={:?} len={} fourcc={:?}",
            meta.sequence,
            data.len(),
            self.fourcc
        );
        let rgb = match self.fourcc {
            f if f == FourCC::new(b"RGB3") => data.to_vec(),
            f if f == FourCC::new(b"YUYV") => yuyv_to_rgb(self.width, self.height, data)?,
            f if f == FourCC::new(b"GREY") => grey_to_rgb(self.width, self.height, data)?,
            other => {
                log::warn!("unexpected pixel format {other:?}, passing buffer through");
                data.to_vec()
            }
        };
        let expected = (self.width * self.height * 3) as usize;
        if rgb.len() < expected {
            anyhow::bail!(
                "short frame buffer: got {} bytes, need {} for {}x{}",
                rgb.len(),
                expected,
                self.width,
                self.height
            );
        }
        ImageBuffer::from_raw(self.width, self.height, rgb[..expected].to_vec())
            .ok_or_else(|| anyhow::anyhow!("failed to build frame image"))
    }
}

fn yuyv_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height * 2) as usize;
    if data.len() < expected {
        anyhow::bail!("short YUYV buffer: {} < {}", data.len(), expected);
    }
    let mut out = Vec::with_capacity((width * height * 3) as usize);
    for quad in data[..expected].chunks_exact(4) {
        let u = quad[1] as f32 - 128.0;
        let v = quad[3] as f32 - 128.0;
        for &y in &[quad[0], quad[2]] {
            let y = y as f32;
            out.push(clamp_u8(y + 1.402 * v));
            out.push(clamp_u8(y - 0.344136 * u - 0.714136 * v));
            out.push(clamp_u8(y + 1.772 * u));
        }
    }
    Ok(out)
}

fn grey_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height) as usize;
    if data.len() < expected {
        anyhow::bail!("short GREY buffer: {} < {}", data.len(), expected);
    }
    let mut out = Vec::with_capacity(expected * 3);
    for &luma in &data[..expected] {
        out.extend_from_slice(&[luma, luma, luma]);
    }
    Ok(out)
}

fn clamp_u8(v: f32) -> u8 {
    v.max(0.0).min(255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grey_expands_to_rgb_triplets() -> Result<()> {
        let out = grey_to_rgb(2, 1, &[7, 200])?;
        assert_eq!(out, vec![7, 7, 7, 200, 200, 200]);
        Ok(())
    }

    #[test]
    fn yuyv_neutral_chroma_is_greyscale() -> Result<()> {
        // U = V = 128 means no chroma contribution.
        let out = yuyv_to_rgb(2, 1, &[100, 128, 200, 128])?;
        assert_eq!(out, vec![100, 100, 100, 200, 200, 200]);
        Ok(())
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(yuyv_to_rgb(4, 4, &[0; 8]).is_err());
        assert!(grey_to_rgb(4, 4, &[0; 8]).is_err());
    }
}
