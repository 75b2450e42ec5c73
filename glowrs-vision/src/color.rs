use thiserror::Error;

/// Shade value a zone is skipped for entirely (no draw call at all).
pub const NO_COLOR: &str = "transparent";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("malformed shade color `{0}`: expected `#RRGGBB` or `transparent`")]
    Malformed(String),
}

/// Premultiplied-nothing RGBA: channels straight from the shade descriptor,
/// alpha applied at blend time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

/// A shade descriptor validated once at a boundary (catalog load, parameter
/// setter) so the per-frame path never sees a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// The `transparent` sentinel: the zone is omitted.
    Clear,
    Tint { r: u8, g: u8, b: u8 },
}

impl Shade {
    pub fn parse(descriptor: &str) -> Result<Self, ColorError> {
        if descriptor == NO_COLOR {
            return Ok(Shade::Clear);
        }
        let bytes = descriptor.as_bytes();
        if bytes.len() != 7 || bytes[0] != b'#' || !descriptor.is_ascii() {
            return Err(ColorError::Malformed(descriptor.to_string()));
        }
        let channel = |range| {
            u8::from_str_radix(&descriptor[range], 16)
                .map_err(|_| ColorError::Malformed(descriptor.to_string()))
        };
        Ok(Shade::Tint {
            r: channel(1..3)?,
            g: channel(3..5)?,
            b: channel(5..7)?,
        })
    }

    /// Pairs the shade with an alpha; `Clear` resolves to no color at any alpha.
    pub fn resolve(&self, alpha: f32) -> Option<Rgba> {
        match *self {
            Shade::Clear => None,
            Shade::Tint { r, g, b } => Some(Rgba { r, g, b, a: alpha }),
        }
    }

    pub fn hex(&self) -> String {
        match *self {
            Shade::Clear => NO_COLOR.to_string(),
            Shade::Tint { r, g, b } => format!("#{r:02X}{g:02X}{b:02X}"),
        }
    }
}

/// Resolve a raw shade descriptor into a drawable color.
///
/// `transparent` yields `Ok(None)`; anything that is not exactly `#` followed
/// by six hex digits is rejected rather than silently replaced, since a bad
/// descriptor means broken catalog data.
pub fn resolve_color(shade: &str, alpha: f32) -> Result<Option<Rgba>, ColorError> {
    Ok(Shade::parse(shade)?.resolve(alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_hex() {
        let color = resolve_color("#E33638", 0.25).unwrap().unwrap();
        assert_eq!((color.r, color.g, color.b), (0xE3, 0x36, 0x38));
        assert_eq!(color.a, 0.25);

        let color = resolve_color("#f7976c", 1.0).unwrap().unwrap();
        assert_eq!((color.r, color.g, color.b), (0xF7, 0x97, 0x6C));
    }

    #[test]
    fn sentinel_is_none_at_any_alpha() {
        assert_eq!(resolve_color("transparent", 0.0).unwrap(), None);
        assert_eq!(resolve_color("transparent", 1.0).unwrap(), None);
        assert_eq!(Shade::Clear.resolve(0.5), None);
    }

    #[test]
    fn rejects_malformed_descriptors() {
        for bad in ["", "#FFF", "E33638", "#E3363", "#E336381", "#GGGGGG", "#aé638", "rgb(1,2,3)"] {
            assert!(resolve_color(bad, 1.0).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(Shade::parse("#A2644F").unwrap().hex(), "#A2644F");
        assert_eq!(Shade::parse("transparent").unwrap().hex(), "transparent");
    }
}
