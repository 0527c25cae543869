use std::collections::HashMap;

use lazy_static::lazy_static;

/// Source blend factor.
///
/// Factor values are single bits: sources occupy the low byte and
/// destinations the high byte, so one `u16` word packs a full blend mode
/// and either half can be recovered with a mask.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendSource {
    Zero = 1 << 0,
    One = 1 << 1,
    SrcColor = 1 << 2,
    OneMinusSrcColor = 1 << 3,
    SrcAlpha = 1 << 4,
    OneMinusSrcAlpha = 1 << 5,
    DstAlpha = 1 << 6,
    OneMinusDstAlpha = 1 << 7,
}

/// Destination blend factor (high byte of a packed mode word).
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendDestination {
    Zero = 1 << 8,
    One = 1 << 9,
    DstColor = 1 << 10,
    OneMinusDstColor = 1 << 11,
    OneMinusDstAlpha = 1 << 12,
    OneMinusSrcAlpha = 1 << 13,
    DstAlpha = 1 << 14,
}

/// Precombined blend mode: the OR of one source and one destination bit.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlendMode {
    /// Premultiplied-alpha compositing: `One | OneMinusSrcAlpha`.
    Default = (1 << 1) | (1 << 13),
    /// Straight alpha: `SrcAlpha | OneMinusSrcAlpha`.
    Alpha = (1 << 4) | (1 << 13),
    /// Additive: `SrcAlpha | One`.
    Additive = (1 << 4) | (1 << 9),
}

/// Mask selecting the source half of a packed blend word.
pub const SOURCE_MASK: u16 = 0x00ff;

/// Mask selecting the destination half of a packed blend word.
pub const DESTINATION_MASK: u16 = 0xff00;

lazy_static! {
    /// Blend factor bit -> API token. Built once, never mutated.
    static ref BLEND_FACTORS: HashMap<u16, u32> = {
        let mut m = HashMap::new();

        m.insert(BlendSource::Zero as u16, gl::ZERO);
        m.insert(BlendSource::One as u16, gl::ONE);
        m.insert(BlendSource::SrcColor as u16, gl::SRC_COLOR);
        m.insert(BlendSource::OneMinusSrcColor as u16, gl::ONE_MINUS_SRC_COLOR);
        m.insert(BlendSource::SrcAlpha as u16, gl::SRC_ALPHA);
        m.insert(BlendSource::OneMinusSrcAlpha as u16, gl::ONE_MINUS_SRC_ALPHA);
        m.insert(BlendSource::DstAlpha as u16, gl::DST_ALPHA);
        m.insert(BlendSource::OneMinusDstAlpha as u16, gl::ONE_MINUS_DST_ALPHA);

        m.insert(BlendDestination::Zero as u16, gl::ZERO);
        m.insert(BlendDestination::One as u16, gl::ONE);
        m.insert(BlendDestination::DstColor as u16, gl::DST_COLOR);
        m.insert(BlendDestination::OneMinusDstColor as u16, gl::ONE_MINUS_DST_COLOR);
        m.insert(BlendDestination::OneMinusDstAlpha as u16, gl::ONE_MINUS_DST_ALPHA);
        m.insert(BlendDestination::OneMinusSrcAlpha as u16, gl::ONE_MINUS_SRC_ALPHA);
        m.insert(BlendDestination::DstAlpha as u16, gl::DST_ALPHA);

        m
    };
}

/// Looks up the API token for one packed blend-factor bit.
///
/// Every `BlendSource` and `BlendDestination` value is covered; a word
/// built from anything else resolves to the zero factor.
pub fn blend_factor_token(factor: u16) -> u32 {
    BLEND_FACTORS.get(&factor).copied().unwrap_or(gl::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_stay_in_low_byte() {
        for source in [
            BlendSource::Zero,
            BlendSource::One,
            BlendSource::SrcColor,
            BlendSource::OneMinusSrcColor,
            BlendSource::SrcAlpha,
            BlendSource::OneMinusSrcAlpha,
            BlendSource::DstAlpha,
            BlendSource::OneMinusDstAlpha,
        ] {
            assert_eq!(source as u16 & DESTINATION_MASK, 0);
        }
    }

    #[test]
    fn destinations_stay_in_high_byte() {
        for destination in [
            BlendDestination::Zero,
            BlendDestination::One,
            BlendDestination::DstColor,
            BlendDestination::OneMinusDstColor,
            BlendDestination::OneMinusDstAlpha,
            BlendDestination::OneMinusSrcAlpha,
            BlendDestination::DstAlpha,
        ] {
            assert_eq!(destination as u16 & SOURCE_MASK, 0);
        }
    }

    #[test]
    fn modes_split_into_known_factors() {
        for mode in [BlendMode::Default, BlendMode::Alpha, BlendMode::Additive] {
            let word = mode as u16;
            assert_ne!(word & SOURCE_MASK, 0);
            assert_ne!(word & DESTINATION_MASK, 0);
        }
    }

    #[test]
    fn default_mode_translates_to_premultiplied_pair() {
        let word = BlendMode::Default as u16;
        assert_eq!(blend_factor_token(word & SOURCE_MASK), gl::ONE);
        assert_eq!(
            blend_factor_token(word & DESTINATION_MASK),
            gl::ONE_MINUS_SRC_ALPHA
        );
    }
}
