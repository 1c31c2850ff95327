/// One level of an RGBA8 mip chain, tightly packed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Number of levels in a full chain down to 1×1.
pub(crate) fn level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Builds levels 1.. from a packed level 0 with a 2×2 box filter.
///
/// A side that is already one texel wide samples that texel twice.
pub(crate) fn build_chain(width: u32, height: u32, base: &[u8]) -> Vec<MipLevel> {
    let mut levels = Vec::new();
    let (mut w, mut h) = (width, height);
    let mut prev = base.to_vec();

    while w > 1 || h > 1 {
        let nw = (w / 2).max(1);
        let nh = (h / 2).max(1);
        let mut out = vec![0u8; (nw * nh * 4) as usize];

        for y in 0..nh {
            for x in 0..nw {
                let x0 = (x * 2).min(w - 1);
                let x1 = (x * 2 + 1).min(w - 1);
                let y0 = (y * 2).min(h - 1);
                let y1 = (y * 2 + 1).min(h - 1);

                for c in 0..4 {
                    let at = |px: u32, py: u32| prev[((py * w + px) * 4 + c) as usize] as u32;
                    let sum = at(x0, y0) + at(x1, y0) + at(x0, y1) + at(x1, y1);
                    out[((y * nw + x) * 4 + c) as usize] = ((sum + 2) / 4) as u8;
                }
            }
        }

        prev = out.clone();
        levels.push(MipLevel {
            width: nw,
            height: nh,
            pixels: out,
        });
        w = nw;
        h = nh;
    }

    levels
}

/// Copies `height` rows of `row_bytes` out of a strided buffer.
pub(crate) fn pack_rows(pixels: &[u8], stride: usize, row_bytes: usize, height: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row_bytes * height);
    for row in pixels.chunks(stride).take(height) {
        out.extend_from_slice(&row[..row_bytes]);
    }
    out
}
