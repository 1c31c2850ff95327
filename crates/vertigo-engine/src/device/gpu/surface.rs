use winit::dpi::PhysicalSize;

use crate::device::{ConfigCandidate, ConfigId, SurfaceErrorAction};

/// Depth precision advertised for every candidate (wgpu's `Depth24Plus`).
/// Depth testing is never enabled, so no depth attachment is allocated.
pub(crate) const DEPTH_BITS: u8 = 24;

/// Surface formats ordered by preference: 8-bit formats of the preferred
/// encoding first, then the rest in adapter order.
pub(crate) fn ordered_formats(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Vec<wgpu::TextureFormat> {
    let preferred = if prefer_srgb {
        [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ]
    } else {
        [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8Unorm,
        ]
    };

    let mut out: Vec<_> = preferred
        .into_iter()
        .filter(|f| caps.formats.contains(f))
        .collect();
    out.extend(caps.formats.iter().copied().filter(|f| !preferred.contains(f)));
    out
}

/// Red/green/blue bits of a color format, when it has exactly those channels
/// at a uniform width.
pub(crate) fn channel_bits(format: wgpu::TextureFormat) -> Option<u8> {
    use wgpu::TextureFormat as F;
    match format {
        F::Bgra8Unorm | F::Bgra8UnormSrgb | F::Rgba8Unorm | F::Rgba8UnormSrgb => Some(8),
        F::Rgb10a2Unorm => Some(10),
        F::Rgba16Float => Some(16),
        _ => None,
    }
}

pub(crate) fn candidates(formats: &[wgpu::TextureFormat]) -> Vec<ConfigCandidate> {
    formats
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            let bits = channel_bits(*f)?;
            Some(ConfigCandidate {
                id: ConfigId(i as u32),
                red_bits: bits,
                green_bits: bits,
                blue_bits: bits,
                depth_bits: DEPTH_BITS,
                es3_renderable: true,
                window_surface: true,
            })
        })
        .collect()
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Picks the requested present mode when supported, else FIFO.
pub(crate) fn choose_present_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: wgpu::PresentMode,
) -> wgpu::PresentMode {
    if caps.present_modes.contains(&requested) {
        requested
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// Reconfigures the surface when the window size changed.
///
/// wgpu rejects 0×0 surfaces; the configuration is left untouched until the
/// window has area again. Returns `false` while the surface has no area.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    new_size: PhysicalSize<u32>,
) -> bool {
    if new_size.width == 0 || new_size.height == 0 {
        return false;
    }

    if config.width != new_size.width || config.height != new_size.height {
        config.width = new_size.width;
        config.height = new_size.height;
        surface.configure(device, config);
        log::debug!("surface reconfigured to {}x{}", config.width, config.height);
    }
    true
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if config.width > 0 && config.height > 0 {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout => SurfaceErrorAction::SkipFrame,
        wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_encoding_comes_first() {
        let caps = wgpu::SurfaceCapabilities {
            formats: vec![
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba8UnormSrgb,
                wgpu::TextureFormat::Bgra8Unorm,
            ],
            ..Default::default()
        };
        assert_eq!(
            ordered_formats(&caps, true),
            vec![
                wgpu::TextureFormat::Rgba8UnormSrgb,
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Bgra8Unorm,
            ]
        );
        assert_eq!(
            ordered_formats(&caps, false),
            vec![
                wgpu::TextureFormat::Bgra8Unorm,
                wgpu::TextureFormat::Rgba16Float,
                wgpu::TextureFormat::Rgba8UnormSrgb,
            ]
        );
    }

    #[test]
    fn candidates_keep_format_index_and_skip_unknown_layouts() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::R8Unorm,
            wgpu::TextureFormat::Rgb10a2Unorm,
        ];
        let list = candidates(&formats);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, ConfigId(0));
        assert_eq!(list[0].red_bits, 8);
        assert_eq!(list[1].id, ConfigId(2));
        assert_eq!(list[1].red_bits, 10);
        assert!(list.iter().all(|c| c.depth_bits == DEPTH_BITS));
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let caps = wgpu::SurfaceCapabilities {
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        };
        assert_eq!(
            choose_alpha_mode(&caps, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );

        let none = wgpu::SurfaceCapabilities {
            alpha_modes: vec![],
            ..Default::default()
        };
        assert_eq!(choose_alpha_mode(&none, None), wgpu::CompositeAlphaMode::Auto);
    }

    #[test]
    fn unsupported_present_mode_falls_back_to_fifo() {
        let caps = wgpu::SurfaceCapabilities {
            present_modes: vec![wgpu::PresentMode::Fifo],
            ..Default::default()
        };
        assert_eq!(
            choose_present_mode(&caps, wgpu::PresentMode::Mailbox),
            wgpu::PresentMode::Fifo
        );
    }
}
