use winit::dpi::PhysicalSize;

/// What the caller should do after a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface reconfigured; the next frame can proceed.
    Reconfigured,
    /// Transient; drop this frame.
    SkipFrame,
    /// Out of memory; the runtime shuts down.
    Fatal,
}

pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let first = *caps.formats.first()?;

    let preferred = if prefer_srgb {
        [wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Rgba8UnormSrgb]
    } else {
        [wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Rgba8Unorm]
    };

    Some(
        preferred
            .into_iter()
            .find(|f| caps.formats.contains(f))
            .unwrap_or(first),
    )
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

/// Updates the tracked size and reconfigures the surface.
///
/// wgpu cannot configure a 0x0 surface; such sizes are only recorded. Returns
/// whether the surface was reconfigured.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) -> bool {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        return false;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
    true
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            log::debug!("surface {err:?}; reconfigured");
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => {
            log::error!("surface out of memory");
            SurfaceErrorAction::Fatal
        }
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
            log::warn!("surface {err:?}; skipping frame");
            SurfaceErrorAction::SkipFrame
        }
    }
}
