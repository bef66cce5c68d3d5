use super::SurfaceErrorAction;

/// Picks the first supported format whose sRGB encoding matches `prefer_srgb`,
/// else the surface's first format.
pub(crate) fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| formats.first().copied())
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

/// Maps a surface acquisition error to the action the frame loop should take.
///
/// `reconfigure` is invoked for lost/outdated surfaces.
pub(crate) fn map_surface_error(
    err: &wgpu::SurfaceError,
    reconfigure: impl FnOnce(),
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            reconfigure();
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMATS: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Bgra8Unorm,
    ];

    #[test]
    fn linear_format_chosen_when_srgb_not_preferred() {
        assert_eq!(
            choose_surface_format(&FORMATS, false),
            Some(wgpu::TextureFormat::Bgra8Unorm)
        );
        assert_eq!(
            choose_surface_format(&FORMATS, true),
            Some(wgpu::TextureFormat::Bgra8UnormSrgb)
        );
    }

    #[test]
    fn falls_back_to_first_format() {
        let only_srgb = [wgpu::TextureFormat::Rgba8UnormSrgb];
        assert_eq!(choose_surface_format(&only_srgb, false), Some(only_srgb[0]));
        assert_eq!(choose_surface_format(&[], false), None);
    }

    #[test]
    fn lost_surface_is_reconfigured() {
        let mut called = false;
        let action = map_surface_error(&wgpu::SurfaceError::Lost, || called = true);
        assert_eq!(action, SurfaceErrorAction::Reconfigured);
        assert!(called);
    }

    #[test]
    fn out_of_memory_is_fatal() {
        let action = map_surface_error(&wgpu::SurfaceError::OutOfMemory, || {});
        assert_eq!(action, SurfaceErrorAction::Fatal);
    }

    #[test]
    fn timeout_skips_without_reconfigure() {
        let mut called = false;
        let action = map_surface_error(&wgpu::SurfaceError::Timeout, || called = true);
        assert_eq!(action, SurfaceErrorAction::SkipFrame);
        assert!(!called);
    }
}
