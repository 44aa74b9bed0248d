/// Viewports narrower than this get the bottom sheet.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum PanelPlacement {
    /// Side panel sliding in from the right.
    #[default]
    SlideIn,
    /// Bottom sheet sliding up.
    SlideUp,
}

pub fn placement_for(viewport_width_px: f64, breakpoint_px: f64) -> PanelPlacement {
    if viewport_width_px < breakpoint_px {
        PanelPlacement::SlideUp
    } else {
        PanelPlacement::SlideIn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive() {
        assert_eq!(placement_for(767.0, MOBILE_BREAKPOINT_PX), PanelPlacement::SlideUp);
        assert_eq!(placement_for(768.0, MOBILE_BREAKPOINT_PX), PanelPlacement::SlideIn);
        assert_eq!(placement_for(1920.0, MOBILE_BREAKPOINT_PX), PanelPlacement::SlideIn);
    }
}
