use crate::mode::Mode;

pub const SWITCH_HINT: &str = "Switch shape: 1 - split triangle  2 - cylinder from ring lines";

/// Two-line status text shown in the overlay.
pub fn status_text(mode: Mode) -> String {
    let current = match mode {
        Mode::SplitTriangle => "split triangle",
        Mode::CylinderNoCap => "cylinder (Q - show ring normals)",
        Mode::CylinderNoCapWithNormal => "cylinder (Q - hide ring normals)",
    };
    format!("{SWITCH_HINT}\nCurrent mode: {current}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_is_the_switch_hint() {
        let text = status_text(Mode::CylinderNoCap);
        assert_eq!(text.lines().next(), Some(SWITCH_HINT));
    }

    #[test]
    fn second_line_names_the_mode() {
        let second = |m| status_text(m).lines().nth(1).map(str::to_owned);
        assert_eq!(second(Mode::SplitTriangle).as_deref(), Some("Current mode: split triangle"));
        assert_eq!(
            second(Mode::CylinderNoCap).as_deref(),
            Some("Current mode: cylinder (Q - show ring normals)")
        );
        assert_eq!(
            second(Mode::CylinderNoCapWithNormal).as_deref(),
            Some("Current mode: cylinder (Q - hide ring normals)")
        );
    }
}
