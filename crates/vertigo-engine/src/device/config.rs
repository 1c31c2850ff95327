use super::display::{ConfigCandidate, ConfigId};

/// Minimum framebuffer requirements for the renderer's surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConfigRequirements {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub depth_bits: u8,
}

impl Default for ConfigRequirements {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            depth_bits: 24,
        }
    }
}

impl ConfigRequirements {
    pub fn matches(&self, candidate: &ConfigCandidate) -> bool {
        candidate.es3_renderable
            && candidate.window_surface
            && candidate.red_bits == self.red_bits
            && candidate.green_bits == self.green_bits
            && candidate.blue_bits == self.blue_bits
            && candidate.depth_bits == self.depth_bits
    }
}

/// Returns the first candidate satisfying `requirements`.
///
/// Candidates arrive in the display's preference order; no further scoring
/// is applied.
pub fn choose_config(
    candidates: &[ConfigCandidate],
    requirements: &ConfigRequirements,
) -> Option<ConfigId> {
    candidates
        .iter()
        .inspect(|c| {
            log::debug!(
                "config candidate {:?}: r{} g{} b{} d{}",
                c.id,
                c.red_bits,
                c.green_bits,
                c.blue_bits,
                c.depth_bits
            )
        })
        .find(|c| requirements.matches(c))
        .map(|c| c.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: u32, bits: u8, depth: u8) -> ConfigCandidate {
        ConfigCandidate {
            id: ConfigId(id),
            red_bits: bits,
            green_bits: bits,
            blue_bits: bits,
            depth_bits: depth,
            es3_renderable: true,
            window_surface: true,
        }
    }

    #[test]
    fn first_matching_candidate_wins() {
        let list = [candidate(0, 5, 16), candidate(1, 8, 24), candidate(2, 8, 24)];
        assert_eq!(choose_config(&list, &ConfigRequirements::default()), Some(ConfigId(1)));
    }

    #[test]
    fn depth_must_match_exactly() {
        let list = [candidate(0, 8, 16), candidate(1, 8, 32)];
        assert_eq!(choose_config(&list, &ConfigRequirements::default()), None);
    }

    #[test]
    fn window_and_es3_capabilities_are_required() {
        let mut no_window = candidate(0, 8, 24);
        no_window.window_surface = false;
        let mut no_es3 = candidate(1, 8, 24);
        no_es3.es3_renderable = false;
        let ok = candidate(2, 8, 24);

        assert_eq!(
            choose_config(&[no_window, no_es3, ok], &ConfigRequirements::default()),
            Some(ConfigId(2))
        );
    }

    #[test]
    fn empty_list_yields_none() {
        assert_eq!(choose_config(&[], &ConfigRequirements::default()), None);
    }
}
