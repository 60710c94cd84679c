//! Window Sizing

/// Default window: at least 4, widening with the host's processing units.
///
/// Read-only host query, safe to call from any number of threads.
pub fn default_window() -> usize {
    let cpus = num_cpus::get();
    let window = cpus.max(4);
    log::trace!("default window {window} ({cpus} cpus)");
    window
}

/// Effective window for one run.
///
/// `None` defers to the heuristic. An explicit 0 would deadlock the
/// scheduler (nothing could ever be admitted), so it is normalized to
/// serial instead of propagated.
pub(crate) fn resolve(window: Option<usize>) -> usize {
    match window {
        Some(0) => {
            log::debug!("window override of 0 normalized to 1");
            1
        }
        Some(w) => w,
        None => default_window(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_at_least_four() {
        assert!(default_window() >= 4);
    }

    #[test]
    fn resolve_prefers_explicit_override() {
        assert_eq!(resolve(Some(7)), 7);
        assert_eq!(resolve(Some(1)), 1);
    }

    #[test]
    fn resolve_normalizes_zero_to_serial() {
        assert_eq!(resolve(Some(0)), 1);
    }

    #[test]
    fn resolve_defaults_to_heuristic() {
        assert_eq!(resolve(None), default_window());
    }
}
