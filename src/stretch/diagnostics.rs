//! Optional observation sink for per-frame engine data.

/// One recorded engine observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    /// Onset strength of a freshly fetched source frame.
    OnsetStrength {
        /// Index of the fetched frame, counting from zero.
        frame: usize,
        strength: f32,
        /// Whether the strength exceeded the sensitivity threshold.
        onset: bool,
    },
}

/// Receives engine observations. The engine never depends on what a sink
/// does with them.
pub trait Diagnostics {
    fn record(&mut self, observation: Observation);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {
    #[inline]
    fn record(&mut self, _observation: Observation) {}
}

/// Forwards observations to the `log` facade at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn record(&mut self, observation: Observation) {
        match observation {
            Observation::OnsetStrength {
                frame,
                strength,
                onset,
            } => log::trace!(
                "frame {}: onset strength {:.4}{}",
                frame,
                strength,
                if onset { " (onset)" } else { "" }
            ),
        }
    }
}

impl Diagnostics for Vec<Observation> {
    fn record(&mut self, observation: Observation) {
        self.push(observation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_collects_in_order() {
        let mut sink: Vec<Observation> = Vec::new();
        for frame in 0..3 {
            sink.record(Observation::OnsetStrength {
                frame,
                strength: frame as f32 * 0.5,
                onset: frame == 2,
            });
        }
        assert_eq!(sink.len(), 3);
        assert_eq!(
            sink[2],
            Observation::OnsetStrength {
                frame: 2,
                strength: 1.0,
                onset: true
            }
        );
    }
}
