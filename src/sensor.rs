use crate::DoorState;

/// Contact-bounce filter over raw sensor samples.
///
/// A state change is only accepted after `threshold` consecutive raw samples
/// disagree with the current stable state. A threshold of 1 makes every raw
/// sample authoritative, which is how the unfiltered hardware behaved.
pub struct Debouncer {
    stable: DoorState,
    candidate: DoorState,
    run: u8,
    threshold: u8,
}

impl Debouncer {
    pub fn new(initial: DoorState, threshold: u8) -> Debouncer {
        Debouncer {
            stable: initial,
            candidate: initial,
            run: 0,
            threshold: threshold.max(1),
        }
    }

    /// Fold in one raw sample and return the stable state.
    pub fn sample(&mut self, raw: DoorState) -> DoorState {
        if raw == self.stable {
            self.run = 0;
        } else {
            if raw == self.candidate {
                self.run += 1;
            } else {
                self.candidate = raw;
                self.run = 1;
            }
            if self.run >= self.threshold {
                self.stable = raw;
                self.run = 0;
            }
        }
        self.stable
    }

    pub fn stable(&self) -> DoorState {
        self.stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DoorState::*;

    #[test]
    fn threshold_one_tracks_every_sample() {
        let mut debouncer = Debouncer::new(Closed, 1);
        assert_eq!(debouncer.sample(Open), Open);
        assert_eq!(debouncer.sample(Closed), Closed);
        assert_eq!(debouncer.sample(Open), Open);
    }

    #[test]
    fn change_needs_consecutive_samples() {
        let mut debouncer = Debouncer::new(Closed, 3);
        assert_eq!(debouncer.sample(Open), Closed);
        assert_eq!(debouncer.sample(Open), Closed);
        assert_eq!(debouncer.sample(Open), Open);
    }

    #[test]
    fn bounce_is_ignored() {
        let mut debouncer = Debouncer::new(Closed, 3);
        // Contact chatter around a closing edge never settles on Open
        for raw in [Open, Open, Closed, Open, Closed, Closed].iter() {
            assert_eq!(debouncer.sample(*raw), Closed);
        }
    }

    #[test]
    fn interrupted_run_starts_over() {
        let mut debouncer = Debouncer::new(Closed, 3);
        debouncer.sample(Open);
        debouncer.sample(Open);
        debouncer.sample(Closed);
        debouncer.sample(Open);
        assert_eq!(debouncer.sample(Open), Closed);
        assert_eq!(debouncer.sample(Open), Open);
    }

    #[test]
    fn steady_input_stays_stable() {
        let mut debouncer = Debouncer::new(Open, 2);
        for _ in 0..10 {
            assert_eq!(debouncer.sample(Open), Open);
        }
        assert_eq!(debouncer.stable(), Open);
    }
}
