use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct WorkerMetrics {
    pub recv_time: Duration,
    pub compute_time: Duration,
    pub send_time: Duration,

    pub rounds: u64,
    /// Tokens whose topic changed, summed over every pass.
    pub moved: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn bump_round(&mut self) {
        self.rounds += 1;
    }

    #[inline]
    pub fn add_moved(&mut self, n: usize) {
        self.moved += n as u64;
    }
}
