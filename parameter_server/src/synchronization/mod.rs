mod barrier;

pub use barrier::BarrierSync;
