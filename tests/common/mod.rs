#[cfg(test)]
mod fixture;
pub use fixture::{Fixture, N_SAMPLES};

#[cfg(test)]
mod runner;
pub use runner::ExchangeabilityRunner;
