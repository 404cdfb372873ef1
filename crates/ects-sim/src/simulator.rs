//! Software Reader Simulator
//!
//! Pure-software stand-in for an RFID reader: a producer thread repeatedly
//! reports a randomly chosen identifier from a synthetic inventory, the way
//! a physical reader reports whichever tag answered the current inventory
//! round. Duplicate reports occur naturally, tags answer in no particular
//! order, and delivery pacing follows a jittered read rate.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                SimulatedReader                   │
//! │                                                  │
//! │  inventory ──► producer thread ──► observer(fn)  │
//! │                      ▲                   │       │
//! │                      └── false = stop ───┘       │
//! └──────────────────────────────────────────────────┘
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

use ects_core::population;
use ects_core::types::TagCode;

use crate::reader::{ObserveFn, ReaderConfig, ReaderError, ReaderResult, TagReader};

/// Software reader producing tag observations from a background thread.
pub struct SimulatedReader {
    name: String,
    config: ReaderConfig,
    inventory: Arc<Vec<TagCode>>,
    observer: Option<Arc<ObserveFn>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedReader {
    /// Create a reader with a freshly generated inventory.
    pub fn new(config: ReaderConfig) -> Self {
        let inventory = match config.seed {
            Some(seed) => {
                population::generate_codes_seeded(config.inventory_size, config.bit_length, seed)
            }
            None => {
                let mut rng = StdRng::from_entropy();
                population::generate_codes(config.inventory_size, config.bit_length, &mut rng)
            }
        };
        Self {
            name: "ECTS Reader Simulator".to_string(),
            config,
            inventory: Arc::new(inventory),
            observer: None,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Replace the generated inventory with an explicit one.
    pub fn with_inventory(mut self, inventory: Vec<TagCode>) -> Self {
        self.inventory = Arc::new(inventory);
        self
    }

    /// The tags present in the simulated field.
    pub fn inventory(&self) -> &[TagCode] {
        &self.inventory
    }
}

impl TagReader for SimulatedReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_observer(&mut self, observer: ObserveFn) {
        self.observer = Some(Arc::new(observer));
    }

    fn start(&mut self) -> ReaderResult<()> {
        if self.running.load(Ordering::Acquire) {
            return Err(ReaderError::AlreadyRunning);
        }
        let observer = self.observer.clone().ok_or(ReaderError::NoObserver)?;
        if self.inventory.is_empty() {
            return Err(ReaderError::EmptyInventory);
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let inventory = Arc::clone(&self.inventory);
        let config = self.config.clone();

        let handle = thread::Builder::new()
            .name("ects-sim-reader".into())
            .spawn(move || {
                // Decorrelate the read sequence from the inventory bits,
                // which were drawn from the seed itself.
                let mut rng = match config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
                    None => StdRng::from_entropy(),
                };
                let pacing = if config.reads_per_sec > 0.0 {
                    let period = 1.0 / config.reads_per_sec;
                    Normal::new(period, period * 0.1).ok()
                } else {
                    None
                };

                while running.load(Ordering::Acquire) {
                    let code = inventory[rng.gen_range(0..inventory.len())].clone();
                    if !observer(code) {
                        debug!("observer requested stop");
                        break;
                    }
                    if let Some(dist) = &pacing {
                        let delay = dist.sample(&mut rng).max(0.0);
                        if delay > 0.0 {
                            thread::sleep(Duration::from_secs_f64(delay));
                        }
                    }
                }
                running.store(false, Ordering::Release);
            })
            .map_err(|e| ReaderError::Spawn(e.to_string()))?;

        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> ReaderResult<()> {
        let handle = self.handle.take().ok_or(ReaderError::NotStarted)?;
        self.running.store(false, Ordering::Release);
        let _ = handle.join();
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for SimulatedReader {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop();
        }
    }
}
