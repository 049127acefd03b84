//! # slot-engine: Spin, payout and reel animation core
//!
//! Drives a five-reel drum slot machine from a render loop. The host owns
//! the clock and the screen; this crate owns the money and the reels.
//!
//! ## Architecture
//!
//! ```text
//! SlotMachine::press_spin()
//!     │
//!     ├── GameSession::spin()        charge bet, arm bonus, draw stops
//!     │       └── OutcomeGenerator   one uniform stop per reel
//!     └── ReelSet::start()           per-reel target angles
//!
//! SlotMachine::frame(now_ms)
//!     │
//!     ├── ReelAnimator::tick()       eased rotation, Presenter::render_reel
//!     └── last reel lands
//!             └── GameSession::complete_spin()
//!                     └── PayoutEvaluator   payline or full bonus sweep
//! ```

pub mod animator;
pub mod config;
pub mod cue;
pub mod error;
pub mod machine;
pub mod outcome;
pub mod paytable;
pub mod session;
pub mod symbols;
pub mod timing;

/// Currency amounts (balance, wins)
pub type Credits = f64;

pub use animator::*;
pub use config::*;
pub use cue::*;
pub use error::*;
pub use machine::*;
pub use outcome::*;
pub use paytable::*;
pub use session::*;
pub use symbols::*;
pub use timing::*;
