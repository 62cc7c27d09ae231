//! # Events Module
//!
//! Progress and audit events for exposure evaluation.
//!
//! ## Design
//! The engine emits events through channels so a CLI or dashboard can show
//! batch progress and every card decision without parsing logs.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Batch(BatchEvent::Progress(p)) => println!("{}/{}", p.completed, p.total),
//!             Event::Card(CardEvent::Matched { rank, .. }) => println!("match at {}", rank),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Evaluate pages with the sender
//! let reports = engine.evaluate_batch(&jobs, &sender);
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
