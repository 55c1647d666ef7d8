//! Latest-value slot carrying the interaction signal between threads.
//!
//! The estimator thread overwrites the slot whenever it finishes a frame;
//! the render loop reads whatever is there once per tick. There is no queue:
//! ticks only ever want the newest value, and neither side blocks.
//!
//! The value is stored as `f32` bits in an `AtomicU32`. NaN bits encode
//! [`Interaction::Absent`]; [`Interaction::tension`] never produces NaN, so
//! the two domains cannot collide.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::status::TensionStatus;
use crate::tension::Interaction;

const ABSENT_BITS: u32 = 0x7fc0_0000; // canonical quiet NaN

#[inline]
fn encode(i: Interaction) -> u32 {
    i.value().map_or(ABSENT_BITS, f32::to_bits)
}

#[inline]
fn decode(bits: u32) -> Interaction {
    Interaction::tension(f32::from_bits(bits))
}

/// Create a connected writer/reader pair, initially absent.
pub fn latest_value_slot() -> (SignalWriter, SignalReader) {
    let cell = Arc::new(AtomicU32::new(ABSENT_BITS));
    (
        SignalWriter {
            cell: Arc::clone(&cell),
        },
        SignalReader { cell },
    )
}

/// Producing end of the slot. Not `Clone`: one writer per slot.
#[derive(Debug)]
pub struct SignalWriter {
    cell: Arc<AtomicU32>,
}

impl SignalWriter {
    pub fn write(&self, interaction: Interaction) {
        self.cell.store(encode(interaction), Ordering::Release);
    }
}

/// Consuming end of the slot.
#[derive(Debug)]
pub struct SignalReader {
    cell: Arc<AtomicU32>,
}

impl SignalReader {
    /// The most recently written value; never blocks.
    pub fn latest(&self) -> Interaction {
        decode(self.cell.load(Ordering::Acquire))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Observers
// ════════════════════════════════════════════════════════════════════════════

/// Anything that wants every estimation result.
pub trait TensionSink: Send {
    fn publish(&mut self, status: &TensionStatus);
}

impl TensionSink for SignalWriter {
    fn publish(&mut self, status: &TensionStatus) {
        self.write(status.interaction);
    }
}

impl TensionSink for Sender<TensionStatus> {
    fn publish(&mut self, status: &TensionStatus) {
        // A dropped display is not an error for the estimator.
        _ = self.send(status.clone());
    }
}
