//! Simulation statistics collection and reporting.
//!
//! This module tracks throughput metrics for the packetizer model. It provides:
//! 1. **Steps:** Total steps, steps stalled by downstream backpressure, idle steps.
//! 2. **Packets:** Packets emitted, split into requests and completions.
//! 3. **Dwords:** Header and payload dwords emitted and the resulting bus efficiency.

use std::time::Instant;

use crate::packetizer::{Port, StepOutcome};

/// Packetizer statistics.
#[derive(Debug, Clone)]
pub struct PacketizerStats {
    start_time: Instant,
    /// Total steps simulated.
    pub steps: u64,
    /// Physical words transferred.
    pub words_emitted: u64,
    /// Packets transferred (words with `last` set).
    pub packets_emitted: u64,
    /// Request packets transferred.
    pub requests_emitted: u64,
    /// Completion packets transferred.
    pub completions_emitted: u64,
    /// Header dwords transferred.
    pub header_dwords: u64,
    /// Enabled payload dwords transferred.
    pub payload_dwords: u64,
    /// Steps where a word was presented but the sink was not ready.
    pub backpressure_steps: u64,
    /// Steps where no word was presented.
    pub idle_steps: u64,
    /// Dwords per physical word, for efficiency.
    dwords_per_word: u64,
}

impl PacketizerStats {
    /// Creates empty statistics for a datapath of `dwords_per_word` dwords.
    pub fn new(dwords_per_word: usize) -> Self {
        Self {
            start_time: Instant::now(),
            steps: 0,
            words_emitted: 0,
            packets_emitted: 0,
            requests_emitted: 0,
            completions_emitted: 0,
            header_dwords: 0,
            payload_dwords: 0,
            backpressure_steps: 0,
            idle_steps: 0,
            dwords_per_word: dwords_per_word as u64,
        }
    }

    /// Accounts one step.
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.steps += 1;
        match &outcome.word {
            Some(word) => {
                self.words_emitted += 1;
                let enabled = word.enabled_dwords() as u64;
                let header = outcome.header_dwords as u64;
                self.header_dwords += header;
                self.payload_dwords += enabled.saturating_sub(header);
                if word.last {
                    self.packets_emitted += 1;
                    match outcome.packet {
                        Some(Port::Request) => self.requests_emitted += 1,
                        Some(Port::Completion) => self.completions_emitted += 1,
                        None => {}
                    }
                }
            }
            None if outcome.presented => self.backpressure_steps += 1,
            None => self.idle_steps += 1,
        }
    }

    /// Fraction of transferred dword slots that carried an enabled dword.
    pub fn efficiency(&self) -> f64 {
        let slots = self.words_emitted * self.dwords_per_word;
        if slots == 0 {
            return 0.0;
        }
        (self.header_dwords + self.payload_dwords) as f64 / slots as f64
    }

    /// Prints a report to stdout.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let steps = self.steps.max(1);
        println!("\n==========================================================");
        println!("TLP PACKETIZER STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("sim_steps                {}", self.steps);
        println!(
            "  steps.backpressure     {} ({:.2}%)",
            self.backpressure_steps,
            (self.backpressure_steps as f64 / steps as f64) * 100.0
        );
        println!(
            "  steps.idle             {} ({:.2}%)",
            self.idle_steps,
            (self.idle_steps as f64 / steps as f64) * 100.0
        );
        println!("----------------------------------------------------------");
        println!("PACKETS");
        println!("  packets.total          {}", self.packets_emitted);
        println!("  packets.requests       {}", self.requests_emitted);
        println!("  packets.completions    {}", self.completions_emitted);
        println!("----------------------------------------------------------");
        println!("DWORDS");
        println!("  words.emitted          {}", self.words_emitted);
        println!("  dwords.header          {}", self.header_dwords);
        println!("  dwords.payload         {}", self.payload_dwords);
        println!("  bus.efficiency         {:.2}%", self.efficiency() * 100.0);
        println!("==========================================================");
    }
}
