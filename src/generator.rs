// Copyright 2023 Greptime Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! EventGenerator implementation
//!
//! Generates synthetic click-stream events with random categories, timestamps spread
//! over the last few days, and randomly missing optional fields.

use chrono::{TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::event::{Event, EventType};

/// Timestamps are drawn from `now - [0, WINDOW_DAYS]` whole days
pub const WINDOW_DAYS: i64 = 10;

/// URL choices, `None` stands for an event without a URL
pub const SAMPLE_URLS: [Option<&str>; 3] =
    [Some("http://example.com"), Some("http://test.com"), None];

/// Generates synthetic events from a random source
pub struct EventGenerator<R: Rng = StdRng> {
    rng: R,
}

impl EventGenerator<StdRng> {
    /// Generator seeded from the operating system, non-reproducible
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible generator, UUIDs included
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for EventGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> EventGenerator<R> {
    /// Generate `count` events
    pub fn generate(&mut self, count: usize) -> Vec<Event> {
        let now = Utc::now();
        (0..count).map(|_| self.generate_one(now)).collect()
    }

    fn generate_one(&mut self, now: chrono::DateTime<Utc>) -> Event {
        let event_type = EventType::ALL[self.rng.random_range(0..EventType::ALL.len())];
        let days_ago = self.rng.random_range(0..=WINDOW_DAYS);
        let mut event = Event::new(event_type, now - TimeDelta::days(days_ago));

        if self.rng.random_bool(0.5) {
            let bytes: [u8; 16] = self.rng.random();
            event = event.with_user_id(uuid::Builder::from_random_bytes(bytes).into_uuid());
        }
        if let Some(url) = SAMPLE_URLS[self.rng.random_range(0..SAMPLE_URLS.len())] {
            event = event.with_url(url);
        }
        event
    }
}
