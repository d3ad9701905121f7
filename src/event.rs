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

//! The synthetic event written to both stores

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Category of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    View,
    Purchase,
}

impl EventType {
    /// Every category the generator draws from
    pub const ALL: [EventType; 3] = [EventType::Click, EventType::View, EventType::Purchase];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
            EventType::View => "view",
            EventType::Purchase => "purchase",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event record. Column order of both tables follows field order here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub url: Option<String>,
}

impl Event {
    /// Column names in table order
    pub const COLUMNS: [&'static str; 4] = ["event_type", "timestamp", "user_id", "url"];

    pub fn new(event_type: EventType, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_type,
            timestamp,
            user_id: None,
            url: None,
        }
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names_are_non_empty() {
        for event_type in EventType::ALL {
            assert!(!event_type.as_str().is_empty());
            assert_eq!(event_type.to_string(), event_type.as_str());
        }
    }

    #[test]
    fn test_event_builder_sets_optional_fields() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let bare = Event::new(EventType::View, now);
        assert_eq!(bare.user_id, None);
        assert_eq!(bare.url, None);

        let full = Event::new(EventType::Purchase, now)
            .with_user_id(user_id)
            .with_url("http://example.com");
        assert_eq!(full.event_type, EventType::Purchase);
        assert_eq!(full.timestamp, now);
        assert_eq!(full.user_id, Some(user_id));
        assert_eq!(full.url.as_deref(), Some("http://example.com"));

        // field-by-field equality only
        assert_ne!(bare, full);
        assert_eq!(full.clone(), full);
    }
}
