//! Room roamer bookkeeping: candidate pool, visited rooms and the roam log.
//!
//! The three collections share one lock in the use case layer; this type only
//! holds the data and the selection rules.

use std::collections::{HashMap, VecDeque};

use rand::{Rng, seq::SliceRandom};

/// One room the roamer has visited, keyed by its lowercased name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedRoomRecord {
    pub room_name: String,
    pub last_visited_at: i64,
}

/// Outcome of one roam action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoamLogEntry {
    pub room_name: String,
    pub visited_at: i64,
    pub prize: String,
}

#[derive(Debug)]
pub struct RoamBook {
    /// lowercased name -> display name
    roamable: HashMap<String, String>,
    visited: HashMap<String, VisitedRoomRecord>,
    log: VecDeque<RoamLogEntry>,
    visit_ttl_millis: i64,
    log_capacity: usize,
}

impl RoamBook {
    pub fn new(visit_ttl_millis: i64, log_capacity: usize) -> Self {
        Self {
            roamable: HashMap::new(),
            visited: HashMap::new(),
            log: VecDeque::new(),
            visit_ttl_millis,
            log_capacity: log_capacity.max(1),
        }
    }

    /// Feed a room listing; rooms with someone inside become roamable
    pub fn observe_rooms<'a, I>(&mut self, rooms: I) -> usize
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut added = 0;
        for (name, occupancy) in rooms {
            let name = name.trim();
            if name.is_empty() || occupancy == 0 {
                continue;
            }
            if self
                .roamable
                .insert(name.to_lowercase(), name.to_string())
                .is_none()
            {
                added += 1;
            }
        }
        added
    }

    pub fn roamable_count(&self) -> usize {
        self.roamable.len()
    }

    /// Delete visited records older than the TTL
    pub fn purge_expired(&mut self, now: i64) {
        let ttl = self.visit_ttl_millis;
        self.visited
            .retain(|_, record| now - record.last_visited_at < ttl);
    }

    /// Whether the room has a non-expired visit record
    pub fn is_visited(&self, name: &str, now: i64) -> bool {
        self.visited
            .get(&name.to_lowercase())
            .is_some_and(|record| now - record.last_visited_at < self.visit_ttl_millis)
    }

    /// Roamable rooms minus visited and excluded ones, sorted for determinism
    pub fn candidates(&mut self, now: i64, excluded: &[String]) -> Vec<String> {
        self.purge_expired(now);
        let excluded: Vec<String> = excluded.iter().map(|name| name.to_lowercase()).collect();

        let mut candidates: Vec<String> = self
            .roamable
            .iter()
            .filter(|(key, _)| !self.visited.contains_key(*key))
            .filter(|(key, _)| !excluded.contains(*key))
            .map(|(_, display)| display.clone())
            .collect();
        candidates.sort();
        candidates
    }

    /// Pick one candidate uniformly at random
    pub fn pick<R: Rng + ?Sized>(
        &mut self,
        now: i64,
        excluded: &[String],
        rng: &mut R,
    ) -> Option<String> {
        self.candidates(now, excluded).choose(rng).cloned()
    }

    /// Record a finished roam: refresh the visit and append to the log
    pub fn record_visit(&mut self, room_name: &str, now: i64, prize: String) -> RoamLogEntry {
        self.visited.insert(
            room_name.to_lowercase(),
            VisitedRoomRecord {
                room_name: room_name.to_string(),
                last_visited_at: now,
            },
        );

        let entry = RoamLogEntry {
            room_name: room_name.to_string(),
            visited_at: now,
            prize,
        };
        self.log.push_back(entry.clone());
        while self.log.len() > self.log_capacity {
            self.log.pop_front();
        }
        entry
    }

    /// Log entries inside the retention window, oldest first
    pub fn recent_log(&mut self, now: i64) -> Vec<RoamLogEntry> {
        let ttl = self.visit_ttl_millis;
        self.log.retain(|entry| now - entry.visited_at < ttl);
        self.log.iter().cloned().collect()
    }
}
