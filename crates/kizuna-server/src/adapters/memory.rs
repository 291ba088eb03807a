//! In-memory implementation of every repository port (tests only)
//!
//! A single mutex guards all state, so each port call is atomic. Flags let
//! tests inject persistence failures and compare-and-set conflicts.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use kizuna::{
    Connection, ConnectionRepository, ConnectionRequest, DomainError, PairState, PairTransition,
    Profile, ProfileRepository, Recommendation, RecommendationRepository, UserPair, WeightVector,
};

#[derive(Default)]
struct State {
    profiles: BTreeMap<Uuid, Profile>,
    weights: HashMap<Uuid, WeightVector>,
    recommendations: HashMap<Uuid, Vec<Recommendation>>,
    pending: HashMap<(Uuid, Uuid), DateTime<Utc>>,
    connections: HashMap<UserPair, DateTime<Utc>>,
}

impl State {
    fn pair_state(&self, pair: UserPair) -> PairState {
        let rows: Vec<(Uuid, Uuid)> = [(pair.low(), pair.high()), (pair.high(), pair.low())]
            .into_iter()
            .filter(|key| self.pending.contains_key(key))
            .collect();
        PairState::from_rows(pair, &rows, self.connections.contains_key(&pair))
    }

    fn drop_recommendations_between(&mut self, a: Uuid, b: Uuid) {
        for (viewer, candidate) in [(a, b), (b, a)] {
            if let Some(entries) = self.recommendations.get_mut(&viewer) {
                entries.retain(|entry| entry.candidate_id != candidate);
            }
        }
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_writes: AtomicBool,
    always_conflict: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_profile(&self, profile: Profile) {
        self.state
            .lock()
            .unwrap()
            .profiles
            .insert(profile.user_id, profile);
    }

    pub fn insert_weights(&self, user_id: Uuid, weights: WeightVector) {
        self.state.lock().unwrap().weights.insert(user_id, weights);
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn connection_count(&self) -> usize {
        self.state.lock().unwrap().connections.len()
    }

    pub fn recommendation_count(&self, viewer_id: Uuid) -> usize {
        self.state
            .lock()
            .unwrap()
            .recommendations
            .get(&viewer_id)
            .map_or(0, Vec::len)
    }

    /// Make every write fail with a repository error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every compare-and-set lose
    pub fn set_always_conflict(&self, conflict: bool) {
        self.always_conflict.store(conflict, Ordering::SeqCst);
    }

    /// Move a pending request's creation time into the past
    pub fn backdate_request(&self, requester: Uuid, target: Uuid, age: chrono::Duration) {
        if let Some(created_at) = self
            .state
            .lock()
            .unwrap()
            .pending
            .get_mut(&(requester, target))
        {
            *created_at = Utc::now() - age;
        }
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Repository("injected write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self.state.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn find_weights(&self, user_id: Uuid) -> Result<Option<WeightVector>, DomainError> {
        Ok(self.state.lock().unwrap().weights.get(&user_id).copied())
    }

    async fn find_candidates(&self, viewer_id: Uuid) -> Result<Vec<Profile>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .profiles
            .values()
            .filter(|profile| profile.user_id != viewer_id)
            .cloned()
            .collect())
    }

    async fn list_profile_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        Ok(self.state.lock().unwrap().profiles.keys().copied().collect())
    }
}

#[async_trait]
impl RecommendationRepository for InMemoryStore {
    async fn replace_for_viewer(
        &self,
        viewer_id: Uuid,
        entries: &[Recommendation],
    ) -> Result<Vec<Recommendation>, DomainError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();

        let stored: Vec<Recommendation> = entries
            .iter()
            .filter(|entry| match UserPair::new(viewer_id, entry.candidate_id) {
                Ok(pair) => !state.pair_state(pair).is_connected_or_pending(),
                Err(_) => false,
            })
            .cloned()
            .collect();

        state.recommendations.insert(viewer_id, stored.clone());
        Ok(stored)
    }

    async fn find_by_viewer(&self, viewer_id: Uuid) -> Result<Vec<Recommendation>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .recommendations
            .get(&viewer_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryStore {
    async fn pair_state(&self, pair: UserPair) -> Result<PairState, DomainError> {
        Ok(self.state.lock().unwrap().pair_state(pair))
    }

    async fn commit_transition(&self, transition: &PairTransition) -> Result<bool, DomainError> {
        self.check_writable()?;
        if self.always_conflict.load(Ordering::SeqCst) {
            return Ok(false);
        }

        let mut state = self.state.lock().unwrap();
        let pair = transition.pair;
        if state.pair_state(pair) != transition.from {
            return Ok(false);
        }

        let retained = transition.retained_request();
        for key in [(pair.low(), pair.high()), (pair.high(), pair.low())] {
            if Some(key) != retained {
                state.pending.remove(&key);
            }
        }
        if let Some(key) = retained {
            state.pending.entry(key).or_insert_with(Utc::now);
        }
        if transition.to == PairState::Connected {
            state.connections.entry(pair).or_insert_with(Utc::now);
        }
        if transition.clears_recommendations() {
            state.drop_recommendations_between(pair.low(), pair.high());
        }

        Ok(true)
    }

    async fn find_excluded_users(&self, user_id: Uuid) -> Result<HashSet<Uuid>, DomainError> {
        let state = self.state.lock().unwrap();
        let pending = state.pending.keys().filter_map(|&(requester, target)| {
            if requester == user_id {
                Some(target)
            } else if target == user_id {
                Some(requester)
            } else {
                None
            }
        });
        let connected = state.connections.keys().filter_map(|pair| pair.other(user_id));
        Ok(pending.chain(connected).collect())
    }

    async fn expire_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        self.check_writable()?;
        let mut state = self.state.lock().unwrap();
        let before = state.pending.len();
        state.pending.retain(|_, created_at| *created_at >= cutoff);
        Ok((before - state.pending.len()) as u64)
    }

    async fn find_connections(&self, user_id: Uuid) -> Result<Vec<Connection>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut connections: Vec<Connection> = state
            .connections
            .iter()
            .filter(|(pair, _)| pair.contains(user_id))
            .map(|(pair, created_at)| Connection {
                user_a: pair.low(),
                user_b: pair.high(),
                created_at: *created_at,
            })
            .collect();
        connections.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(connections)
    }

    async fn find_incoming(&self, user_id: Uuid) -> Result<Vec<ConnectionRequest>, DomainError> {
        Ok(self.requests_matching(|_, target| target == user_id))
    }

    async fn find_outgoing(&self, user_id: Uuid) -> Result<Vec<ConnectionRequest>, DomainError> {
        Ok(self.requests_matching(|requester, _| requester == user_id))
    }
}

impl InMemoryStore {
    fn requests_matching<F>(&self, keep: F) -> Vec<ConnectionRequest>
    where
        F: Fn(Uuid, Uuid) -> bool,
    {
        let state = self.state.lock().unwrap();
        let mut requests: Vec<ConnectionRequest> = state
            .pending
            .iter()
            .filter(|((requester, target), _)| keep(*requester, *target))
            .map(|(&(requester_id, target_id), created_at)| ConnectionRequest {
                requester_id,
                target_id,
                created_at: *created_at,
            })
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }
}
