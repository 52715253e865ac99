//! The in-run identity index.
//!
//! One index lives for the duration of a discovery run and sees every
//! accepted entity, whatever region or query surfaced it. Explicit state
//! owned by the engine, handed to each region's processing in turn.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use parishdb_core::Entity;

use crate::normalize::{coordinate_key, normalize_name, street_prefix};

/// Which identity tier matched an already-recorded entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateTier {
    /// Identical fingerprint: same normalized name, rounded coordinates, and
    /// street prefix. Strongest signal; catches the same physical location
    /// surfacing under two external ids.
    Fingerprint,
    /// Exact match on the API's stable external id.
    PlaceId,
    /// Same normalized name, city, and state, with a matching street prefix.
    Signature,
}

impl std::fmt::Display for DuplicateTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicateTier::Fingerprint => write!(f, "fingerprint"),
            DuplicateTier::PlaceId => write!(f, "place_id"),
            DuplicateTier::Signature => write!(f, "signature"),
        }
    }
}

type Signature = (String, String, String);

/// Three-tier duplicate detector for one discovery run.
pub struct IdentityIndex {
    boilerplate_words: &'static [&'static str],
    fingerprints: HashSet<[u8; 32]>,
    place_ids: HashSet<String>,
    /// Signature → street prefixes recorded under it. Distinct streets under
    /// one signature are legitimate separate branches.
    signatures: HashMap<Signature, Vec<String>>,
}

impl IdentityIndex {
    #[must_use]
    pub fn new(boilerplate_words: &'static [&'static str]) -> Self {
        Self {
            boilerplate_words,
            fingerprints: HashSet::new(),
            place_ids: HashSet::new(),
            signatures: HashMap::new(),
        }
    }

    /// Number of distinct place ids recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.place_ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.place_ids.is_empty()
    }

    /// Whether `place_id` has already been recorded. Used as a cheap
    /// prefilter before spending quota on a detail fetch.
    #[must_use]
    pub fn contains_place_id(&self, place_id: &str) -> bool {
        self.place_ids.contains(place_id)
    }

    /// Checks the fingerprint and place-id tiers only. Used by the final
    /// defensive pass, which deliberately skips the signature heuristic.
    #[must_use]
    pub fn check_strong(&self, entity: &Entity) -> Option<DuplicateTier> {
        if self.fingerprints.contains(&self.fingerprint(entity)) {
            return Some(DuplicateTier::Fingerprint);
        }

        if self.place_ids.contains(&entity.place_id) {
            return Some(DuplicateTier::PlaceId);
        }

        None
    }

    /// Checks all three tiers, first match wins.
    #[must_use]
    pub fn check(&self, entity: &Entity) -> Option<DuplicateTier> {
        if let Some(tier) = self.check_strong(entity) {
            return Some(tier);
        }

        if let Some(streets) = self.signatures.get(&self.signature(entity)) {
            let street = street_prefix(entity.formatted_address.as_deref());
            if streets.iter().any(|s| *s == street) {
                return Some(DuplicateTier::Signature);
            }
        }

        None
    }

    /// Records an entity in all three tiers.
    pub fn record(&mut self, entity: &Entity) {
        self.fingerprints.insert(self.fingerprint(entity));
        self.place_ids.insert(entity.place_id.clone());
        self.signatures
            .entry(self.signature(entity))
            .or_default()
            .push(street_prefix(entity.formatted_address.as_deref()));
    }

    /// Atomic check-then-record: returns the matching tier, or records the
    /// entity and returns `None`. Callers hold the index behind one mutex so
    /// two candidates racing on the same fingerprint cannot both pass.
    pub fn check_and_record(&mut self, entity: &Entity) -> Option<DuplicateTier> {
        let tier = self.check(entity);
        if tier.is_none() {
            self.record(entity);
        }
        tier
    }

    fn fingerprint(&self, entity: &Entity) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(normalize_name(&entity.name, self.boilerplate_words));
        hasher.update([0x1f]);
        hasher.update(coordinate_key(entity.latitude));
        hasher.update([0x1f]);
        hasher.update(coordinate_key(entity.longitude));
        hasher.update([0x1f]);
        hasher.update(street_prefix(entity.formatted_address.as_deref()));
        hasher.finalize().into()
    }

    fn signature(&self, entity: &Entity) -> Signature {
        (
            normalize_name(&entity.name, self.boilerplate_words),
            entity
                .city
                .as_deref()
                .map(str::to_lowercase)
                .unwrap_or_default(),
            entity
                .state
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_default(),
        )
    }
}
