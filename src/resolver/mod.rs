//! Enum resolution: room and function names to device state identifiers
//!
//! The resolver owns an in-memory index over the store's room and function
//! groupings. It answers three questions: which states belong to a given
//! room and/or function (with fuzzy, alias-aware name matching and
//! hierarchical intersection), which single device a free-text fragment
//! refers to, and which of a set of states are currently writable.
//!
//! The index is rebuilt from scratch by [`EnumResolver::load`] and published
//! as one atomic snapshot swap; readers concurrent with a reload observe
//! either the old or the new index, never a mixture.

pub mod alias;

use crate::config::FastPathConfig;
use crate::store::{GroupingKind, ObjectMetadata, ObjectStore, RawGrouping, StateId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One named grouping of device states (a room or a function)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumGroup {
    /// Grouping identifier (e.g. "enum.rooms.wohnzimmer")
    pub id: String,
    /// Display name (e.g. "Wohnzimmer")
    pub name: String,
    /// Member state ids, deduplicated, source order preserved
    pub members: Vec<StateId>,
}

impl EnumGroup {
    /// Trailing path segment of the grouping id, lowercased
    fn trailing_segment(&self) -> String {
        self.id.rsplit('.').next().unwrap_or_default().to_lowercase()
    }
}

/// Immutable index built by one `load()` run
#[derive(Debug, Default)]
pub struct ResolverSnapshot {
    /// Room groupings keyed by grouping id
    pub rooms: BTreeMap<String, EnumGroup>,
    /// Function groupings keyed by grouping id
    pub functions: BTreeMap<String, EnumGroup>,
    /// StateId to owning grouping display names, for context strings only
    pub group_names: BTreeMap<StateId, Vec<String>>,
    /// User-defined states included in device-name search
    pub user_states: Vec<StateId>,
}

/// Result of a room/function resolution
///
/// Distinguishes "name unresolvable" (the matched name is `None` although
/// one was requested) from "resolved but no states" (`state_ids` empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateQuery {
    /// Display name of the matched room grouping, if any
    pub room: Option<String>,
    /// Display name of the matched function grouping, if any
    pub function: Option<String>,
    /// Resolved state ids
    pub state_ids: Vec<StateId>,
}

/// A single unambiguous device matched by name in free text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceMatch {
    /// Matched state id
    pub state_id: StateId,
    /// The significant name that matched (lowercased)
    pub name: String,
}

/// Index over room/function groupings with fuzzy name resolution
pub struct EnumResolver {
    store: Arc<dyn ObjectStore>,
    config: FastPathConfig,
    snapshot: RwLock<Arc<ResolverSnapshot>>,
}

impl EnumResolver {
    /// Create a resolver with an empty index; call [`load`](Self::load)
    /// before first use
    pub fn new(store: Arc<dyn ObjectStore>, config: FastPathConfig) -> Self {
        Self {
            store,
            config,
            snapshot: RwLock::new(Arc::new(ResolverSnapshot::default())),
        }
    }

    /// Rebuild the index from the store and publish it atomically
    ///
    /// Idempotent; safe to call on every (debounced) change notification.
    /// A failed grouping fetch empties that collection with a warning, so
    /// the system degrades to "no enum matches" instead of failing.
    pub async fn load(&self) {
        let rooms = self.fetch_collection(GroupingKind::Room).await;
        let functions = self.fetch_collection(GroupingKind::Function).await;

        let user_states = match self.store.list_states(&self.config.user_states_prefix).await {
            Ok(states) => states,
            Err(e) => {
                warn!(prefix = %self.config.user_states_prefix, error = %e,
                    "listing user-defined states failed, excluding them from device search");
                Vec::new()
            }
        };

        let mut group_names: BTreeMap<StateId, Vec<String>> = BTreeMap::new();
        for group in rooms.values().chain(functions.values()) {
            for member in &group.members {
                group_names
                    .entry(member.clone())
                    .or_default()
                    .push(group.name.clone());
            }
        }

        let snapshot = ResolverSnapshot {
            rooms,
            functions,
            group_names,
            user_states,
        };
        info!(
            rooms = snapshot.rooms.len(),
            functions = snapshot.functions.len(),
            user_states = snapshot.user_states.len(),
            "enum index rebuilt"
        );
        *self.snapshot.write().await = Arc::new(snapshot);
    }

    async fn fetch_collection(&self, kind: GroupingKind) -> BTreeMap<String, EnumGroup> {
        match self.store.fetch_groupings(kind).await {
            Ok(raw) => raw
                .into_iter()
                .map(|(id, grouping)| {
                    let group = build_group(id.clone(), grouping);
                    (id, group)
                })
                .collect(),
            Err(e) => {
                warn!(kind = kind.label(), error = %e,
                    "fetching groupings failed, collection will be empty until next reload");
                BTreeMap::new()
            }
        }
    }

    /// Current index snapshot
    pub async fn snapshot(&self) -> Arc<ResolverSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Find the room grouping mentioned in free text, if any
    pub async fn match_room(&self, text: &str) -> Option<String> {
        let snapshot = self.snapshot().await;
        find_enum(&snapshot.rooms, text).map(|g| g.name.clone())
    }

    /// Find the function grouping mentioned in free text, if any
    pub async fn match_function(&self, text: &str) -> Option<String> {
        let snapshot = self.snapshot().await;
        find_enum(&snapshot.functions, text).map(|g| g.name.clone())
    }

    /// Resolve room and/or function names to state ids
    ///
    /// Both names are resolved independently via fuzzy matching. With both
    /// given, the result is the hierarchical intersection of the two member
    /// sets. A requested name without any fuzzy match yields an empty
    /// result with the corresponding match name unset.
    pub async fn find_states(&self, room: Option<&str>, function: Option<&str>) -> StateQuery {
        let snapshot = self.snapshot().await;

        let room_group = room.and_then(|r| find_enum(&snapshot.rooms, r));
        let function_group = function.and_then(|f| find_enum(&snapshot.functions, f));

        let room_unresolved = room.is_some() && room_group.is_none();
        let function_unresolved = function.is_some() && function_group.is_none();

        let state_ids = if room_unresolved || function_unresolved {
            Vec::new()
        } else {
            match (room_group, function_group) {
                (Some(r), Some(f)) => hierarchical_intersection(&r.members, &f.members),
                (Some(r), None) => r.members.clone(),
                (None, Some(f)) => f.members.clone(),
                (None, None) => Vec::new(),
            }
        };

        debug!(
            room = ?room_group.map(|g| &g.name),
            function = ?function_group.map(|g| &g.name),
            states = state_ids.len(),
            "resolved enum query"
        );

        StateQuery {
            room: room_group.map(|g| g.name.clone()),
            function: function_group.map(|g| g.name.clone()),
            state_ids,
        }
    }

    /// Search all known states for a device named in free text
    ///
    /// Returns a match only if exactly one candidate matches, or if the
    /// longest matching name beats the runner-up by more than the
    /// disambiguation margin. Anything ambiguous yields `None` so the
    /// caller defers to the generative pipeline.
    pub async fn search_by_device_name(&self, text: &str) -> Option<DeviceMatch> {
        let text = text.to_lowercase();
        let snapshot = self.snapshot().await;

        let mut matches: Vec<DeviceMatch> = Vec::new();
        for state_id in candidate_states(&snapshot) {
            let names = self.significant_names(&state_id).await;
            let best = names
                .iter()
                .filter(|name| text.contains(name.as_str()))
                .max_by_key(|name| name.len());
            if let Some(name) = best {
                matches.push(DeviceMatch {
                    state_id,
                    name: name.clone(),
                });
            }
        }

        match matches.len() {
            0 => None,
            1 => matches.into_iter().next(),
            _ => {
                matches.sort_by(|a, b| b.name.len().cmp(&a.name.len()));
                let margin = self.config.disambiguation_margin;
                if matches[0].name.len() > matches[1].name.len() + margin {
                    matches.into_iter().next()
                } else {
                    debug!(
                        first = %matches[0].name,
                        second = %matches[1].name,
                        "device name match ambiguous, deferring"
                    );
                    None
                }
            }
        }
    }

    /// Narrow a multi-state result to the device named in the text
    ///
    /// A name is discriminating if it appears in the text and is owned by
    /// some but not all candidates. The longest discriminating name wins,
    /// ties go to the name with the fewest owners. Without a discriminating
    /// name the input set is returned unchanged.
    pub async fn filter_by_device_name(
        &self,
        state_ids: &[StateId],
        text: &str,
    ) -> (Vec<StateId>, Option<String>) {
        let text = text.to_lowercase();

        let mut owners: BTreeMap<String, Vec<StateId>> = BTreeMap::new();
        for state_id in state_ids {
            for name in self.significant_names(state_id).await {
                if text.contains(name.as_str()) {
                    owners.entry(name).or_default().push(state_id.clone());
                }
            }
        }

        let winner = owners
            .iter()
            .filter(|(_, ids)| !ids.is_empty() && ids.len() < state_ids.len())
            .max_by(|(a_name, a_ids), (b_name, b_ids)| {
                a_name
                    .len()
                    .cmp(&b_name.len())
                    .then(b_ids.len().cmp(&a_ids.len()))
            });

        match winner {
            Some((name, ids)) => {
                debug!(name = %name, states = ids.len(), "narrowed result by device name");
                (ids.clone(), Some(name.clone()))
            }
            None => (state_ids.to_vec(), None),
        }
    }

    /// Keep only states whose live metadata marks them writable
    ///
    /// States without fetchable metadata are silently excluded. Metadata is
    /// returned alongside so the executor does not fetch it a second time.
    pub async fn get_writable_states(
        &self,
        state_ids: &[StateId],
    ) -> Vec<(StateId, ObjectMetadata)> {
        let mut writable = Vec::new();
        for state_id in state_ids {
            match self.store.fetch_object_metadata(state_id).await {
                Ok(Some(meta)) if meta.writable => writable.push((state_id.clone(), meta)),
                Ok(Some(_)) => debug!(state = %state_id, "state not writable, skipping"),
                Ok(None) => debug!(state = %state_id, "no metadata, skipping"),
                Err(e) => debug!(state = %state_id, error = %e, "metadata fetch failed, skipping"),
            }
        }
        writable
    }

    /// Display names of the groupings a state belongs to, for context strings
    pub async fn group_names_for(&self, state_id: &str) -> Vec<String> {
        let snapshot = self.snapshot().await;
        snapshot
            .group_names
            .get(state_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Significant names of a state: the display names along its hierarchy
    /// plus their sub-words, lowercased, without generic or too-short terms
    async fn significant_names(&self, state_id: &str) -> Vec<String> {
        let display_names = match self.store.fetch_display_names(state_id).await {
            Ok(names) => names,
            Err(e) => {
                debug!(state = %state_id, error = %e, "display name fetch failed");
                return Vec::new();
            }
        };

        let mut names = Vec::new();
        for display in display_names {
            let lowered = display.to_lowercase();
            for candidate in std::iter::once(lowered.clone()).chain(tokenize(&lowered)) {
                if !alias::is_insignificant(&candidate, self.config.min_name_length)
                    && !names.contains(&candidate)
                {
                    names.push(candidate);
                }
            }
        }
        names
    }
}

/// Normalize a raw grouping: dedup members, keep first-occurrence order
fn build_group(id: String, raw: RawGrouping) -> EnumGroup {
    let mut seen = HashSet::new();
    let members = raw
        .members
        .into_iter()
        .filter(|m| seen.insert(m.clone()))
        .collect();
    EnumGroup {
        id,
        name: raw.display_name,
        members,
    }
}

/// All states considered for device-name search: every room member, every
/// function member and every user-defined state, deduplicated in order
fn candidate_states(snapshot: &ResolverSnapshot) -> Vec<StateId> {
    let mut seen = HashSet::new();
    snapshot
        .rooms
        .values()
        .chain(snapshot.functions.values())
        .flat_map(|g| g.members.iter())
        .chain(snapshot.user_states.iter())
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}

/// Tiered fuzzy lookup of a grouping by name; first successful tier wins
///
/// Tiers, in order: exact name equality, name contains term, term contains
/// name, trailing id segment equality/containment, shared alias group.
/// The search term may be a bare name or a whole utterance.
pub fn find_enum<'a>(
    groups: &'a BTreeMap<String, EnumGroup>,
    term: &str,
) -> Option<&'a EnumGroup> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return None;
    }

    // Tier 1: exact name equality
    if let Some(g) = groups.values().find(|g| g.name.to_lowercase() == term) {
        return Some(g);
    }

    // Tier 2: grouping name contains the search term
    if term.len() >= 3 {
        if let Some(g) = groups
            .values()
            .find(|g| g.name.to_lowercase().contains(&term))
        {
            return Some(g);
        }
    }

    // Tier 3: search term contains the grouping name
    if let Some(g) = groups.values().find(|g| {
        let name = g.name.to_lowercase();
        name.len() >= 3 && term.contains(&name)
    }) {
        return Some(g);
    }

    // Tier 4: trailing id segment equals / contains / is contained
    if let Some(g) = groups.values().find(|g| {
        let segment = g.trailing_segment();
        if segment.is_empty() {
            return false;
        }
        segment == term
            || (term.len() >= 3 && segment.contains(&term))
            || (segment.len() >= 3 && term.contains(&segment))
    }) {
        return Some(g);
    }

    // Tier 5: the term mentions a synonym of the grouping's name or
    // trailing segment ("lampe" inside "stehlampe" counts)
    groups.values().find(|g| {
        let name = g.name.to_lowercase();
        let segment = g.trailing_segment();
        [name, segment]
            .iter()
            .filter_map(|candidate| alias::alias_group_of(candidate))
            .flatten()
            .any(|synonym| synonym.len() >= 3 && term.contains(synonym))
    })
}

/// Hierarchical set intersection over dot-separated state ids
///
/// A member of one set matches a member of the other if the ids are equal
/// or one is a strict path-child of the other; the deeper id is the one
/// included in the result.
pub fn hierarchical_intersection(
    room_members: &[StateId],
    function_members: &[StateId],
) -> Vec<StateId> {
    let function_set: HashSet<&str> = function_members.iter().map(String::as_str).collect();

    let mut result: Vec<StateId> = Vec::new();
    let mut push_unique = |id: &str| {
        if !result.iter().any(|existing| existing == id) {
            result.push(id.to_string());
        }
    };

    for room_member in room_members {
        if function_set.contains(room_member.as_str()) {
            push_unique(room_member);
            continue;
        }
        for function_member in function_members {
            if is_path_child(function_member, room_member) {
                // function member sits below the room's device-level id
                push_unique(function_member);
            } else if is_path_child(room_member, function_member) {
                // room member sits below the function's device-level id
                push_unique(room_member);
            }
        }
    }
    result
}

/// Whether `child` is a strict path-child of `parent` in the dot hierarchy
fn is_path_child(child: &str, parent: &str) -> bool {
    child.len() > parent.len()
        && child.starts_with(parent)
        && child.as_bytes()[parent.len()] == b'.'
}

/// Lowercased alphanumeric tokens of a text (umlauts included)
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}
