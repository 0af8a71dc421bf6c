//! Profile document codec: JSON in both directions, with the minimal shape
//! check applied on the way in.

use std::collections::HashSet;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{ser::PrettyFormatter, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{
    clamp_progress, new_id, EntityId, Profile, Project, TaskGroup, TaskItem, TaskList,
};

const PRETTY_INDENT: &[u8] = b"    ";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Why a byte payload could not become a `Profile`.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Bytes are not valid JSON.
    #[error("malformed json: {0}")]
    MalformedJson(#[source] serde_json::Error),
    /// Valid JSON, but not a profile document.
    #[error("invalid profile shape: {reason}")]
    InvalidShape { reason: String },
    /// Serializing the live document failed.
    #[error("failed to encode profile: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Output layout for `encode_profile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Single line; used for the auto-saved slot.
    Compact,
    /// Indented for human-readable exports.
    Pretty,
}

pub fn encode_profile(profile: &Profile, layout: Layout) -> Result<Vec<u8>, CodecError> {
    match layout {
        Layout::Compact => serde_json::to_vec(profile).map_err(CodecError::Encode),
        Layout::Pretty => {
            let mut buf = Vec::new();
            let formatter = PrettyFormatter::with_indent(PRETTY_INDENT);
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            profile.serialize(&mut ser).map_err(CodecError::Encode)?;
            Ok(buf)
        }
    }
}

/// Decode a profile document.
///
/// The only structural requirement is a top-level `projects` array. Missing
/// fields take their defaults; present fields must have the right type. The
/// decoded tree is normalized before it is returned (see [`normalize`]).
pub fn decode_profile(bytes: &[u8]) -> Result<Profile, CodecError> {
    let value = parse(bytes)?;

    match value.get("projects").or_else(|| value.get("Projects")) {
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(CodecError::InvalidShape {
                reason: "`projects` is not a sequence".to_string(),
            })
        }
        None => {
            return Err(CodecError::InvalidShape {
                reason: "missing `projects` sequence".to_string(),
            })
        }
    }

    into_profile(value)
}

/// Decode a document this program persisted earlier, dropping values whose
/// type does not fit instead of rejecting the whole document.
///
/// Dropped fields take their defaults and non-object entries of an entity
/// sequence are skipped. Returns the profile and the number of values
/// dropped. Bytes that are not a JSON object still fail.
pub fn decode_stored_profile(bytes: &[u8]) -> Result<(Profile, usize), CodecError> {
    let value = parse(bytes)?;
    if !value.is_object() {
        return Err(CodecError::InvalidShape {
            reason: "document is not an object".to_string(),
        });
    }

    let mut salvage = Salvage::default();
    let value = salvage.profile(value).unwrap_or_default();
    Ok((into_profile(value)?, salvage.dropped))
}

fn parse(bytes: &[u8]) -> Result<Value, CodecError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    serde_json::from_slice(bytes).map_err(CodecError::MalformedJson)
}

fn into_profile(value: Value) -> Result<Profile, CodecError> {
    let mut profile: Profile =
        serde_json::from_value(value).map_err(|err| CodecError::InvalidShape {
            reason: err.to_string(),
        })?;

    let repairs = normalize(&mut profile);
    if repairs > 0 {
        debug!(repairs, "normalized decoded profile");
    }
    Ok(profile)
}

/// Entity sequence inside a document: its key in both spellings and how to
/// salvage one entry.
type Nested = ([&'static str; 2], fn(&mut Salvage, Value) -> Option<Value>);

#[derive(Debug, Default)]
struct Salvage {
    dropped: usize,
}

impl Salvage {
    fn profile(&mut self, value: Value) -> Option<Value> {
        self.entity::<Profile>(value, &[(["projects", "Projects"], Self::project)])
    }

    fn project(&mut self, value: Value) -> Option<Value> {
        self.entity::<Project>(value, &[(["taskLists", "TaskLists"], Self::list)])
    }

    fn list(&mut self, value: Value) -> Option<Value> {
        self.entity::<TaskList>(
            value,
            &[
                (["ungroupedTasks", "UngroupedTasks"], Self::task),
                (["taskGroups", "TaskGroups"], Self::group),
            ],
        )
    }

    fn group(&mut self, value: Value) -> Option<Value> {
        self.entity::<TaskGroup>(value, &[(["tasks", "Tasks"], Self::task)])
    }

    fn task(&mut self, value: Value) -> Option<Value> {
        self.entity::<TaskItem>(value, &[])
    }

    /// Keep the fields of `value` that decode as part of `T`, after salvaging
    /// the entity sequences in `nested` entry by entry.
    fn entity<T: DeserializeOwned>(&mut self, value: Value, nested: &[Nested]) -> Option<Value> {
        let Value::Object(mut fields) = value else {
            self.drop_value("entry");
            return None;
        };

        for (keys, salvage_entry) in nested {
            for key in keys {
                match fields.remove(*key) {
                    Some(Value::Array(entries)) => {
                        let kept = entries
                            .into_iter()
                            .filter_map(|entry| salvage_entry(self, entry))
                            .collect();
                        fields.insert((*key).to_string(), Value::Array(kept));
                    }
                    Some(_) => self.drop_value(key),
                    None => {}
                }
            }
        }

        let keys: Vec<String> = fields.keys().cloned().collect();
        for key in keys {
            let mut single = Map::new();
            if let Some(field) = fields.get(&key) {
                single.insert(key.clone(), field.clone());
            }
            if serde_json::from_value::<T>(Value::Object(single)).is_err() {
                fields.remove(&key);
                self.drop_value(&key);
            }
        }
        Some(Value::Object(fields))
    }

    fn drop_value(&mut self, key: &str) {
        warn!(key, "dropping unreadable value from stored profile");
        self.dropped += 1;
    }
}

/// Repair invariants a hand-edited document may break. Returns the number of
/// repairs; a document that already holds every invariant is left untouched.
///
/// - ids are non-empty and unique across the whole document
/// - `progress` lies in `[0, 100]`
/// - `completedAt` is present exactly when `isCompleted` is true
/// - only deleted tasks carry the group cascade marker
pub fn normalize(profile: &mut Profile) -> usize {
    let mut seen = HashSet::new();
    let mut repairs = 0;

    for project in &mut profile.projects {
        repairs += claim_id(&mut project.id, &mut seen);
        for list in &mut project.task_lists {
            repairs += claim_id(&mut list.id, &mut seen);
            for task in &mut list.ungrouped_tasks {
                repairs += normalize_task(task, &mut seen);
            }
            for group in &mut list.task_groups {
                repairs += claim_id(&mut group.id, &mut seen);
                for task in &mut group.tasks {
                    repairs += normalize_task(task, &mut seen);
                }
            }
        }
    }
    repairs
}

fn normalize_task(task: &mut TaskItem, seen: &mut HashSet<EntityId>) -> usize {
    let mut repairs = claim_id(&mut task.id, seen);

    let clamped = clamp_progress(task.progress);
    if clamped != task.progress {
        task.progress = clamped;
        repairs += 1;
    }

    if task.deleted_with_group && !task.is_deleted {
        task.deleted_with_group = false;
        repairs += 1;
    }

    match (task.is_completed, task.completed_at) {
        (true, None) => {
            task.completed_at = Some(task.updated_at);
            repairs += 1;
        }
        (false, Some(_)) => {
            task.completed_at = None;
            repairs += 1;
        }
        _ => {}
    }
    repairs
}

fn claim_id(id: &mut EntityId, seen: &mut HashSet<EntityId>) -> usize {
    if !id.trim().is_empty() && seen.insert(id.clone()) {
        return 0;
    }
    *id = new_id();
    seen.insert(id.clone());
    1
}
