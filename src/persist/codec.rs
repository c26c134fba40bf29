use std::collections::BTreeMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{KvStore, PersistError, Snapshot, WriteBatch};
use crate::atomspace::{Atom, AtomKind};
use crate::{AtomId, AtomSpace, AttentionValue, ColumnFamily, LinkType, NodeType, TruthValue};

pub const META_NEXT_ID: &[u8] = b"next_id";
pub const META_COMMITTED_AT: &[u8] = b"committed_at";

/// Largest atom id a restore accepts when no id counter was persisted.
pub const MAX_RESTORED_ID: u64 = 1 << 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_type: NodeType,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub link_type: LinkType,
    pub outgoing: Vec<AtomId>,
}

fn put_atom(batch: &mut WriteBatch, atom: &Atom) -> Result<(), PersistError> {
    let key = atom.id().to_key();
    match atom.kind() {
        AtomKind::Node { node_type, name } => {
            let record = NodeRecord {
                node_type: *node_type,
                name: name.clone(),
            };
            batch.put_json(ColumnFamily::Nodes, key, &record)?;
        }
        AtomKind::Link { link_type, outgoing } => {
            let record = LinkRecord {
                link_type: *link_type,
                outgoing: outgoing.clone(),
            };
            batch.put_json(ColumnFamily::Links, key, &record)?;
            batch.put_json(ColumnFamily::Outgoing, key, outgoing)?;
        }
    }
    let incoming: Vec<AtomId> = atom.incoming().collect();
    batch.put_json(ColumnFamily::Incoming, key, &incoming)?;
    batch.put_json(ColumnFamily::TruthValues, key, &atom.truth_value())?;
    batch.put_json(ColumnFamily::Attention, key, &atom.attention_value())?;
    match atom.tensor() {
        Some(handle) => batch.put_json(ColumnFamily::Default, key, handle)?,
        None => batch.delete(ColumnFamily::Default, key),
    }
    Ok(())
}

fn put_metadata(batch: &mut WriteBatch, space: &AtomSpace) -> Result<(), PersistError> {
    batch.put_json(ColumnFamily::Metadata, META_NEXT_ID, &space.next_id().raw())?;
    batch.put_json(ColumnFamily::Metadata, META_COMMITTED_AT, &Utc::now().to_rfc3339())?;
    Ok(())
}

/// One atomic batch for everything in `changes`.
///
/// Surviving atoms that were touched are rewritten in full; removed atoms are
/// deleted from every per-atom family. Metadata is always refreshed.
pub fn batch_for_changes(
    space: &AtomSpace,
    changes: &crate::ChangeSet,
) -> Result<WriteBatch, PersistError> {
    let mut batch = WriteBatch::new();
    for id in changes.touched() {
        if let Some(atom) = space.get(id) {
            put_atom(&mut batch, atom)?;
        }
    }
    for id in &changes.removed {
        let key = id.to_key();
        for family in ColumnFamily::PER_ATOM {
            batch.delete(family, key);
        }
        batch.delete(ColumnFamily::Default, key);
    }
    put_metadata(&mut batch, space)?;
    Ok(batch)
}

/// A batch holding the whole space.
pub fn batch_for_space(space: &AtomSpace) -> Result<WriteBatch, PersistError> {
    let mut batch = WriteBatch::new();
    for atom in space.iter() {
        put_atom(&mut batch, atom)?;
    }
    put_metadata(&mut batch, space)?;
    Ok(batch)
}

fn decode<T: DeserializeOwned>(family: ColumnFamily, key: &[u8], value: &[u8]) -> Result<T, PersistError> {
    serde_json::from_slice(value).map_err(|err| {
        debug!(family = family.name(), %err, "undecodable record");
        PersistError::Corrupt {
            family,
            key: key.to_vec(),
        }
    })
}

fn decode_id(family: ColumnFamily, key: &[u8]) -> Result<AtomId, PersistError> {
    AtomId::from_key(key).ok_or_else(|| PersistError::Corrupt {
        family,
        key: key.to_vec(),
    })
}

fn read_opt<T: DeserializeOwned>(
    snap: &Snapshot,
    family: ColumnFamily,
    key: &[u8],
) -> Result<Option<T>, PersistError> {
    snap.get(family, key)
        .map(|value| decode(family, key, value))
        .transpose()
}

/// Rebuild an AtomSpace from a store: same ids, types, truth and attention
/// values, tensor attachments and id counter. Reads one snapshot.
pub fn restore(store: &impl KvStore) -> Result<AtomSpace, PersistError> {
    let snap = store.snapshot()?;

    // The arena is dense, so every id must sit below the persisted counter.
    let next_id = read_opt::<u64>(&snap, ColumnFamily::Metadata, META_NEXT_ID)?;
    let bound = match next_id {
        Some(next) if next > MAX_RESTORED_ID + 1 => {
            return Err(PersistError::Corrupt {
                family: ColumnFamily::Metadata,
                key: META_NEXT_ID.to_vec(),
            });
        }
        Some(next) => next,
        None => MAX_RESTORED_ID + 1,
    };
    let bounded_id = |family: ColumnFamily, key: &[u8]| -> Result<AtomId, PersistError> {
        decode_id(family, key).and_then(|id| {
            if id.raw() < bound {
                Ok(id)
            } else {
                debug!(family = family.name(), atom = id.raw(), bound, "atom id out of range");
                Err(PersistError::Corrupt {
                    family,
                    key: key.to_vec(),
                })
            }
        })
    };

    let mut kinds: BTreeMap<AtomId, AtomKind> = BTreeMap::new();
    for (key, value) in snap.iter(ColumnFamily::Nodes) {
        let id = bounded_id(ColumnFamily::Nodes, key)?;
        let record: NodeRecord = decode(ColumnFamily::Nodes, key, value)?;
        kinds.insert(
            id,
            AtomKind::Node {
                node_type: record.node_type,
                name: record.name,
            },
        );
    }
    for (key, value) in snap.iter(ColumnFamily::Links) {
        let id = bounded_id(ColumnFamily::Links, key)?;
        let record: LinkRecord = decode(ColumnFamily::Links, key, value)?;
        kinds.insert(
            id,
            AtomKind::Link {
                link_type: record.link_type,
                outgoing: record.outgoing,
            },
        );
    }

    let mut space = AtomSpace::new();
    for (id, kind) in kinds {
        let key = id.to_key();
        let family = if matches!(kind, AtomKind::Node { .. }) {
            ColumnFamily::Nodes
        } else {
            ColumnFamily::Links
        };
        let tv: TruthValue =
            read_opt(&snap, ColumnFamily::TruthValues, &key)?.unwrap_or_default();
        let av: AttentionValue =
            read_opt(&snap, ColumnFamily::Attention, &key)?.unwrap_or_default();
        let tensor = read_opt(&snap, ColumnFamily::Default, &key)?;

        space
            .restore_atom(id, kind, tv, av, tensor)
            .map_err(|err| {
                debug!(atom = id.raw(), %err, "dangling record");
                PersistError::Corrupt {
                    family,
                    key: key.to_vec(),
                }
            })?;
    }

    if let Some(next) = next_id {
        space.bump_next_id(next);
    }
    debug!(atoms = space.len(), next_id = space.next_id().raw(), "restored atomspace");
    Ok(space)
}
