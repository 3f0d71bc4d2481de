use crate::error::{MuseError, Result};
use crate::index::DocId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use time::OffsetDateTime;

/// Kind of content a clip captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Text,
    Url,
    Image,
}

/// Authoritative clip record. `id` is assigned once by the store and never
/// reused, even after deletion; `created_at` is set once at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: DocId,
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub content: String,
    pub url: Option<String>,
    pub title: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields a caller supplies when creating or replacing a clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClip {
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

const NEXT_ID_KEY: &[u8] = b"next_id";

/// sled-backed record store for clips.
///
/// Two trees: `clips` maps big-endian id -> bincode clip, `meta` holds the
/// id counter. The counter starts at 1 and only moves forward; deleting a
/// clip never frees its id.
pub struct ClipStore {
    db: sled::Db,
    clips: sled::Tree,
    meta: sled::Tree,
}

impl ClipStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let clips = db.open_tree("clips")?;
        let meta = db.open_tree("meta")?;
        Ok(Self { db, clips, meta })
    }

    fn next_id(&self) -> Result<DocId> {
        let bumped = self.meta.update_and_fetch(NEXT_ID_KEY, |old| {
            let cur = old
                .map(|b| {
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(b);
                    u64::from_be_bytes(buf)
                })
                .unwrap_or(0);
            Some((cur + 1).to_be_bytes().to_vec())
        })?;
        let bytes = bumped.ok_or_else(|| MuseError::Store(sled::Error::ReportableBug(
            "id counter vanished during update".into(),
        )))?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&bytes);
        Ok(u64::from_be_bytes(buf))
    }

    /// Insert a new clip, assigning its id and creation timestamp.
    pub fn insert(&self, new: NewClip) -> Result<Clip> {
        let clip = Clip {
            id: self.next_id()?,
            kind: new.kind,
            content: new.content,
            url: new.url,
            title: new.title,
            created_at: OffsetDateTime::now_utc(),
        };
        let bytes = bincode::serialize(&clip)?;
        self.clips.insert(clip.id.to_be_bytes(), bytes)?;
        self.db.flush()?;
        Ok(clip)
    }

    /// Replace the stored record for `id`, keeping id and created_at.
    /// Returns the previous record image.
    pub fn update(&self, id: DocId, new: NewClip) -> Result<(Clip, Clip)> {
        let old = self.get(id)?.ok_or(MuseError::NotFound(id))?;
        let clip = Clip {
            id,
            kind: new.kind,
            content: new.content,
            url: new.url,
            title: new.title,
            created_at: old.created_at,
        };
        let bytes = bincode::serialize(&clip)?;
        self.clips.insert(id.to_be_bytes(), bytes)?;
        self.db.flush()?;
        Ok((old, clip))
    }

    /// Delete the record for `id`, returning its last image.
    pub fn delete(&self, id: DocId) -> Result<Clip> {
        let old = self
            .clips
            .remove(id.to_be_bytes())?
            .ok_or(MuseError::NotFound(id))?;
        self.db.flush()?;
        Ok(bincode::deserialize(&old)?)
    }

    pub fn get(&self, id: DocId) -> Result<Option<Clip>> {
        match self.clips.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All clips, newest first (created_at desc, id desc as tie-break).
    pub fn list(&self) -> Result<Vec<Clip>> {
        let mut clips = Vec::new();
        for entry in self.clips.iter() {
            let (_k, bytes) = entry?;
            clips.push(bincode::deserialize::<Clip>(&bytes)?);
        }
        clips.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(clips)
    }
}
