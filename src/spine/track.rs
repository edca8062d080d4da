//! Persistent track identity.
//!
//! Tracks are numbered 1, 2, 3, ... in order of discovery and the numbers
//! are never reused, so a track id taken from one line stays meaningful at
//! every other line of the file, including across `*-` / `**` section
//! boundaries.

use std::fmt;

use serde::Serialize;

use crate::error::AnalysisWarning;

/// 1-based persistent track number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One spine lineage from creation to termination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub id: TrackId,
    /// Exclusive interpretation without the `**` sigil. `None` until the
    /// spine is named; spines opened by `*+` start unnamed.
    pub ex_interp: Option<String>,
    /// Line that opened the spine.
    pub created: usize,
    /// Line of the `*-` that removed the spine's last position, or `None`
    /// while the track is still open.
    pub terminated: Option<usize>,
}

/// Arena of every track the file ever creates, in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRegistry {
    tracks: Vec<Track>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracks ever created.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.tracks.get(i))
    }

    /// Exclusive interpretation of a track, if the track exists and has
    /// been named.
    pub fn ex_interp(&self, id: TrackId) -> Option<&str> {
        self.get(id).and_then(|t| t.ex_interp.as_deref())
    }

    /// Whether the track has seen its `*-`.
    pub fn is_terminated(&self, id: TrackId) -> bool {
        self.get(id).is_some_and(|t| t.terminated.is_some())
    }

    /// All tracks carrying the given exclusive interpretation, in id order.
    pub fn with_ex_interp(&self, name: &str) -> Vec<TrackId> {
        self.tracks
            .iter()
            .filter(|t| t.ex_interp.as_deref() == Some(name))
            .map(|t| t.id)
            .collect()
    }

    /// Allocate the next id. Ids are handed out in discovery order and
    /// never revoked.
    pub(crate) fn create(&mut self, ex_interp: Option<String>, line: usize) -> TrackId {
        let id = TrackId(self.tracks.len() as u32 + 1);
        self.tracks.push(Track {
            id,
            ex_interp,
            created: line,
            terminated: None,
        });
        id
    }

    /// Name a track. Renaming to the same name is a no-op; a different name
    /// is rejected with the existing one.
    pub(crate) fn set_ex_interp(&mut self, id: TrackId, name: &str) -> Result<(), String> {
        let track = match (id.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.tracks.get_mut(i))
        {
            Some(t) => t,
            None => return Ok(()),
        };
        match &track.ex_interp {
            None => {
                track.ex_interp = Some(name.to_string());
                Ok(())
            }
            Some(existing) if existing == name => Ok(()),
            Some(existing) => Err(existing.clone()),
        }
    }

    pub(crate) fn terminate(&mut self, id: TrackId, line: usize) {
        if let Some(track) = (id.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.tracks.get_mut(i))
        {
            if track.terminated.is_none() {
                track.terminated = Some(line);
            }
        }
    }

    /// Warnings for tracks still open when the file ends.
    pub(crate) fn unterminated_warnings(&self) -> Vec<AnalysisWarning> {
        self.tracks
            .iter()
            .filter(|t| t.terminated.is_none())
            .map(|t| AnalysisWarning::UnterminatedTrack {
                track: t.id,
                ex_interp: t.ex_interp.clone(),
                created: t.created,
            })
            .collect()
    }
}
