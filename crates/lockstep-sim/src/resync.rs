//! Recovering a diverged peer from another peer's snapshot.
//!
//! Lockstep peers compare [`Game::state_hash`] at fixed frames. When the
//! hashes differ, the peer that is behind asks a healthy peer for its
//! snapshot and replaces its own state with it. The snapshot travels with
//! the hash the sender computed, so transport corruption is caught before
//! anything is decoded.

use lockstep_snapshot::{peek_header, state_hash, SnapshotConfig};
use serde::{Deserialize, Serialize};

use crate::game::Game;

/// A snapshot offered by a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSnapshot {
    /// BLAKE3 hex hash the sender computed over `bytes`.
    pub state_hash: String,
    pub bytes: Vec<u8>,
}

impl PeerSnapshot {
    /// Package the current state of `game` for sending.
    pub fn capture(game: &Game) -> Result<Self, anyhow::Error> {
        let snapshot = game
            .save(&SnapshotConfig::default())
            .map_err(|e| anyhow::anyhow!("failed to snapshot game for resync: {e}"))?;
        Ok(Self {
            state_hash: snapshot.state_hash(),
            bytes: snapshot.into_bytes(),
        })
    }
}

/// Outcome of a successful [`resync_from_peer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResyncReport {
    /// Byte offset of the first difference between the local and the peer
    /// snapshot, or `None` if the local state already matched.
    pub first_divergence: Option<usize>,
    pub objects: usize,
    pub events: usize,
}

/// Replace `local` with the state in `peer`.
///
/// # Errors
///
/// Returns an error if the bytes do not match the advertised hash, if they
/// do not decode with the local settings, or if the decoded state does not
/// re-encode to the same bytes. All checks run on a scratch game, so on
/// error `local` is unmodified.
pub fn resync_from_peer(
    local: &mut Game,
    peer: &PeerSnapshot,
    config: &SnapshotConfig,
) -> Result<ResyncReport, anyhow::Error> {
    let received_hash = state_hash(&peer.bytes);
    if received_hash != peer.state_hash {
        return Err(anyhow::anyhow!(
            "peer snapshot hash mismatch: advertised {} but received {}. \
             The snapshot was corrupted in transit.",
            peer.state_hash,
            received_hash
        ));
    }
    let header = peek_header(&peer.bytes)
        .map_err(|e| anyhow::anyhow!("peer snapshot has an unreadable header: {e}"))?;

    let restored = Game::load(local.settings().clone(), &peer.bytes, config)
        .map_err(|e| anyhow::anyhow!("failed to restore peer snapshot: {e}"))?;
    let reencoded = restored
        .save(&SnapshotConfig::default())
        .map_err(|e| anyhow::anyhow!("failed to re-encode restored game: {e}"))?;
    // Older formats re-encode at the current version, so only a current
    // snapshot can be compared byte for byte.
    if header.format_version == reencoded.header().format_version
        && reencoded.bytes() != peer.bytes.as_slice()
    {
        return Err(anyhow::anyhow!(
            "restored game re-encodes differently from the peer snapshot (first difference at byte {})",
            first_divergence(reencoded.bytes(), &peer.bytes).unwrap_or_default()
        ));
    }

    let first_divergence = local
        .save(&SnapshotConfig::default())
        .ok()
        .and_then(|mine| first_divergence(mine.bytes(), &peer.bytes));
    let report = ResyncReport {
        first_divergence,
        objects: restored.pool().len(),
        events: restored.events().len(),
    };
    tracing::warn!(
        divergence = ?report.first_divergence,
        objects = report.objects,
        events = report.events,
        "resynchronized from peer"
    );
    *local = restored;
    Ok(report)
}

/// Offset of the first differing byte, counting a length difference as a
/// difference at the end of the shorter input.
pub fn first_divergence(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}
