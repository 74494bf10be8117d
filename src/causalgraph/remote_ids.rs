//! Utilities to convert remote IDs (named agent + seq) to local versions and
//! back. LVs mean nothing outside the replica which assigned them, so these
//! are what actually goes over the wire.

use smallvec::SmallVec;
use smartstring::alias::String as SmartString;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Frontier, LV};
use crate::causalgraph::{AgentVersion, CausalGraph};
use crate::frontier::sort_frontier;

/// Remote IDs are IDs you can pass to a remote peer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RemoteVersionOwned(pub SmartString, pub usize);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RemoteVersion<'a>(pub &'a str, pub usize);

impl<'a> From<&'a RemoteVersionOwned> for RemoteVersion<'a> {
    fn from(rv: &'a RemoteVersionOwned) -> Self {
        RemoteVersion(rv.0.as_str(), rv.1)
    }
}

impl<'a> From<&RemoteVersion<'a>> for RemoteVersionOwned {
    fn from(rv: &RemoteVersion) -> Self {
        RemoteVersionOwned(rv.0.into(), rv.1)
    }
}

impl<'a> RemoteVersion<'a> {
    pub fn to_owned(&self) -> RemoteVersionOwned {
        self.into()
    }
}

pub type RemoteFrontier<'a> = SmallVec<[RemoteVersion<'a>; 2]>;
pub type RemoteFrontierOwned = SmallVec<[RemoteVersionOwned; 2]>;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum VersionConversionError {
    UnknownAgent,
    SeqInFuture,
}

impl CausalGraph {
    pub fn try_remote_to_local_version(&self, rv: RemoteVersion) -> Result<LV, VersionConversionError> {
        let agent = self.get_agent_id(rv.0)
            .ok_or(VersionConversionError::UnknownAgent)?;

        self.client_data[agent as usize]
            .try_seq_to_lv(rv.1)
            .ok_or(VersionConversionError::SeqInFuture)
    }

    /// This panics if the ID isn't known to the document.
    pub fn remote_to_local_version(&self, rv: RemoteVersion) -> LV {
        let agent = self.get_agent_id(rv.0).unwrap();
        self.client_data[agent as usize].seq_to_lv(rv.1)
    }

    pub(crate) fn agent_version_to_remote(&self, (agent, seq): AgentVersion) -> RemoteVersion {
        RemoteVersion(self.get_agent_name(agent), seq)
    }

    pub fn local_to_remote_version(&self, lv: LV) -> RemoteVersion {
        let agent_v = self.lv_to_agent_version(lv);
        self.agent_version_to_remote(agent_v)
    }

    pub fn try_remote_to_local_frontier<'a, I: Iterator<Item=RemoteVersion<'a>>>(&self, ids_iter: I) -> Result<Frontier, VersionConversionError> {
        let mut frontier: Frontier = ids_iter
            .map(|rv| self.try_remote_to_local_version(rv))
            .collect::<Result<Frontier, VersionConversionError>>()?;

        // The frontier arrives sorted by the remote peer's LV order, which
        // usually isn't ours.
        sort_frontier(&mut frontier);
        Ok(frontier)
    }

    pub fn local_to_remote_frontier(&'_ self, local_frontier: &[LV]) -> RemoteFrontier<'_> {
        local_frontier
            .iter()
            .map(|&lv| self.local_to_remote_version(lv))
            .collect()
    }
}
