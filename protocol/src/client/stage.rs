//! Submission stages.

use std::fmt;

/// Where a submission is. Stages only move forward; a failure at any stage
/// ends the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubmissionStage {
    /// Note bytes produced from the pending document.
    NoteReady,
    /// Round and fee received from the node.
    ParamsFetched,
    /// Canonical transaction written behind the blank header.
    Assembled,
    /// Signature computed over the prefixed transaction.
    Signed,
    /// Envelope header written over the gap.
    Enveloped,
    /// Envelope accepted by the node.
    Submitted,
    /// Transaction id recorded.
    Done,
}

impl SubmissionStage {
    /// The stage that follows, or `None` after [`SubmissionStage::Done`].
    pub fn next(self) -> Option<Self> {
        match self {
            Self::NoteReady => Some(Self::ParamsFetched),
            Self::ParamsFetched => Some(Self::Assembled),
            Self::Assembled => Some(Self::Signed),
            Self::Signed => Some(Self::Enveloped),
            Self::Enveloped => Some(Self::Submitted),
            Self::Submitted => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// True for the two stages that talk to the node.
    pub fn crosses_network(self) -> bool {
        matches!(self, Self::ParamsFetched | Self::Submitted)
    }
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoteReady => "note-ready",
            Self::ParamsFetched => "params-fetched",
            Self::Assembled => "assembled",
            Self::Signed => "signed",
            Self::Enveloped => "enveloped",
            Self::Submitted => "submitted",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}
