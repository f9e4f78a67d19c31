// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The engine error type.
//!
//! All of these are fatal to the run: a fabric failure means a peer died
//! and the distributed invariants are lost; a decode failure means
//! version skew between processes. Workers never abort on their own;
//! an erroring thread raises the process-wide termination flag and the
//! error surfaces from the engine.

use crate::branch::BranchDecodeError;
use crate::fabric::{FabricError, Tag};

/// The error type for engine operations.
#[derive(Debug)]
pub enum EngineError {
    /// The message fabric failed.
    Fabric(FabricError),
    /// A branch received from a peer failed to decode.
    Decode(BranchDecodeError),
    /// A message carried an envelope kind the tag's protocol forbids.
    UnexpectedEnvelope { tag: Tag, expected: &'static str },
    /// The search trace file could not be created.
    Trace(std::io::Error),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fabric(e) => write!(f, "fabric error: {}", e),
            Self::Decode(e) => write!(f, "branch decode error: {}", e),
            Self::UnexpectedEnvelope { tag, expected } => {
                write!(f, "message on {} was not the expected {}", tag, expected)
            }
            Self::Trace(e) => write!(f, "search trace error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fabric(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::UnexpectedEnvelope { .. } => None,
            Self::Trace(e) => Some(e),
        }
    }
}

impl From<FabricError> for EngineError {
    fn from(e: FabricError) -> Self {
        Self::Fabric(e)
    }
}

impl From<BranchDecodeError> for EngineError {
    fn from(e: BranchDecodeError) -> Self {
        Self::Decode(e)
    }
}
