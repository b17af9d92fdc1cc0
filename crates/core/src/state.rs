// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use pcinv_domain::Hardware;
use pcinv_history::HistoryEvent;

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The row before the transition. `None` for creation.
    pub before: Option<Hardware>,
    /// The row after the transition. `None` after a purge.
    pub after: Option<Hardware>,
    /// The history event recording this transition.
    pub event: HistoryEvent,
}
