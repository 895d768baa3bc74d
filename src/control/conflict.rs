//! Conflict resolver: at most one action per capability.

use super::action::Action;

/// Collapse candidates sharing a capability into the highest-priority one.
///
/// Lower [`Priority::rank`](super::action::Priority::rank) wins; on a tie
/// the earlier candidate is kept.  Output keeps the position of each
/// capability's first appearance.
pub fn resolve(actions: Vec<Action>) -> Vec<Action> {
    let mut out: Vec<Action> = Vec::with_capacity(actions.len());
    for action in actions {
        match out.iter_mut().find(|kept| kept.capability() == action.capability()) {
            Some(kept) if action.priority().rank() < kept.priority().rank() => *kept = action,
            Some(_) => {}
            None => out.push(action),
        }
    }
    out
}
