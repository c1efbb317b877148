// ============================================================================
// lumen-ui - Virtual Tree Module
// Nodes, host capabilities, the patcher, and keyed reconciliation
// ============================================================================

pub mod diff;
pub mod host;
pub mod patch;
pub mod vnode;
