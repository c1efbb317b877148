// ============================================================================
// lumen-ui - Core Module
// ============================================================================

pub mod context;
pub mod types;
