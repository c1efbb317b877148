// ============================================================================
// lumen-ui - Reactive Module
// Values, observable containers, conversions, and references
// ============================================================================

pub mod convert;
pub mod reference;
pub mod store;
pub mod value;
