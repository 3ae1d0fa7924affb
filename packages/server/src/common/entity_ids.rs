//! Typed ID definitions for the circuits domain and the reference data it
//! points at.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for circuit vendors.
pub struct Provider;

/// Marker type for circuit categories.
pub struct CircuitType;

/// Marker type for circuits.
pub struct Circuit;

/// Marker type for circuit terminations.
pub struct Termination;

/// Marker type for sites (owned by the DCIM app).
pub struct Site;

/// Marker type for tenants (owned by the tenancy app).
pub struct Tenant;

/// Marker type for graph definitions (owned by the extras app).
pub struct Graph;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type ProviderId = Id<Provider>;
pub type CircuitTypeId = Id<CircuitType>;
pub type CircuitId = Id<Circuit>;
pub type TerminationId = Id<Termination>;
pub type SiteId = Id<Site>;
pub type TenantId = Id<Tenant>;
pub type GraphId = Id<Graph>;
