//! Shared primitive types used across the backend.

/// Primary key of a customer row. Immutable once assigned.
pub type CustomerId = i64;

/// Primary key of an admin row.
pub type AdminId = i64;

/// Primary key of a VIP level row.
pub type VipLevelId = i64;
