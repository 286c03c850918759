/// Default page size for committee, installment and payment lists.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Default page size for member lists (directory and pending members).
pub const DEFAULT_MEMBER_PAGE_LIMIT: i64 = 20;

/// Earliest year an installment may be booked for.
pub const MIN_INSTALLMENT_YEAR: i32 = 2022;

/// Latest year an installment may be booked for.
pub const MAX_INSTALLMENT_YEAR: i32 = 3000;
