// Domain modules
//
// Each domain owns its models, validation, and data access. The marketplace
// domain is the core of this crate; surrounding domains (auth, profiles,
// email) live in the host service.

pub mod marketplace;
