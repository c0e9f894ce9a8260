//! Well-known queue and collection names.
//!
//! Producer and consumer both read the queue name from here so the two
//! sides can never drift apart.

/// Durable queue carrying [`NormalizedEvent`](crate::event::NormalizedEvent)s.
pub const EVENTS_NORMALISED_QUEUE: &str = "events-normalised";

/// Store collection holding company documents (watched or not).
pub const COMPANIES_COLLECTION: &str = "companies";

/// Document field flagging a company for event emission.
pub const FIELD_IS_WATCHED: &str = "isWatched";

/// Document field carrying the company identifier.
pub const FIELD_COMPANY_NUMBER: &str = "companyNumber";

/// Event field carrying the event type name.
pub const FIELD_EVENT_TYPE: &str = "eventType";
