/*! Filtering utilities

Filters decide whether an individual dynamb should be retained or discarded
before further processing (forwarding, storage, display).

Filters implement [filter::Filter]: acceptance criteria are fixed at
construction, and evaluation is a pure, stateless function of (filter,
record) that is safe to call concurrently from multiple threads.
! */
mod dynamb;
mod filter;

pub use dynamb::DynambFilter;
pub use filter::Filter;
