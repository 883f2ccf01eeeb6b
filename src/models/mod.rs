//! Core data models for FreiDok entities and requests.

mod de;
mod institution;
mod list;
mod publication;
mod query;

pub use institution::{Institution, Name};
pub use list::{Item, ItemList};
pub use publication::{InstitutionRef, Person, PubId, Publication, SourceJournal, Title};
pub use query::{
    AuthorStyle, FilterCriteria, InstitutionQuery, PublicationQuery, YearRange, MAX_ITEMS_LIMIT,
};
