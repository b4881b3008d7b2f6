mod collection;
mod collector;

pub use collection::TrackCollection;
pub use collector::{
    ArtistLookup, CollectEvent, CollectOptions, CollectionOutcome, LookupFailure, collect,
};
