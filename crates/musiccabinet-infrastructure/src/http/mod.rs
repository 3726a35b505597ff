pub mod lastfm;

pub use lastfm::LastFmClient;
