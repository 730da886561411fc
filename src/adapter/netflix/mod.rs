pub mod extract;
pub mod genre;
pub mod page;
pub mod top10;

pub use extract::Candidate;
pub use genre::GenreAdapter;
pub use page::PageFetcher;
pub use top10::Top10Adapter;
