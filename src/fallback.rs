use crate::models::{SearchPage, SearchResult};

/// Answers title searches when the movie provider cannot be reached.
pub trait SearchFallback: Send + Sync {
    fn search(&self, query: &str) -> SearchPage;
}

/// A small fixed catalog, enough to keep the UI usable offline.
pub struct MockCatalog {
    entries: Vec<SearchResult>,
}

impl MockCatalog {
    pub fn new(entries: Vec<SearchResult>) -> Self {
        Self { entries }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(vec![
            SearchResult::new(
                "The Dark Knight",
                "2008",
                "tt0468569",
                "movie",
                "https://m.media-amazon.com/images/M/MV5BMTMxNTMwODM0NF5BMl5BanBnXkFtZTcwODAyMTk2Mw@@._V1_SX300.jpg",
            ),
            SearchResult::new(
                "The Dark Knight Rises",
                "2012",
                "tt1345836",
                "movie",
                "https://m.media-amazon.com/images/M/MV5BMTk4ODQzNDY3Ml5BMl5BanBnXkFtZTcwODA0NTM4Nw@@._V1_SX300.jpg",
            ),
            SearchResult::new(
                "Inception",
                "2010",
                "tt1375666",
                "movie",
                "https://m.media-amazon.com/images/M/MV5BMjAxMzY3NjcxNF5BMl5BanBnXkFtZTcwNTI5OTM0Mw@@._V1_SX300.jpg",
            ),
        ])
    }
}

impl SearchFallback for MockCatalog {
    fn search(&self, query: &str) -> SearchPage {
        let needle = query.trim().to_lowercase();
        let results: Vec<SearchResult> = self
            .entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = results.len() as u32;
        SearchPage { results, total }
    }
}
