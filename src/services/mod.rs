pub mod feed;
pub mod novelty;
pub mod seeded;
pub mod taste;
