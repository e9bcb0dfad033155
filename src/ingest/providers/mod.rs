// src/ingest/providers/mod.rs
pub mod naver;

pub use naver::NaverSearchClient;
