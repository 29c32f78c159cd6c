pub mod query_match;
