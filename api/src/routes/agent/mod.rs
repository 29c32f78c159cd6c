pub mod agent_types;
pub mod analyze_and_search_route;
pub mod analyze_route;
