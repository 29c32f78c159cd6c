pub mod cohere_service;
