pub mod gazetteer;
pub mod intent_extractor;
pub mod keyword_refiner;
pub mod location_resolver;
pub mod projection;
pub mod query_service;
pub mod search_orchestrator;
pub mod validator;
