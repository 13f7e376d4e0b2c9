use tracing::{error, info};

use crate::error::{QueryError, Result};
use crate::models::place::{SearchRequest, SearchResponse};
use crate::models::query_payload::QueryPayload;
use crate::services::intent_extractor::IntentExtractor;
use crate::services::keyword_refiner::KeywordRefiner;
use crate::services::location_resolver::{nearby_anchor, resolve_anchor};
use crate::services::search_orchestrator::SearchOrchestrator;

/// Sequences extraction, refinement, anchoring and search for one request.
pub struct QueryService {
    extractor: IntentExtractor,
    refiner: KeywordRefiner,
    orchestrator: SearchOrchestrator,
}

impl QueryService {
    pub fn new(
        extractor: IntentExtractor,
        refiner: KeywordRefiner,
        orchestrator: SearchOrchestrator,
    ) -> Self {
        Self {
            extractor,
            refiner,
            orchestrator,
        }
    }

    pub async fn handle(&self, payload: &QueryPayload) -> Result<SearchResponse> {
        let query = payload.query_text();
        let caller = payload.caller_coordinates();
        let page = payload.page();

        if query.is_empty() {
            let Some(caller) = caller else {
                return Err(QueryError::MissingInput);
            };
            info!(stage = "nearby", page, "Searching around caller position");
            let request = SearchRequest {
                anchor: Some(nearby_anchor(caller)),
                keywords: vec![self.refiner.policy().category_term.clone()],
                page,
            };
            return self.search_or_empty(&request).await;
        }

        let intent = self.extractor.extract(query).await?;

        let keywords = self.refiner.refine(&intent.keywords, intent.location_name());
        if keywords.is_empty() {
            return Err(QueryError::NoKeywords);
        }

        let anchor = resolve_anchor(&intent, caller)?;
        info!(stage = "resolve", %query, ?keywords, anchor = ?anchor, page, "Prepared search request");

        let request = SearchRequest {
            anchor,
            keywords,
            page,
        };
        self.search_or_empty(&request).await
    }

    /// Provider outages must not hide a good extraction, so search failures
    /// become an empty page.
    async fn search_or_empty(&self, request: &SearchRequest) -> Result<SearchResponse> {
        match self.orchestrator.search(request).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_degradable() => {
                error!(stage = "search", error = %e, keywords = ?request.keywords, "Search failed, returning empty result");
                Ok(SearchResponse::empty(request.page))
            }
            Err(e) => Err(e),
        }
    }
}
