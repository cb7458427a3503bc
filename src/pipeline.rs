use std::collections::HashSet;

use crate::aggregator::{Aggregator, AverageResult};
use crate::catalog_client::PageFetcher;
use crate::config::CatalogConfig;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Idle,
    FetchingPage { endpoint: String, page: usize },
    ExtractingItems { page: usize },
    Averaging,
    Done(AverageResult),
    Failed,
}

/// Walks the catalog page by page, feeding each page into an [`Aggregator`].
///
/// Pages are fetched strictly one after another. A failure on any page moves
/// the pipeline to [`PipelineState::Failed`] and no average is produced, even
/// if earlier pages were already accepted. [`Pipeline::reset`] must be called
/// before running again.
pub struct Pipeline<F> {
    fetcher: F,
    start_endpoint: String,
    catalog: CatalogConfig,
    aggregator: Aggregator,
    state: PipelineState,
    pages_fetched: usize,
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(fetcher: F, start_endpoint: impl Into<String>, catalog: CatalogConfig) -> Self {
        Self {
            fetcher,
            start_endpoint: start_endpoint.into(),
            catalog,
            aggregator: Aggregator::new(),
            state: PipelineState::Idle,
            pages_fetched: 0,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Pages fetched successfully during the current run.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Items accepted so far during the current run.
    pub fn accepted(&self) -> usize {
        self.aggregator.len()
    }

    pub async fn run(&mut self) -> Result<AverageResult, PipelineError> {
        if self.state != PipelineState::Idle {
            return Err(PipelineError::NotIdle);
        }

        match self.walk_pages().await {
            Ok(result) => {
                log::info!(
                    "Finished after {} page(s), {} {} accepted",
                    self.pages_fetched,
                    self.aggregator.len(),
                    self.catalog.target_category
                );
                self.state = PipelineState::Done(result);
                Ok(result)
            }
            Err(e) => {
                log::error!(
                    "Pipeline failed after {} page(s): {}",
                    self.pages_fetched,
                    e
                );
                self.state = PipelineState::Failed;
                Err(e)
            }
        }
    }

    async fn walk_pages(&mut self) -> Result<AverageResult, PipelineError> {
        let mut endpoint = self.start_endpoint.clone();
        let mut visited = HashSet::new();
        loop {
            visited.insert(endpoint.clone());
            let page = self.pages_fetched;
            self.state = PipelineState::FetchingPage {
                endpoint: endpoint.clone(),
                page,
            };
            let envelope = self.fetcher.fetch(&endpoint).await?;
            self.pages_fetched += 1;

            self.state = PipelineState::ExtractingItems { page };
            let added = self.aggregator.accept(
                &envelope.items,
                &self.catalog.target_category,
                self.catalog.conversion_factor,
            )?;
            log::info!(
                "Page {} ({}): {} of {} products matched",
                page,
                endpoint,
                added,
                envelope.items.len()
            );

            match envelope.next_endpoint() {
                Some(next) if visited.contains(next) => {
                    return Err(PipelineError::MalformedData(format!(
                        "pagination cycle at {} (linked from {})",
                        next, endpoint
                    )));
                }
                Some(next) => endpoint = next.to_string(),
                None => break,
            }
        }

        self.state = PipelineState::Averaging;
        if self.aggregator.is_empty() {
            log::info!("No {} found in catalog", self.catalog.target_category);
        }
        Ok(self.aggregator.finalize())
    }

    /// Discards accumulated results and returns to [`PipelineState::Idle`].
    pub fn reset(&mut self) {
        self.aggregator.clear();
        self.pages_fetched = 0;
        self.state = PipelineState::Idle;
    }
}
