//! Metrics and observability utilities
//!
//! Provides metric registration and recording helpers with
//! standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all LexForge metrics
pub const METRICS_PREFIX: &str = "lexforge";

/// Register all metric descriptions
pub fn register_metrics() {
    // Search metrics
    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of search queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Search query latency in seconds"
    );

    describe_gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        Unit::Count,
        "Number of candidates returned from search"
    );

    describe_counter!(
        format!("{}_retrieval_leg_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Retrieval legs that failed and degraded to an empty contribution"
    );

    // Rerank metrics
    describe_counter!(
        format!("{}_rerank_fallbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Context builds that fell back to hybrid-score ordering"
    );

    // Ingestion metrics
    describe_counter!(
        format!("{}_documents_parsed_total", METRICS_PREFIX),
        Unit::Count,
        "Total legal documents parsed"
    );

    describe_counter!(
        format!("{}_parse_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Documents that failed to parse"
    );

    describe_counter!(
        format!("{}_chunks_indexed_total", METRICS_PREFIX),
        Unit::Count,
        "Total chunks written to the store"
    );

    describe_histogram!(
        format!("{}_ingestion_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Document ingestion latency in seconds"
    );

    // Embedding metrics
    describe_counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total embedding API requests"
    );

    describe_histogram!(
        format!("{}_embedding_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Embedding generation latency in seconds"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, language: &str, result_count: usize) {
    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "language" => language.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        "language" => language.to_string()
    )
    .record(duration_secs);

    gauge!(
        format!("{}_search_results_count", METRICS_PREFIX),
        "language" => language.to_string()
    )
    .set(result_count as f64);
}

/// Helper to record a failed retrieval leg
pub fn record_leg_failure(leg: &str) {
    counter!(
        format!("{}_retrieval_leg_failures_total", METRICS_PREFIX),
        "leg" => leg.to_string()
    )
    .increment(1);
}

/// Helper to record a rerank fallback
pub fn record_rerank_fallback() {
    counter!(format!("{}_rerank_fallbacks_total", METRICS_PREFIX)).increment(1);
}

/// Helper to record embedding metrics
pub fn record_embedding(duration_secs: f64, model: &str, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_embedding_requests_total", METRICS_PREFIX),
        "model" => model.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    if success {
        histogram!(
            format!("{}_embedding_duration_seconds", METRICS_PREFIX),
            "model" => model.to_string()
        )
        .record(duration_secs);
    }
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    let metric = if hit {
        format!("{}_cache_hits_total", METRICS_PREFIX)
    } else {
        format!("{}_cache_misses_total", METRICS_PREFIX)
    };

    counter!(metric, "cache" => cache_name.to_string()).increment(1);
}

/// Helper to record ingestion metrics
pub fn record_ingestion(duration_secs: f64, chunks_indexed: usize, language: &str) {
    counter!(
        format!("{}_documents_parsed_total", METRICS_PREFIX),
        "language" => language.to_string()
    )
    .increment(1);

    counter!(
        format!("{}_chunks_indexed_total", METRICS_PREFIX),
        "language" => language.to_string()
    )
    .increment(chunks_indexed as u64);

    histogram!(format!("{}_ingestion_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Helper to record a parse failure
pub fn record_parse_failure(language: &str) {
    counter!(
        format!("{}_parse_failures_total", METRICS_PREFIX),
        "language" => language.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_does_not_panic() {
        register_metrics();
        record_search(0.05, "en", 5);
        record_leg_failure("keyword");
        record_rerank_fallback();
        record_cache(true, "context");
        record_ingestion(1.2, 40, "fr");
        record_parse_failure("en");
    }
}
